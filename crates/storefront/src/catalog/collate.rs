//! Spanish-aware string ordering for product names.
//!
//! Names compare case-insensitively with accents folded onto their base
//! letter, except `ñ`, which is its own letter sorting between `n` and `o`.

use std::cmp::Ordering;

/// Build the primary collation key for `s`.
///
/// Every letter maps to `2 * base`, so `ñ` can take the odd slot right
/// after `n`.
#[must_use]
pub fn collation_key(s: &str) -> Vec<u32> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ñ' => u32::from('n') * 2 + 1,
            other => u32::from(fold_accent(other)) * 2,
        })
        .collect()
}

/// Compare two names for display ordering.
///
/// Falls back to a plain comparison when the collation keys tie so the
/// result is total and deterministic.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

const fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ç' => 'c',
        other => other,
    }
}
