//! Form validation.
//!
//! Each form validates every field at once and reports all failures, so the
//! UI can render each message next to the offending field.

use core::fmt;

use serde::{Deserialize, Serialize};

use despensa_core::Email;

use crate::models::User;
use crate::services::auth::MIN_PASSWORD_LENGTH;

/// Minimum length of a person's name.
const MIN_NAME_LENGTH: usize = 2;

/// Minimum length of a contact message.
const MIN_MESSAGE_LENGTH: usize = 10;

/// Minimum digits in a phone number.
const MIN_PHONE_DIGITS: usize = 9;

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors of a form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The message for a field, if that field failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Field Checks
// =============================================================================

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        errors.push(
            "name",
            format!("Name must be at least {MIN_NAME_LENGTH} characters."),
        );
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) -> Option<Email> {
    Email::parse(email)
        .inspect_err(|_| errors.push("email", "Please enter a valid email address."))
        .ok()
}

fn check_phone(errors: &mut ValidationErrors, phone: &str) {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        errors.push(
            "phone",
            format!("Phone number must have at least {MIN_PHONE_DIGITS} digits."),
        );
    }
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("{label} is required."));
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Contact page form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub accept_privacy: bool,
}

impl ContactForm {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns every failed field constraint.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        check_email(&mut errors, &self.email);
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            check_phone(&mut errors, phone);
        }
        check_required(&mut errors, "subject", &self.subject, "Subject");
        if self.message.trim().chars().count() < MIN_MESSAGE_LENGTH {
            errors.push(
                "message",
                format!("Message must be at least {MIN_MESSAGE_LENGTH} characters."),
            );
        }
        if !self.accept_privacy {
            errors.push("accept_privacy", "You must accept the privacy policy.");
        }
        errors.into_result(|| ())
    }
}

/// Dashboard profile form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
}

impl ProfileForm {
    /// Prefill the form from the current user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.to_string(),
            company: user.company.clone(),
            phone: user.phone.clone(),
        }
    }

    /// Check every field and build the updated user record.
    ///
    /// # Errors
    ///
    /// Returns every failed field constraint.
    pub fn validate(&self) -> Result<User, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        let email = check_email(&mut errors, &self.email);
        check_phone(&mut errors, &self.phone);
        check_required(&mut errors, "company", &self.company, "Company");

        match email {
            Some(email) if errors.is_empty() => Ok(User {
                name: self.name.trim().to_owned(),
                email,
                company: self.company.trim().to_owned(),
                phone: self.phone.trim().to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Check the field shapes before any credential lookup.
    ///
    /// # Errors
    ///
    /// Returns every failed field constraint.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = check_email(&mut errors, &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contact() -> ContactForm {
        ContactForm {
            name: "Lucía".to_string(),
            email: "lucia@elpuerto.es".to_string(),
            phone: None,
            subject: "Pedido semanal".to_string(),
            message: "Necesito precios para 20 kg de merluza.".to_string(),
            accept_privacy: true,
        }
    }

    #[test]
    fn test_valid_contact_form() {
        assert!(contact().validate().is_ok());
    }

    #[test]
    fn test_contact_form_reports_every_field() {
        let form = ContactForm {
            name: "L".to_string(),
            email: "lucia@".to_string(),
            phone: Some("123".to_string()),
            subject: " ".to_string(),
            message: "Hola".to_string(),
            accept_privacy: false,
        };
        let errors = form.validate().unwrap_err();
        for field in ["name", "email", "phone", "subject", "message", "accept_privacy"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_profile_form_builds_user() {
        let form = ProfileForm {
            name: " Lucía Fernández ".to_string(),
            email: "lucia@elpuerto.es".to_string(),
            company: "Restaurante El Puerto".to_string(),
            phone: "+34 942 123 456".to_string(),
        };
        let user = form.validate().unwrap();
        assert_eq!(user.name, "Lucía Fernández");
        assert_eq!(user.email.as_str(), "lucia@elpuerto.es");
    }

    #[test]
    fn test_profile_form_rejects_short_phone() {
        let form = ProfileForm {
            name: "Lucía".to_string(),
            email: "lucia@elpuerto.es".to_string(),
            company: "El Puerto".to_string(),
            phone: "942 12".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn test_login_form() {
        let ok = LoginForm {
            email: "demo@despensa.es".to_string(),
            password: "despensa2024".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginForm {
            email: "demo".to_string(),
            password: "123".to_string(),
        };
        assert_eq!(bad.validate().unwrap_err().0.len(), 2);
    }
}
