//! Account commands: session, profile and order history.

use despensa_core::OrderStatus;
use despensa_storefront::AppError;
use despensa_storefront::cancel::CancelToken;
use despensa_storefront::forms::{LoginForm, ProfileForm};
use despensa_storefront::models::{Invoice, Order, User};
use despensa_storefront::orders::CustomerHistory;
use despensa_storefront::services::auth::AuthError;

use super::Shop;

/// Orders listed on the dashboard.
const RECENT_ORDERS: usize = 3;

/// Log in.
///
/// # Errors
///
/// Returns the form's field errors, `InvalidCredentials` when the account
/// does not match, or the directory's failure.
pub async fn login(
    shop: &mut Shop,
    email: &str,
    password: &str,
    cancel: &CancelToken,
) -> Result<String, AppError> {
    LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    }
    .validate()?;

    let directory = shop.state.directory();
    if !shop
        .session
        .auth
        .login(directory, email, password, cancel)
        .await?
    {
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = shop.session.auth.require_user()?;
    Ok(format!("Welcome, {}.", user.name))
}

/// Log out.
pub fn logout(shop: &mut Shop) -> String {
    shop.session.auth.logout();
    "Logged out.".to_string()
}

/// Fields to change on the profile; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.company.is_none() && self.phone.is_none()
    }
}

/// Show the profile, or update it when any field is given.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out and the field errors of an
/// invalid update.
pub fn profile(shop: &mut Shop, update: ProfileUpdate) -> Result<String, AppError> {
    let user = shop.session.auth.require_user()?;
    if update.is_empty() {
        return Ok(profile_text(user));
    }

    let current = ProfileForm::from_user(user);
    let form = ProfileForm {
        name: update.name.unwrap_or(current.name),
        email: update.email.unwrap_or(current.email),
        company: update.company.unwrap_or(current.company),
        phone: update.phone.unwrap_or(current.phone),
    };
    let user = shop.session.auth.update_profile(&form)?;
    Ok(format!("Profile updated.\n{}", profile_text(user)))
}

/// Orders matching a status and search text.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out.
pub fn orders(shop: &Shop, status: Option<OrderStatus>, search: &str) -> Result<String, AppError> {
    let history = history(shop)?;
    let orders = history.filter_orders(status, search);
    if orders.is_empty() {
        return Ok("No orders found.".to_string());
    }
    Ok(orders
        .iter()
        .map(|order| order_line(order))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Invoices matching a status and search text.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out.
pub fn invoices(
    shop: &Shop,
    status: Option<OrderStatus>,
    search: &str,
) -> Result<String, AppError> {
    let history = history(shop)?;
    let invoices = history.filter_invoices(status, search);
    if invoices.is_empty() {
        return Ok("No invoices found.".to_string());
    }
    Ok(invoices
        .iter()
        .map(|invoice| invoice_line(invoice))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Dashboard summary.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out.
pub fn dashboard(shop: &Shop) -> Result<String, AppError> {
    let user = shop.session.auth.require_user()?;
    let history = history(shop)?;
    let stats = history.stats();

    let mut lines = vec![
        format!("{} · {}", user.name, user.company),
        String::new(),
        format!("Orders:           {}", stats.total_orders),
        format!("Open orders:      {}", stats.open_orders),
        format!("Total spent:      {}", stats.total_spent),
        format!("Pending invoices: {}", stats.pending_invoices_amount),
        format!("Favorites:        {}", shop.session.favorites.count()),
        String::new(),
    ];
    lines.extend(
        OrderStatus::ALL
            .into_iter()
            .filter(|status| stats.count(*status) > 0)
            .map(|status| format!("  {status:<10} {}", stats.count(status))),
    );

    let recent = history.recent_orders(RECENT_ORDERS);
    if !recent.is_empty() {
        lines.push(String::new());
        lines.push("Recent orders:".to_string());
        lines.extend(recent.iter().map(|order| format!("  {}", order_line(order))));
    }
    Ok(lines.join("\n"))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// The sample history plus orders placed from this storage directory.
fn history(shop: &Shop) -> Result<CustomerHistory, AppError> {
    let user = shop.session.auth.require_user()?;
    Ok(shop
        .session
        .order_book(shop.state.order_book())
        .for_user(user))
}

fn profile_text(user: &User) -> String {
    format!(
        "Name:    {}\nEmail:   {}\nCompany: {}\nPhone:   {}",
        user.name, user.email, user.company, user.phone
    )
}

fn order_line(order: &Order) -> String {
    format!(
        "{:<20} {}  {:<10} {:>10}  {} items",
        order.id,
        order.date,
        order.status,
        order.total,
        order.item_count()
    )
}

fn invoice_line(invoice: &Invoice) -> String {
    let due = invoice
        .due_date
        .map_or_else(String::new, |date| format!("due {date}"));
    format!(
        "{:<20} {:<20} {}  {:<10} {:>10}  {due}",
        invoice.id, invoice.order_id, invoice.date, invoice.status, invoice.total
    )
}
