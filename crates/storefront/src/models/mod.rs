//! Domain models for the storefront.
//!
//! These are plain data types shared by the stores. Catalog and order data
//! deserialize straight from the bundled JSON fixtures.

pub mod checkout;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use checkout::{PaymentKind, PaymentMethod, ShippingAddress};
pub use order::{Invoice, Order, OrderItem};
pub use product::{Brand, Category, Product, ProductSnapshot};
pub use user::{AuthState, User};
