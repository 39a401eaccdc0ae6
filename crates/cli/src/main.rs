//! Despensa CLI - the storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! despensa catalog --category mar --sort price-asc
//!
//! # Fill the cart
//! despensa cart add merluza-pincho -q 2
//!
//! # Log in and check out
//! despensa login -e demo@despensa.es -p despensa2024
//! despensa checkout --address addr-restaurante --payment pm-visa --accept-terms
//!
//! # Review the account
//! despensa dashboard
//! ```
//!
//! # Commands
//!
//! - `catalog`, `categories`, `product` - Browse products
//! - `cart`, `favorites` - Manage the cart and the favorites list
//! - `login`, `logout`, `profile` - Account session
//! - `checkout` - Run every checkout step and place the order
//! - `orders`, `invoices`, `dashboard` - Account history
//! - `contact` - Send the contact form
//!
//! Shopper state persists between runs in `DESPENSA_STORAGE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use despensa_core::OrderStatus;
use despensa_storefront::cancel::{CancelHandle, CancelToken};
use despensa_storefront::catalog::SortOrder;
use despensa_storefront::config::StorefrontConfig;
use despensa_storefront::AppError;

mod commands;

use commands::Shop;

#[derive(Parser)]
#[command(name = "despensa")]
#[command(author, version, about = "Despensa storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog(CatalogArgs),
    /// List categories with their product counts
    Categories,
    /// Show one product and related products
    Product {
        /// Product ID
        id: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Show or change the favorites list
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Log in with an account email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show or update the account profile
    Profile(ProfileArgs),
    /// Run every checkout step and place the order
    Checkout(CheckoutArgs),
    /// List orders
    Orders(HistoryArgs),
    /// List invoices
    Invoices(HistoryArgs),
    /// Account summary
    Dashboard,
    /// Send the contact form
    Contact(ContactArgs),
}

#[derive(clap::Args)]
struct CatalogArgs {
    /// Text matched against product name and description
    #[arg(short, long)]
    search: Option<String>,

    /// Category ID, or `all`
    #[arg(short, long, default_value = "all")]
    category: String,

    /// Brand ID, or `all`
    #[arg(short, long, default_value = "all")]
    brand: String,

    /// Lowest price (inclusive)
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price (inclusive)
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Only discounted products
    #[arg(long)]
    discounted: bool,

    /// Only products in stock
    #[arg(long)]
    in_stock: bool,

    /// Only featured products
    #[arg(long)]
    featured: bool,

    /// Sort order (`featured`, `name`, `price-asc`, `price-desc`, `discount`)
    #[arg(long, default_value_t = SortOrder::Featured)]
    sort: SortOrder,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: usize,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart line
    Set {
        /// Product ID
        id: String,

        quantity: u32,

        /// Remove the line when the quantity is 0
        #[arg(long)]
        confirm: bool,
    },
    /// Remove a cart line
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite products
    List,
    /// Add or remove a favorite
    Toggle {
        /// Product ID
        id: String,
    },
}

#[derive(clap::Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    phone: Option<String>,
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Saved shipping address ID
    #[arg(long)]
    address: Option<String>,

    /// Saved payment method ID
    #[arg(long)]
    payment: Option<String>,

    /// Promo code
    #[arg(long)]
    promo: Option<String>,

    /// Accept the terms and conditions
    #[arg(long)]
    accept_terms: bool,

    /// Only list the saved addresses, payment methods and the order summary
    #[arg(long)]
    options: bool,
}

#[derive(clap::Args)]
struct HistoryArgs {
    /// Filter by status
    #[arg(long)]
    status: Option<OrderStatus>,

    /// Text matched against IDs and item names
    #[arg(short, long, default_value = "")]
    search: String,
}

#[derive(clap::Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    message: String,

    /// Accept the privacy policy
    #[arg(long)]
    accept_privacy: bool,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "despensa_storefront=info,despensa_cli=info".into());
    let json = std::env::var("DESPENSA_LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let cancel = CancelHandle::new();
    let token = cancel.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            cancel.cancel();
        }
    });

    match run(cli, &token).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}", e.user_message());
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, cancel: &CancelToken) -> Result<String, AppError> {
    let config = StorefrontConfig::from_env()?;
    let mut shop = Shop::open(config)?;

    let output = match cli.command {
        Commands::Catalog(args) => Ok(commands::catalog::list(&shop, &args.into())),
        Commands::Categories => Ok(commands::catalog::categories(&shop)),
        Commands::Product { id } => commands::catalog::product(&shop, &id),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => Ok(commands::cart::show(&shop)),
            CartAction::Add { id, quantity } => commands::cart::add(&mut shop, &id, quantity),
            CartAction::Set {
                id,
                quantity,
                confirm,
            } => commands::cart::set(&mut shop, &id, quantity, confirm),
            CartAction::Remove { id } => commands::cart::remove(&mut shop, &id),
            CartAction::Clear => Ok(commands::cart::clear(&mut shop)),
        },
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => Ok(commands::favorites::list(&shop)),
            FavoritesAction::Toggle { id } => commands::favorites::toggle(&mut shop, &id),
        },
        Commands::Login { email, password } => {
            commands::account::login(&mut shop, &email, &password, cancel).await
        }
        Commands::Logout => Ok(commands::account::logout(&mut shop)),
        Commands::Profile(args) => commands::account::profile(
            &mut shop,
            commands::account::ProfileUpdate {
                name: args.name,
                email: args.email,
                company: args.company,
                phone: args.phone,
            },
        ),
        Commands::Checkout(args) => {
            let request = commands::checkout::CheckoutRequest {
                address: args.address,
                payment: args.payment,
                promo: args.promo,
                accept_terms: args.accept_terms,
            };
            // checkout saves on its own once the charge succeeds
            return if args.options {
                commands::checkout::options(&shop, &request, cancel).await
            } else {
                commands::checkout::run(&mut shop, &request, cancel).await
            };
        }
        Commands::Orders(args) => commands::account::orders(&shop, args.status, &args.search),
        Commands::Invoices(args) => commands::account::invoices(&shop, args.status, &args.search),
        Commands::Dashboard => commands::account::dashboard(&shop),
        Commands::Contact(args) => commands::contact::send(
            shop.state.config(),
            &despensa_storefront::forms::ContactForm {
                name: args.name,
                email: args.email,
                phone: args.phone,
                subject: args.subject,
                message: args.message,
                accept_privacy: args.accept_privacy,
            },
        ),
    }?;

    shop.save()?;
    Ok(output)
}

impl From<CatalogArgs> for commands::catalog::Listing {
    fn from(args: CatalogArgs) -> Self {
        Self {
            search: args.search.unwrap_or_default(),
            category: args.category,
            brand: args.brand,
            min_price: args.min_price,
            max_price: args.max_price,
            discounted_only: args.discounted,
            in_stock_only: args.in_stock,
            featured_only: args.featured,
            sort: args.sort,
            page: args.page,
        }
    }
}
