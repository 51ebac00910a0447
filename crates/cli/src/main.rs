//! PawCare CLI - local cart and booking management tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart kept in ./.pawcare/cart.json
//! pawcare cart show
//!
//! # Add two units of a product
//! pawcare cart add kibble-5kg --name "Kibble 5kg" --price 24.99 --quantity 2
//!
//! # Set a quantity (0 or less removes the line)
//! pawcare cart set kibble-5kg 3
//!
//! # List bookings made with an email address
//! pawcare bookings list --email sam@example.com
//!
//! # Move a booking
//! pawcare bookings reschedule 6650f1 --date 2026-11-02 --slot "10:00 AM"
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the local cart
//! - `products` - Browse the catalog
//! - `bookings` - List, cancel, and reschedule bookings

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "pawcare")]
#[command(author, version, about = "PawCare CLI tools")]
struct Cli {
    /// Directory holding the local cart
    #[arg(long, global = true, env = "PAWCARE_DATA_DIR", default_value = ".pawcare")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the catalog
    Products,
    /// Manage bookings
    Bookings {
        #[command(subcommand)]
        action: BookingAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: String,

        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Unit price, e.g. 24.99
        #[arg(short, long)]
        price: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Take one unit of a product away
    Subtract {
        /// Product ID
        id: String,
    },
    /// Remove a product entirely
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a product's quantity
    Set {
        /// Product ID
        id: String,

        /// New quantity; 0 or less removes the product
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum BookingAction {
    /// List bookings for an email address
    List {
        /// Email used when booking
        #[arg(short, long)]
        email: String,
    },
    /// Cancel a booking
    Cancel {
        /// Booking ID
        id: String,
    },
    /// Move a booking to a new date and time slot
    Reschedule {
        /// Booking ID
        id: String,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// New time slot, e.g. "10:00 AM"
        #[arg(short, long)]
        slot: String,
    },
}

#[tokio::main]
async fn main() {
    // `.env` may set PAWCARE_DATA_DIR and RUST_LOG, so load it before either is read
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawcare_storefront=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    if let Err(e) = run(cli, &cancel).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), CliError> {
    match cli.command {
        Commands::Cart { action } => {
            let mut cart = commands::cart::open(&cli.data_dir);
            match action {
                CartAction::Show => {}
                CartAction::Add {
                    id,
                    name,
                    price,
                    image,
                    quantity,
                } => commands::cart::add(&mut cart, id, name, &price, image, quantity)?,
                CartAction::Subtract { id } => commands::cart::subtract(&mut cart, id)?,
                CartAction::Remove { id } => commands::cart::remove(&mut cart, id)?,
                CartAction::Set { id, quantity } => commands::cart::set(&mut cart, id, quantity)?,
                CartAction::Clear => commands::cart::clear(&mut cart)?,
            }
            commands::cart::show(&cart);
        }
        Commands::Products => commands::products::list(cancel).await?,
        Commands::Bookings { action } => match action {
            BookingAction::List { email } => commands::bookings::list(&email, cancel).await?,
            BookingAction::Cancel { id } => commands::bookings::cancel(id, cancel).await?,
            BookingAction::Reschedule { id, date, slot } => {
                commands::bookings::reschedule(id, date, slot, cancel).await?;
            }
        },
    }
    Ok(())
}
