//! CLI command implementations.

pub mod cart;
pub mod catalogs;
pub mod config;
pub mod search;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the catalogs command.
#[derive(Args)]
pub struct CatalogsArgs {
    /// Only describe this catalog.
    pub catalog: Option<String>,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Catalog to search (cars, vps, tours, visas, licenses, products).
    pub catalog: String,

    /// Read listings from a JSON file.
    #[arg(long, conflicts_with = "remote")]
    pub file: Option<PathBuf>,

    /// Fetch listings from the catalog API.
    #[arg(long)]
    pub remote: bool,

    /// Filter as key=value (repeatable), e.g. `price=100..500` or `category=food,cruise`.
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Free-text search.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Sort order (price_asc, price_desc, rating, ...).
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Page to show (paginated catalogs).
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Items per page (paginated catalogs).
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show option counts for each filter.
    #[arg(long)]
    pub facets: bool,

    /// Read queries from stdin, applying each after typing pauses.
    #[arg(short, long)]
    pub interactive: bool,

    /// Add the listing with this id to the cart.
    #[arg(long, value_name = "ID")]
    pub add: Option<String>,

    /// Quantity for --add.
    #[arg(long, default_value = "1", requires = "add")]
    pub qty: u32,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart lines and totals.
    Show,
    /// Add a custom line.
    Add {
        /// Item id.
        id: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Unit price in major units.
        #[arg(long)]
        price: f64,
        /// Variant id.
        #[arg(long)]
        variant: Option<String>,
        /// Quantity to add.
        #[arg(long, default_value = "1")]
        qty: u32,
    },
    /// Set the quantity of a line.
    Update {
        /// Item id.
        id: String,
        /// New quantity.
        qty: String,
        /// Variant id.
        #[arg(long)]
        variant: Option<String>,
    },
    /// Increase a line's quantity by one.
    Inc {
        id: String,
        #[arg(long)]
        variant: Option<String>,
    },
    /// Decrease a line's quantity by one (not below 1).
    Dec {
        id: String,
        #[arg(long)]
        variant: Option<String>,
    },
    /// Remove a line.
    Remove {
        /// Item id.
        id: String,
        /// Variant id.
        #[arg(long)]
        variant: Option<String>,
    },
    /// Apply a promo code.
    Promo {
        code: String,
    },
    /// Remove the applied promo code.
    Unpromo,
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Settle the order and empty the cart.
    Checkout {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Print the path of the loaded config file.
    Path,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
