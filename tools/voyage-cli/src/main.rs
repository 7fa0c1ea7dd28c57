//! Voyage CLI - browse storefront catalogs and manage a cart from the terminal.
//!
//! Commands:
//! - `voyage catalogs` - List catalogs with their filters and sort orders
//! - `voyage search` - Filter, sort and page through a catalog
//! - `voyage cart` - Add, update, remove, promo codes, totals, checkout
//! - `voyage config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CartArgs, CatalogsArgs, ConfigArgs, SearchArgs};

/// Voyage CLI - Browse catalogs and manage a shopping cart
#[derive(Parser)]
#[command(name = "voyage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogs and the filters they accept
    Catalogs(CatalogsArgs),

    /// Search a catalog
    Search(SearchArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Log to stderr; JSON lines with `--json`, level from `RUST_LOG` or `--verbose`.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("failed to install log subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Catalogs(args) => commands::catalogs::run(args, &ctx).await,
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
