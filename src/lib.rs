// Gem Inventory - jewelry inventory backend over Airtable
//
// - AI search: plain-language queries translated into Airtable formulas
// - Barcode lookup, listing and field updates
// - Physical inventory counting
// - Line sheet pricing

// Performance logging macros - exported for use by other modules
#[macro_use]
pub mod macros;

pub mod api;
pub mod cli;
pub mod config;
pub mod inventory;
pub mod linesheet;
pub mod llm_engine;
pub mod record_store;
pub mod search;
pub mod state;

use clap::Parser;

/// Parse arguments, set up logging and run the selected command
pub async fn run() -> anyhow::Result<()> {
    // Initialize env_logger to output to stderr (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = cli::Cli::parse();
    cli::execute(cli).await
}
