//! Command-line interface

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use crate::config::{AirtableArgs, LlmArgs};
use crate::inventory::{InventoryCount, ScanOutcome};
use crate::linesheet::{line_sheet_for, Discount};
use crate::llm_engine::LlmEngine;
use crate::record_store::{fields, AirtableStore, InventoryItem, RecordStore};
use crate::search::{build_translation_prompt, AiSearchService, FieldVocabulary, QueryTranslator};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "gem-inventory")]
#[command(author, version, about = "Jewelry inventory search, counting and line sheets")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub airtable: AirtableArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search inventory in plain language
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Look up an item by Job No.
    Lookup { job_no: String },

    /// List every item
    Items,

    /// Write fields to a record, e.g. '{"Purity": "14K"}'
    Update { record_id: String, fields: String },

    /// Count items by scanning Job Nos.
    Count {
        #[arg(required = true)]
        job_nos: Vec<String>,
    },

    /// Price selected records at a discount
    Linesheet {
        /// Discount percentage (15, 20, 25, 33 or any value between 0 and 100)
        #[arg(long, short = 'd')]
        discount: f64,

        #[arg(required = true)]
        record_ids: Vec<String>,
    },

    /// Print the translation prompt for a query without calling the model
    Prompt {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Serve the JSON API
    Serve {
        #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
        port: u16,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_store(args: &AirtableArgs) -> Result<Arc<dyn RecordStore>> {
    let store = AirtableStore::new(args.store_config()).context("Failed to set up Airtable store")?;
    Ok(Arc::new(store))
}

fn build_search(args: &LlmArgs, store: Arc<dyn RecordStore>) -> Result<Arc<AiSearchService>> {
    let vocabulary = FieldVocabulary::load(args.search_vocabulary.as_deref())?;
    let engine = LlmEngine::from_settings(&args.llm_settings())
        .context("Failed to set up the completion provider")?;
    let translator = QueryTranslator::new(
        Arc::new(engine),
        vocabulary,
        args.translator_settings(),
    );
    Ok(Arc::new(AiSearchService::new(Arc::new(translator), store)))
}

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Prompt { query } => {
            let vocabulary = FieldVocabulary::load(cli.llm.search_vocabulary.as_deref())?;
            println!("{}", build_translation_prompt(&vocabulary, &query.join(" ")));
            Ok(())
        }

        Commands::Search { query } => {
            let store = build_store(&cli.airtable)?;
            let search = build_search(&cli.llm, store)?;
            let outcome = search.search(&query.join(" ")).await?;
            print_json(&outcome)
        }

        Commands::Lookup { job_no } => {
            let store = build_store(&cli.airtable)?;
            match store.find_by_job_no(job_no.trim()).await? {
                Some(record) => print_json(&record),
                None => bail!("No item with Job No. {}", job_no),
            }
        }

        Commands::Items => {
            let store = build_store(&cli.airtable)?;
            let items: Vec<InventoryItem> = store
                .list_all()
                .await?
                .iter()
                .map(InventoryItem::from)
                .collect();
            print_json(&items)
        }

        Commands::Update { record_id, fields } => {
            let fields: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&fields).context("Fields must be a JSON object")?;
            let store = build_store(&cli.airtable)?;
            let record = store.update(&record_id, fields).await?;
            print_json(&record)
        }

        Commands::Count { job_nos } => {
            let store = build_store(&cli.airtable)?;
            let mut count = InventoryCount::new();
            for job_no in &job_nos {
                match count.scan(store.as_ref(), job_no).await? {
                    ScanOutcome::Scanned(item) => println!(
                        "✓ {} {}",
                        item.job_no,
                        item.record.text(fields::DESIGN).unwrap_or_else(|| "N/A".to_string())
                    ),
                    ScanOutcome::Duplicate(job_no) => println!("⚠ already scanned: {}", job_no),
                    ScanOutcome::NotFound(job_no) => println!("✗ not found: {}", job_no),
                }
            }
            let stats = count.stats();
            println!("{} items, total value ${:.2} CAD", stats.scanned, stats.total_value);
            Ok(())
        }

        Commands::Linesheet { discount, record_ids } => {
            let store = build_store(&cli.airtable)?;
            let sheet = line_sheet_for(store.as_ref(), &record_ids, Discount::new(discount)?).await?;
            print_json(&sheet)
        }

        Commands::Serve { port } => {
            let store = build_store(&cli.airtable)?;
            let search = build_search(&cli.llm, store.clone())?;
            crate::api::serve(AppState::new(search, store), port).await
        }
    }
}
