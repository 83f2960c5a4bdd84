// CLI entry point: trigger ingestion runs and inspect stored records without
// going through the HTTP server.

use anyhow::Result;
use clap::{Parser, Subcommand};

use pricegrab::database_ops::db::Db;
use pricegrab::database_ops::store::{PgProductStore, ProductStore};
use pricegrab::model::Source;
use pricegrab::normalization::extract::Extractor;
use pricegrab::pipeline::IngestionPipeline;
use pricegrab::providers::{AmazonClient, FlipkartClient};
use pricegrab::util::env as env_util;

#[derive(Parser)]
#[command(name = "pricegrab", about = "Product ingestion and query CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one product detail payload and upsert the canonical record
    IngestSingle {
        /// Provider to fetch from: flipkart or amazon
        #[arg(long)]
        source: String,
        /// Provider-assigned id (Flipkart pid / Amazon ASIN)
        #[arg(long)]
        id: String,
    },
    /// Walk a Flipkart brand listing and ingest every valid item
    IngestBrand {
        #[arg(long)]
        brand_id: String,
    },
    /// Print stored records as JSON, optionally filtered by name substring
    List {
        #[arg(long)]
        partial: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    pricegrab::tracing::init_tracing("info,sqlx=warn")?;
    env_util::init_env();

    let cli = Cli::parse();

    let database_url = env_util::db_url()?;
    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 5u32);
    let db = Db::connect(&database_url, max_connections).await?;
    let pipeline = IngestionPipeline::new(PgProductStore::new(db));

    match cli.command {
        Command::IngestSingle { source, id } => {
            let source: Source = source.parse()?;
            let record = match source {
                Source::Flipkart => {
                    env_util::preflight_check(
                        "ingest-single",
                        &["FLIPKART_API_KEY"],
                        &["FLIPKART_API_URL", "HTTP_TIMEOUT_SECS"],
                    )?;
                    let client = FlipkartClient::from_env()?;
                    pipeline
                        .ingest_single(&client, Extractor::Flipkart, &id)
                        .await?
                }
                Source::Amazon => {
                    env_util::preflight_check(
                        "ingest-single",
                        &["AMAZON_API_KEY"],
                        &["AMAZON_API_URL", "AMAZON_COUNTRY", "HTTP_TIMEOUT_SECS"],
                    )?;
                    let client = AmazonClient::from_env()?;
                    pipeline
                        .ingest_single(&client, Extractor::Amazon, &id)
                        .await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::IngestBrand { brand_id } => {
            env_util::preflight_check(
                "ingest-brand",
                &["FLIPKART_API_KEY"],
                &["FLIPKART_API_URL", "HTTP_TIMEOUT_SECS"],
            )?;
            let client = FlipkartClient::from_env()?;
            let pages = client.brand_pages(&brand_id);
            let outcome = pipeline.ingest_batch(&pages, Extractor::Flipkart).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_complete() {
                anyhow::bail!(
                    "batch ended early after {} ingested / {} skipped: {}",
                    outcome.ingested,
                    outcome.skipped,
                    outcome.error.unwrap_or_default()
                );
            }
        }
        Command::List { partial } => {
            let records = match partial {
                Some(partial) => {
                    pipeline
                        .store()
                        .find_by_name_substring_ci(&partial)
                        .await?
                }
                None => pipeline.store().find_all().await?,
            };
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
