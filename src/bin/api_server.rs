// HTTP API server binary for pricegrab

use anyhow::Result;
use pricegrab::api::{ApiServer, AppState};
use pricegrab::database_ops::db::Db;
use pricegrab::database_ops::store::PgProductStore;
use pricegrab::pipeline::IngestionPipeline;
use pricegrab::providers::{AmazonClient, FlipkartClient};
use pricegrab::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    pricegrab::tracing::init_tracing("info,sqlx=warn")?;

    tracing::info!("Initializing pricegrab API server");

    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    env_util::preflight_check(
        "api_server",
        &["FLIPKART_API_KEY", "AMAZON_API_KEY"],
        &[
            "API_HOST",
            "API_PORT",
            "FLIPKART_API_URL",
            "AMAZON_API_URL",
            "AMAZON_COUNTRY",
            "HTTP_TIMEOUT_SECS",
            "DATABASE_URL",
        ],
    )?;

    let server = ApiServer::from_env()?;

    let database_url = env_util::db_url()?;
    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
    let db = Db::connect(&database_url, max_connections).await?;

    let state = AppState {
        pipeline: IngestionPipeline::new(PgProductStore::new(db)),
        flipkart: FlipkartClient::from_env()?,
        amazon: AmazonClient::from_env()?,
    };

    server.run(state).await?;

    Ok(())
}
