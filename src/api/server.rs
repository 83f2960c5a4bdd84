// API server implementation using actix-web

use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

use crate::api::routes;
use crate::database_ops::store::PgProductStore;
use crate::pipeline::IngestionPipeline;
use crate::providers::{AmazonClient, FlipkartClient};
use crate::util::env::{env_opt, env_parse};

/// Shared handler state: one pipeline over the Postgres store plus a client
/// per provider, all built once at startup.
pub struct AppState {
    pub pipeline: IngestionPipeline<PgProductStore>,
    pub flipkart: FlipkartClient,
    pub amazon: AmazonClient,
}

pub struct ApiServer {
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    /// Create server from environment variables
    pub fn from_env() -> Result<Self> {
        crate::util::env::init_env();

        let host = env_opt("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = env_parse("API_PORT", 8080u16);

        Ok(Self { host, port })
    }

    /// Start the HTTP server
    pub async fn run(self, state: AppState) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            "Starting pricegrab API server"
        );

        let state = web::Data::new(state);

        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Logger::default())
                .wrap(Compress::default())
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
