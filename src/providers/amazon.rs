use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;
use crate::providers::{get_json, DetailFetcher};
use crate::util::env::{env_opt, env_parse, env_req};

const DEFAULT_BASE_URL: &str = "https://real-time-amazon-data.p.rapidapi.com";

/// Client for the Amazon-style provider. Detail lookups are keyed by ASIN and
/// scoped to a marketplace country.
#[derive(Debug, Clone)]
pub struct AmazonClient {
    http: Client,
    base_url: Url,
    api_key: String,
    api_host: String,
    country: String,
}

impl AmazonClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        country: String,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid Amazon base URL")?;
        let api_host = base_url
            .host_str()
            .context("Amazon base URL has no host")?
            .to_string();
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
            api_host,
            country,
        })
    }

    /// Configuration comes from AMAZON_API_URL (optional), AMAZON_API_KEY
    /// (required), AMAZON_COUNTRY (default IN) and HTTP_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let base_url = env_opt("AMAZON_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = env_req("AMAZON_API_KEY")?;
        let country = env_opt("AMAZON_COUNTRY").unwrap_or_else(|| "IN".to_string());
        let timeout = Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", 15u64));
        Self::new(&base_url, api_key, country, timeout)
    }

    /// GET /product-details?asin=..&country=..
    pub async fn fetch_detail(&self, asin: &str) -> Result<Value, TransportError> {
        let mut url = self.base_url.clone();
        url.set_path("/product-details");
        url.query_pairs_mut()
            .append_pair("asin", asin)
            .append_pair("country", &self.country);
        get_json(&self.http, url, &self.api_key, &self.api_host).await
    }
}

#[async_trait]
impl DetailFetcher for AmazonClient {
    async fn fetch_detail(&self, id: &str) -> Result<Value, TransportError> {
        AmazonClient::fetch_detail(self, id).await
    }
}
