use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;
use crate::providers::pages::PageFetcher;
use crate::providers::{get_json, DetailFetcher};
use crate::util::env::{env_opt, env_parse, env_req};

const DEFAULT_BASE_URL: &str = "https://real-time-flipkart-api.p.rapidapi.com";

/// Client for the Flipkart-style provider: one detail endpoint keyed by
/// `pid` and one paginated brand-listing endpoint.
#[derive(Debug, Clone)]
pub struct FlipkartClient {
    http: Client,
    base_url: Url,
    api_key: String,
    api_host: String,
}

impl FlipkartClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid Flipkart base URL")?;
        let api_host = base_url
            .host_str()
            .context("Flipkart base URL has no host")?
            .to_string();
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
            api_host,
        })
    }

    /// Configuration comes from FLIPKART_API_URL (optional), FLIPKART_API_KEY
    /// (required) and HTTP_TIMEOUT_SECS (default 15).
    pub fn from_env() -> Result<Self> {
        let base_url = env_opt("FLIPKART_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = env_req("FLIPKART_API_KEY")?;
        let timeout = Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", 15u64));
        Self::new(&base_url, api_key, timeout)
    }

    /// GET /product-details?pid=..
    pub async fn fetch_detail(&self, pid: &str) -> Result<Value, TransportError> {
        let mut url = self.base_url.clone();
        url.set_path("/product-details");
        url.query_pairs_mut().append_pair("pid", pid);
        get_json(&self.http, url, &self.api_key, &self.api_host).await
    }

    /// GET /products-by-brand?brand_id=..&page=..&sort_by=popularity
    pub async fn fetch_brand_page(&self, brand_id: &str, page: u32) -> Result<Value, TransportError> {
        let mut url = self.base_url.clone();
        url.set_path("/products-by-brand");
        url.query_pairs_mut()
            .append_pair("brand_id", brand_id)
            .append_pair("page", &page.to_string())
            .append_pair("sort_by", "popularity");
        get_json(&self.http, url, &self.api_key, &self.api_host).await
    }

    /// Adapter that fixes the brand id so the page walker only has to know
    /// about page numbers.
    pub fn brand_pages(&self, brand_id: &str) -> BrandPages<'_> {
        BrandPages {
            client: self,
            brand_id: brand_id.to_string(),
        }
    }
}

#[async_trait]
impl DetailFetcher for FlipkartClient {
    async fn fetch_detail(&self, id: &str) -> Result<Value, TransportError> {
        FlipkartClient::fetch_detail(self, id).await
    }
}

/// Brand-scoped view of the listing endpoint for the page walker.
#[derive(Debug)]
pub struct BrandPages<'a> {
    client: &'a FlipkartClient,
    brand_id: String,
}

#[async_trait]
impl PageFetcher for BrandPages<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Value, TransportError> {
        self.client.fetch_brand_page(&self.brand_id, page).await
    }
}
