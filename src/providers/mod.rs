//! HTTP clients for the upstream product-data providers.
//!
//! Each client owns one `reqwest::Client` with a configurable timeout and
//! issues exactly one outbound call per method invocation. No retries and no
//! caching live at this layer; the caller decides what a failure means.

pub mod amazon;
pub mod flipkart;
pub mod pages;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

pub use amazon::AmazonClient;
pub use flipkart::FlipkartClient;

/// Seam for the detail-by-id fetch so the pipeline can be exercised against
/// fakes. Both concrete clients implement it.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, id: &str) -> Result<Value, TransportError>;
}

/// One authenticated GET against a RapidAPI-style endpoint, classified into
/// the transport taxonomy: send failure (incl. timeout) -> Network, non-2xx
/// -> Http, unparsable body -> Decode.
pub(crate) async fn get_json(
    http: &Client,
    url: Url,
    api_key: &str,
    api_host: &str,
) -> Result<Value, TransportError> {
    let response = http
        .get(url)
        .header("x-rapidapi-key", api_key)
        .header("x-rapidapi-host", api_host)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Http {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
}
