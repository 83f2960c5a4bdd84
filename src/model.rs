use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Provenance tag for an ingested record. Immutable once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Flipkart,
    Amazon,
}

impl Source {
    /// Stable string form used in the database and in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Flipkart => "Flipkart",
            Source::Amazon => "Amazon",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flipkart" => Ok(Source::Flipkart),
            "amazon" => Ok(Source::Amazon),
            other => Err(anyhow::anyhow!("unknown source `{other}`")),
        }
    }
}

/// Canonical product record every provider payload is normalized into.
///
/// `id` is the surrogate key assigned by Postgres; it is `None` until the
/// record has been persisted and is never consulted by business logic.
/// `created_at` is set at extraction time and preserved across re-ingestion
/// of the same `(source, external_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<i64>,
    pub external_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub source: Source,
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Invariant check shared by both extractors: non-empty name after trim,
    /// non-negative price. A `-1` price from the Flipkart list endpoint is
    /// its "absent" sentinel and fails here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.price < BigDecimal::from(0) {
            return Err(ValidationError::NegativeOrInvalidPrice);
        }
        Ok(())
    }
}
