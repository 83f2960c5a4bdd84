//! Typed failure taxonomy for the ingestion path.
//!
//! The split matters to the pipeline: `ExtractionError` and `ValidationError`
//! are skip-level inside a batch (log, count, move on), while
//! `TransportError` and store failures end the call.

use thiserror::Error;

/// A single outbound call failed before a usable payload was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, or timeout failure. Timeouts are deliberately not
    /// distinguished from connect failures.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-2xx status.
    #[error("upstream returned HTTP {status}")]
    Http { status: u16 },

    /// The body was not the JSON shape the endpoint is documented to return.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // Status errors are raised explicitly before body handling, so
        // anything reqwest itself reports is transport-level.
        TransportError::Network(err.to_string())
    }
}

/// A raw provider item could not be mapped to a canonical record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("unparsable price `{raw}`")]
    MalformedNumber { raw: String },

    /// The provider reported its own error status; no field access is
    /// attempted on such a payload.
    #[error("provider reported error: {detail}")]
    UpstreamError { detail: String },
}

/// Post-extraction invariant violations. Always skip-level in a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("price is negative or the provider's absent sentinel")]
    NegativeOrInvalidPrice,

    #[error("name is empty after trimming")]
    EmptyName,
}

/// Boundary error returned by `ingest_single`. Never panics past the
/// pipeline; callers match on the variant to pick a status code or exit code.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
}
