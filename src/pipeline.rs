//! Ingestion orchestration: fetch, extract, validate, upsert.
//!
//! Failure policy: inside a batch, extraction and validation problems are
//! per-item — log, bump `skipped`, keep going. Transport and store failures
//! end the call; a batch still reports how far it got.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::database_ops::store::ProductStore;
use crate::error::IngestError;
use crate::model::ProductRecord;
use crate::normalization::extract::{batch_external_id, Extractor};
use crate::providers::pages::{self, PageFetcher};
use crate::providers::DetailFetcher;

/// Counts for one batch run. `error` is set when the page walk or the store
/// gave out before the listing was exhausted; the counts still reflect what
/// was ingested up to that point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub ingested: u64,
    pub skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Orchestrator over an injected store. Provider clients are passed per call
/// so one pipeline instance serves both providers and tests can substitute
/// fakes at every seam.
pub struct IngestionPipeline<S> {
    store: S,
}

impl<S: ProductStore> IngestionPipeline<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one detail payload, normalize it, and upsert the result.
    /// Nothing partial is persisted: any failure before the upsert returns a
    /// structured error and leaves the store untouched.
    pub async fn ingest_single<C>(
        &self,
        client: &C,
        extractor: Extractor,
        external_id: &str,
    ) -> Result<ProductRecord, IngestError>
    where
        C: DetailFetcher + ?Sized,
    {
        let raw = client.fetch_detail(external_id).await?;
        let record = extractor.extract(external_id, &raw)?;
        record.validate()?;

        let stored = self
            .store
            .upsert(&record)
            .await
            .map_err(IngestError::Store)?;

        info!(
            source = %stored.source,
            external_id = %stored.external_id,
            price = %stored.price,
            "ingested product"
        );
        Ok(stored)
    }

    /// Walk every listing page and ingest each item. Items that fail
    /// extraction or validation are skipped, never fatal to the batch.
    pub async fn ingest_batch<P>(&self, pages: &P, extractor: Extractor) -> BatchOutcome
    where
        P: PageFetcher + ?Sized,
    {
        let walk = pages::walk(pages).await;
        let mut outcome = BatchOutcome {
            error: walk.failure.as_ref().map(|e| e.to_string()),
            ..BatchOutcome::default()
        };

        for item in &walk.items {
            let external_id = match batch_external_id(item) {
                Ok(pid) => pid,
                Err(err) => {
                    warn!(source = %extractor.source(), error = %err, "skipping unkeyed item");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let record = match extractor.extract(external_id, item) {
                Ok(record) => record,
                Err(err) => {
                    warn!(
                        source = %extractor.source(),
                        external_id,
                        error = %err,
                        "skipping item that failed extraction"
                    );
                    outcome.skipped += 1;
                    continue;
                }
            };

            if let Err(err) = record.validate() {
                warn!(
                    source = %extractor.source(),
                    external_id,
                    error = %err,
                    "skipping item that failed validation"
                );
                outcome.skipped += 1;
                continue;
            }

            match self.store.upsert(&record).await {
                Ok(_) => outcome.ingested += 1,
                Err(err) => {
                    // Infra failure, not an item problem: stop rather than
                    // burn through the rest of the listing.
                    error!(external_id, error = %err, "store failure; ending batch early");
                    if outcome.error.is_none() {
                        outcome.error = Some(format!("store error: {err}"));
                    }
                    break;
                }
            }
        }

        info!(
            source = %extractor.source(),
            ingested = outcome.ingested,
            skipped = outcome.skipped,
            complete = outcome.is_complete(),
            "batch finished"
        );
        outcome
    }
}
