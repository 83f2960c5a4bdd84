//! Sequential walk over a provider's paginated listing endpoint.
//!
//! Page 1 declares the total page count and that declaration is
//! authoritative: later pages never re-read it, even if they disagree.
//! Pages are fetched strictly one at a time as a politeness constraint
//! against the upstream API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::TransportError;

/// One listing page by number. Implemented by `FlipkartClient::brand_pages`
/// and by test fakes.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Value, TransportError>;
}

/// Outcome of a walk. Finite and not restartable; a failure partway through
/// keeps the items already collected (partial-result semantics), it never
/// retracts them.
#[derive(Debug, Default)]
pub struct PageWalk {
    /// Raw items in page order, then item order within each page.
    pub items: Vec<Value>,
    /// Total page count declared by page 1 (0 when page 1 never decoded).
    pub total_pages: u32,
    /// Pages successfully fetched and decoded.
    pub pages_fetched: u32,
    /// Set when the walk ended early. An empty `items` with a failure set is
    /// a failed walk, not an empty listing.
    pub failure: Option<TransportError>,
}

pub async fn walk<F: PageFetcher + ?Sized>(fetcher: &F) -> PageWalk {
    let mut out = PageWalk::default();

    let first = match fetcher.fetch_page(1).await {
        Ok(body) => body,
        Err(err) => {
            warn!(page = 1, error = %err, "page walk aborted on first page");
            out.failure = Some(err);
            return out;
        }
    };
    out.pages_fetched = 1;

    let total = match first.get("totalPages").and_then(Value::as_i64) {
        Some(total) => total,
        None => {
            out.failure = Some(TransportError::Decode(
                "page 1 missing integer `totalPages`".to_string(),
            ));
            return out;
        }
    };
    if total < 1 {
        info!(total_pages = total, "listing declared no pages");
        return out;
    }
    out.total_pages = total.min(i64::from(u32::MAX)) as u32;

    match page_items(&first) {
        Ok(items) => out.items.extend(items),
        Err(err) => {
            out.failure = Some(err);
            return out;
        }
    }

    for page in 2..=out.total_pages {
        let body = match fetcher.fetch_page(page).await {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    page,
                    total_pages = out.total_pages,
                    error = %err,
                    "page walk aborted; keeping items from earlier pages"
                );
                out.failure = Some(err);
                return out;
            }
        };
        out.pages_fetched += 1;

        match page_items(&body) {
            Ok(items) => out.items.extend(items),
            Err(err) => {
                out.failure = Some(err);
                return out;
            }
        }
    }

    info!(
        pages = out.pages_fetched,
        items = out.items.len(),
        "page walk complete"
    );
    out
}

fn page_items(body: &Value) -> Result<Vec<Value>, TransportError> {
    body.get("products")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| TransportError::Decode("page missing `products` array".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted fake: each page number answers once, unscripted pages fail.
    struct ScriptedPages {
        responses: Mutex<HashMap<u32, Result<Value, TransportError>>>,
        calls: Mutex<Vec<u32>>,
    }

    impl ScriptedPages {
        fn new(responses: Vec<(u32, Result<Value, TransportError>)>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedPages {
        async fn fetch_page(&self, page: u32) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(page);
            self.responses
                .lock()
                .unwrap()
                .remove(&page)
                .unwrap_or_else(|| Err(TransportError::Network("unscripted page".to_string())))
        }
    }

    fn page(total: i64, pids: &[&str]) -> Value {
        let products: Vec<Value> = pids.iter().map(|pid| json!({ "pid": pid })).collect();
        json!({ "totalPages": total, "products": products })
    }

    #[tokio::test]
    async fn walks_all_declared_pages_in_order() {
        let pages = ScriptedPages::new(vec![
            (1, Ok(page(3, &["a1", "a2"]))),
            (2, Ok(page(3, &["b1"]))),
            (3, Ok(page(3, &["c1", "c2"]))),
        ]);

        let walk = walk(&pages).await;

        assert_eq!(pages.calls(), vec![1, 2, 3]);
        assert_eq!(walk.pages_fetched, 3);
        assert!(walk.failure.is_none());
        let pids: Vec<&str> = walk
            .items
            .iter()
            .map(|i| i.get("pid").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(pids, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[tokio::test]
    async fn first_page_declaration_is_authoritative() {
        // Page 2 claims 5 total pages; the walk must still stop at 3.
        let pages = ScriptedPages::new(vec![
            (1, Ok(page(3, &["a"]))),
            (2, Ok(page(5, &["b"]))),
            (3, Ok(page(5, &["c"]))),
        ]);

        let walk = walk(&pages).await;

        assert_eq!(pages.calls(), vec![1, 2, 3]);
        assert!(walk.failure.is_none());
        assert_eq!(walk.items.len(), 3);
    }

    #[tokio::test]
    async fn zero_total_pages_yields_empty_success() {
        let pages = ScriptedPages::new(vec![(1, Ok(page(0, &["ignored"])))]);

        let walk = walk(&pages).await;

        assert!(walk.items.is_empty());
        assert!(walk.failure.is_none());
        assert_eq!(pages.calls(), vec![1]);
    }

    #[tokio::test]
    async fn first_page_failure_is_signalled_not_silent() {
        let pages = ScriptedPages::new(vec![(
            1,
            Err(TransportError::Network("connection refused".to_string())),
        )]);

        let walk = walk(&pages).await;

        assert!(walk.items.is_empty());
        assert!(matches!(walk.failure, Some(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn mid_walk_failure_keeps_earlier_items() {
        let pages = ScriptedPages::new(vec![
            (1, Ok(page(3, &["a1", "a2"]))),
            (2, Err(TransportError::Http { status: 503 })),
        ]);

        let walk = walk(&pages).await;

        assert_eq!(walk.items.len(), 2);
        assert_eq!(walk.pages_fetched, 1);
        assert!(matches!(
            walk.failure,
            Some(TransportError::Http { status: 503 })
        ));
        // Page 3 must not be requested after the abort.
        assert_eq!(pages.calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn malformed_first_page_is_a_decode_failure() {
        let pages = ScriptedPages::new(vec![(1, Ok(json!({ "products": [] })))]);
        let walk = walk(&pages).await;
        assert!(matches!(walk.failure, Some(TransportError::Decode(_))));

        let pages = ScriptedPages::new(vec![(1, Ok(json!({ "totalPages": 2 })))]);
        let walk = super::walk(&pages).await;
        assert!(matches!(walk.failure, Some(TransportError::Decode(_))));
        assert!(walk.items.is_empty());
    }
}
