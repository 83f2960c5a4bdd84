//! Durable storage boundary for canonical product records.
//!
//! Upsert is keyed by `(source, external_id)`: re-ingesting the same product
//! with unchanged fields is a no-op as far as list/search results are
//! concerned, and `created_at` is preserved from the first ingestion.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::database_ops::db::Db;
use crate::model::{ProductRecord, Source};

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert-or-update by `(source, external_id)`; returns the stored row
    /// including the surrogate id. Atomic per call.
    async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord>;

    async fn find_all(&self) -> Result<Vec<ProductRecord>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Vec<ProductRecord>>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>>;

    /// Case-insensitive substring match on the name.
    async fn find_by_name_substring_ci(&self, partial: &str) -> Result<Vec<ProductRecord>>;

    /// Names containing both tokens, case-insensitive, any order.
    async fn find_by_name_containing_both(
        &self,
        token_a: &str,
        token_b: &str,
    ) -> Result<Vec<ProductRecord>>;
}

/// Postgres-backed store over the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pub db: Db,
}

impl PgProductStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

const SELECT_COLS: &str = "id, external_id, name, price, source, created_at";

fn row_to_record(row: &PgRow) -> Result<ProductRecord> {
    let source_raw: String = row.try_get("source")?;
    let source: Source = source_raw
        .parse()
        .map_err(|e: anyhow::Error| e.context("product row has unknown source"))?;

    Ok(ProductRecord {
        id: Some(row.try_get::<i64, _>("id")?),
        external_id: row.try_get("external_id")?,
        name: row.try_get("name")?,
        price: row.try_get::<BigDecimal, _>("price")?,
        source,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn rows_to_records(rows: Vec<PgRow>) -> Result<Vec<ProductRecord>> {
    rows.iter().map(row_to_record).collect()
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord> {
        // created_at is deliberately absent from the update list: it marks
        // the first ingestion and survives re-ingestion.
        let row = sqlx::query(
            "INSERT INTO products (external_id, name, price, source, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (source, external_id) \
             DO UPDATE SET name = EXCLUDED.name, price = EXCLUDED.price \
             RETURNING id, external_id, name, price, source, created_at",
        )
        .bind(&record.external_id)
        .bind(&record.name)
        .bind(&record.price)
        .bind(record.source.as_str())
        .bind(record.created_at)
        .fetch_one(&self.db.pool)
        .await
        .context("upsert product")?;

        row_to_record(&row)
    }

    async fn find_all(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.db.pool)
        .await?;
        rows_to_records(rows)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM products WHERE external_id = $1 ORDER BY id"
        ))
        .bind(external_id)
        .fetch_all(&self.db.pool)
        .await?;
        rows_to_records(rows)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM products WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.db.pool)
        .await?;
        rows_to_records(rows)
    }

    async fn find_by_name_substring_ci(&self, partial: &str) -> Result<Vec<ProductRecord>> {
        let pattern = format!("%{}%", partial);
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM products WHERE name ILIKE $1 ORDER BY id"
        ))
        .bind(&pattern)
        .fetch_all(&self.db.pool)
        .await?;
        rows_to_records(rows)
    }

    async fn find_by_name_containing_both(
        &self,
        token_a: &str,
        token_b: &str,
    ) -> Result<Vec<ProductRecord>> {
        let pattern_a = format!("%{}%", token_a);
        let pattern_b = format!("%{}%", token_b);
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM products WHERE name ILIKE $1 AND name ILIKE $2 ORDER BY id"
        ))
        .bind(&pattern_a)
        .bind(&pattern_b)
        .fetch_all(&self.db.pool)
        .await?;
        rows_to_records(rows)
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory store double mirroring the Postgres upsert and query
    //! semantics closely enough for pipeline tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        rows: Mutex<Vec<ProductRecord>>,
        pub fail_upserts: bool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail_upserts: true,
            }
        }
    }

    #[async_trait]
    impl ProductStore for MemoryStore {
        async fn upsert(&self, record: &ProductRecord) -> Result<ProductRecord> {
            if self.fail_upserts {
                anyhow::bail!("store unavailable");
            }
            let mut rows = self.rows.lock().unwrap();
            if let Some(existing) = rows
                .iter_mut()
                .find(|r| r.source == record.source && r.external_id == record.external_id)
            {
                // created_at and id survive; name and price follow the fetch.
                existing.name = record.name.clone();
                existing.price = record.price.clone();
                return Ok(existing.clone());
            }
            let mut stored = record.clone();
            stored.id = Some(rows.len() as i64 + 1);
            rows.push(stored.clone());
            Ok(stored)
        }

        async fn find_all(&self) -> Result<Vec<ProductRecord>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_by_external_id(&self, external_id: &str) -> Result<Vec<ProductRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.external_id == external_id)
                .cloned()
                .collect())
        }

        async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.name == name)
                .cloned()
                .collect())
        }

        async fn find_by_name_substring_ci(&self, partial: &str) -> Result<Vec<ProductRecord>> {
            let needle = partial.to_lowercase();
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        async fn find_by_name_containing_both(
            &self,
            token_a: &str,
            token_b: &str,
        ) -> Result<Vec<ProductRecord>> {
            let a = token_a.to_lowercase();
            let b = token_b.to_lowercase();
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    let name = r.name.to_lowercase();
                    name.contains(&a) && name.contains(&b)
                })
                .cloned()
                .collect())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Utc;

        fn record(external_id: &str, name: &str, price: i64, source: Source) -> ProductRecord {
            ProductRecord {
                id: None,
                external_id: external_id.into(),
                name: name.into(),
                price: BigDecimal::from(price),
                source,
                created_at: Utc::now(),
            }
        }

        #[tokio::test]
        async fn upsert_keyed_by_source_and_external_id() {
            let store = MemoryStore::new();
            let first = store
                .upsert(&record("ITM1", "SmartPhone X", 12999, Source::Flipkart))
                .await
                .unwrap();

            // Same conceptual product fetched again with a new price.
            let second = store
                .upsert(&record("ITM1", "SmartPhone X", 11499, Source::Flipkart))
                .await
                .unwrap();

            assert_eq!(first.id, second.id);
            assert_eq!(second.created_at, first.created_at);
            assert_eq!(store.find_all().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn same_external_id_different_source_stays_distinct() {
            let store = MemoryStore::new();
            store
                .upsert(&record("X1", "Phone", 100, Source::Flipkart))
                .await
                .unwrap();
            store
                .upsert(&record("X1", "Phone", 100, Source::Amazon))
                .await
                .unwrap();

            assert_eq!(store.find_all().await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn substring_match_is_case_insensitive() {
            let store = MemoryStore::new();
            store
                .upsert(&record("ITM1", "SmartPhone X", 12999, Source::Flipkart))
                .await
                .unwrap();

            let hits = store.find_by_name_substring_ci("phone").await.unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].name, "SmartPhone X");

            assert!(store
                .find_by_name_substring_ci("tablet")
                .await
                .unwrap()
                .is_empty());
        }

        #[tokio::test]
        async fn both_token_search_requires_both() {
            let store = MemoryStore::new();
            store
                .upsert(&record("ITM2", "Galaxy Blue Case", 499, Source::Flipkart))
                .await
                .unwrap();

            assert_eq!(
                store
                    .find_by_name_containing_both("galaxy", "blue")
                    .await
                    .unwrap()
                    .len(),
                1
            );
            assert!(store
                .find_by_name_containing_both("galaxy", "red")
                .await
                .unwrap()
                .is_empty());
        }
    }
}
