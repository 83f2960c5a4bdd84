//! Product ingestion service: fetches listings and detail records from two
//! third-party e-commerce data providers, normalizes their payloads into one
//! canonical record shape, and persists the result in Postgres for query.

pub mod api;
pub mod database_ops;
pub mod error;
pub mod model;
pub mod normalization;
pub mod pipeline;
pub mod providers;
pub mod tracing;

pub mod util {
    pub mod env;
}
