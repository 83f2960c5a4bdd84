// HTTP request handlers for API endpoints

use actix_web::{web, HttpResponse, Result};

use crate::api::models::*;
use crate::api::server::AppState;
use crate::database_ops::store::ProductStore;
use crate::error::IngestError;
use crate::model::ProductRecord;
use crate::normalization::extract::Extractor;

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_status = match sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(&state.pipeline.store().db.pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Trigger a single Flipkart product ingestion by pid
pub async fn flipkart_product_details(
    query: web::Query<PidQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    tracing::info!(pid = %query.pid, "Flipkart detail ingest requested");

    let result = state
        .pipeline
        .ingest_single(&state.flipkart, Extractor::Flipkart, &query.pid)
        .await;

    Ok(ingest_response(result))
}

/// Trigger a single Amazon product ingestion by ASIN
pub async fn amazon_product_details(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let asin = path.into_inner();
    tracing::info!(asin = %asin, "Amazon detail ingest requested");

    let result = state
        .pipeline
        .ingest_single(&state.amazon, Extractor::Amazon, &asin)
        .await;

    Ok(ingest_response(result))
}

/// Trigger a whole-brand batch ingestion from the Flipkart listing endpoint
pub async fn ingest_brand(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let brand_id = path.into_inner();
    tracing::info!(brand_id = %brand_id, "brand batch ingest requested");

    let pages = state.flipkart.brand_pages(&brand_id);
    let outcome = state.pipeline.ingest_batch(&pages, Extractor::Flipkart).await;

    if outcome.is_complete() {
        Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
    } else {
        // Partial counts ride along with the error so callers can tell how
        // far the walk got.
        let error = outcome.error.clone();
        Ok(HttpResponse::BadGateway().json(ApiResponse {
            success: false,
            data: Some(outcome),
            error,
            meta: Some(Meta::now()),
        }))
    }
}

/// All stored products. A collection endpoint, so an empty array is 200.
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.pipeline.store().find_all().await {
        Ok(records) => Ok(HttpResponse::Ok().json(records)),
        Err(err) => Ok(store_error(err)),
    }
}

/// Lookup by provider-assigned id; 404 when nothing matches.
pub async fn products_by_external_id(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let external_id = path.into_inner();
    Ok(lookup_response(
        state.pipeline.store().find_by_external_id(&external_id).await,
    ))
}

/// Exact name lookup; 404 when nothing matches.
pub async fn products_by_name(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = path.into_inner();
    Ok(lookup_response(
        state.pipeline.store().find_by_name(&name).await,
    ))
}

/// Case-insensitive substring lookup; 404 when nothing matches.
pub async fn products_by_partial_name(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let partial = path.into_inner();
    Ok(lookup_response(
        state
            .pipeline
            .store()
            .find_by_name_substring_ci(&partial)
            .await,
    ))
}

/// Names containing both tokens. Returns a bare array, empty included.
pub async fn search_products(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match state
        .pipeline
        .store()
        .find_by_name_containing_both(&query.initial, &query.color)
        .await
    {
        Ok(records) => Ok(HttpResponse::Ok().json(records)),
        Err(err) => Ok(store_error(err)),
    }
}

fn ingest_response(result: Result<ProductRecord, IngestError>) -> HttpResponse {
    match result {
        Ok(record) => HttpResponse::Ok().json(ApiResponse::success(record)),
        Err(err) => {
            tracing::warn!(error = %err, "ingest trigger failed");
            let body = ApiResponse::<ProductRecord>::error(err.to_string());
            match err {
                IngestError::Transport(_) => HttpResponse::BadGateway().json(body),
                IngestError::Extraction(_) | IngestError::Validation(_) => {
                    HttpResponse::UnprocessableEntity().json(body)
                }
                IngestError::Store(_) => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

fn lookup_response(result: anyhow::Result<Vec<ProductRecord>>) -> HttpResponse {
    match result {
        Ok(records) if records.is_empty() => HttpResponse::NotFound().finish(),
        Ok(records) => HttpResponse::Ok().json(records),
        Err(err) => store_error(err),
    }
}

fn store_error(err: anyhow::Error) -> HttpResponse {
    tracing::error!(error = %err, "store query failed");
    HttpResponse::InternalServerError()
        .json(ApiResponse::<Vec<ProductRecord>>::error(err.to_string()))
}
