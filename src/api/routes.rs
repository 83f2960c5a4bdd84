// API route configuration

use actix_web::web;

use crate::api::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // Ingestion triggers
        .route(
            "/api/flipkart/product-details",
            web::get().to(handlers::flipkart_product_details),
        )
        .route(
            "/api/amazon/product-details/{asin}",
            web::get().to(handlers::amazon_product_details),
        )
        .route(
            "/api/flipkart/products-by-brand/{brand_id}",
            web::get().to(handlers::ingest_brand),
        )
        // Query endpoints
        .route("/api/products", web::get().to(handlers::list_products))
        .route(
            "/api/products/productId/{productId}",
            web::get().to(handlers::products_by_external_id),
        )
        .route(
            "/api/products/name/{name}",
            web::get().to(handlers::products_by_name),
        )
        .route(
            "/api/products/partial-name/{partialName}",
            web::get().to(handlers::products_by_partial_name),
        )
        .route("/products/search", web::get().to(handlers::search_products));
}
