//! REST interface to the SLA dashboard

pub mod handlers;
pub mod service;

pub use service::{DashboardService, ServiceError};

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest workbook accepted by `POST /api/v1/dataset`.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Dataset
        .route(
            "/api/v1/dataset",
            get(handlers::get_dataset).post(handlers::upload_dataset),
        )
        // Global filters
        .route(
            "/api/v1/filters",
            get(handlers::get_filters).put(handlers::put_filters),
        )
        // Dashboard views over the filtered records
        .route("/api/v1/overview", get(handlers::get_overview))
        .route("/api/v1/rankings/:dimension", get(handlers::get_ranking))
        .route("/api/v1/volume/monthly", get(handlers::get_monthly_volume))
        .route("/api/v1/sla/carriers", get(handlers::get_carrier_sla))
        .route("/api/v1/pending", get(handlers::get_pending))
        // Lookup over all records
        .route("/api/v1/invoices", get(handlers::search_invoices))
        .with_state(service)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
