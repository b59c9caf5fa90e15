//! REST API handlers for the SLA dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{DashboardService, FilterState, PendingOverview, ServiceError};
use crate::chart::{axis_label, bar_text, place_labels, LabelStyle, TextLayout};
use crate::filters::{DateBounds, FilterSelection, FilterSummary};
use crate::lookup::InvoiceDetail;
use crate::metrics::{CarrierAttainment, Overview, PendingRow, Ranking};
use crate::models::Dimension;
use crate::session::DatasetPreview;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct BarResponse {
    pub label: String,
    pub axis_label: String,
    pub count: usize,
    pub percent: f64,
    pub text: String,
    pub style: LabelStyle,
}

#[derive(Serialize)]
pub struct RankingResponse {
    pub dimension: Dimension,
    pub total_records: usize,
    pub distinct_values: usize,
    pub leader: Option<String>,
    pub top3_share: f64,
    pub layout: TextLayout,
    pub bars: Vec<BarResponse>,
}

impl RankingResponse {
    fn new(ranking: Ranking, threshold_percent: f64) -> Self {
        let counts = ranking.counts();
        let styles = place_labels(&counts, threshold_percent);

        Self {
            dimension: ranking.dimension,
            total_records: ranking.total_records,
            distinct_values: ranking.distinct_values,
            leader: ranking.leader().map(|e| e.label.clone()),
            top3_share: ranking.top_share(3),
            layout: TextLayout::for_values(&counts, threshold_percent),
            bars: ranking
                .entries
                .into_iter()
                .zip(styles)
                .map(|(e, style)| BarResponse {
                    axis_label: axis_label(&e.label),
                    text: bar_text(e.count, e.percent),
                    label: e.label,
                    count: e.count,
                    percent: e.percent,
                    style,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct MonthVolumeResponse {
    pub month: String,
    pub invoices: usize,
    pub style: LabelStyle,
}

#[derive(Serialize)]
pub struct MonthlyVolumeResponse {
    pub total: usize,
    pub layout: TextLayout,
    pub months: Vec<MonthVolumeResponse>,
}

#[derive(Serialize)]
pub struct FiltersResponse {
    pub business_units: Vec<String>,
    pub excluded_business_units: Vec<String>,
    pub carriers: Vec<String>,
    pub date_bounds: Option<DateBounds>,
    pub selection: FilterSelection,
    pub summary: FilterSummary,
    pub warnings: Vec<String>,
}

impl From<FilterState> for FiltersResponse {
    fn from(state: FilterState) -> Self {
        Self {
            business_units: state.options.business_units,
            excluded_business_units: state.options.excluded_business_units,
            carriers: state.options.carriers,
            date_bounds: state.options.date_bounds,
            selection: state.selection,
            summary: state.summary,
            warnings: state.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct CarrierBreakdownResponse {
    pub carrier: String,
    pub shipments: usize,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub total: usize,
    pub undelivered: usize,
    pub delivered_late: usize,
    pub by_carrier: Vec<CarrierBreakdownResponse>,
    pub shipments: Vec<PendingRow>,
    pub message: Option<String>,
}

impl From<PendingOverview> for PendingResponse {
    fn from(p: PendingOverview) -> Self {
        let total = p.undelivered + p.delivered_late;
        Self {
            total,
            undelivered: p.undelivered,
            delivered_late: p.delivered_late,
            by_carrier: p
                .by_carrier
                .into_iter()
                .map(|(carrier, shipments)| CarrierBreakdownResponse { carrier, shipments })
                .collect(),
            shipments: p.shipments,
            message: (total == 0).then(|| "No pending shipments".to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct CarrierSlaResponse {
    pub min_deliveries: usize,
    pub carriers: Vec<CarrierAttainment>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct InvoiceSearchResponse {
    pub query: String,
    pub matches: usize,
    pub invoices: Vec<InvoiceDetail>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct InvoiceQuery {
    #[serde(default)]
    pub q: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NoDataset => StatusCode::CONFLICT,
        ServiceError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /api/v1/dataset
pub async fn upload_dataset(
    State(service): State<AppState>,
    Query(params): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<DatasetPreview>, ApiError> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse {
            error: "Request body must contain an .xlsx workbook".to_string(),
        })));
    }

    let name = params.name.unwrap_or_else(|| "upload.xlsx".to_string());
    match service.load_bytes(body.to_vec(), &name).await {
        Ok(preview) => Ok(Json(preview)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/dataset
pub async fn get_dataset(State(service): State<AppState>) -> Result<Json<DatasetPreview>, ApiError> {
    service.preview().await.map(Json).map_err(error_response)
}

/// GET /api/v1/filters
pub async fn get_filters(State(service): State<AppState>) -> Result<Json<FiltersResponse>, ApiError> {
    match service.filters().await {
        Ok(state) => Ok(Json(FiltersResponse::from(state))),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/v1/filters
pub async fn put_filters(
    State(service): State<AppState>,
    Json(selection): Json<FilterSelection>,
) -> Result<Json<FiltersResponse>, ApiError> {
    match service.set_filters(selection).await {
        Ok(state) => Ok(Json(FiltersResponse::from(state))),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/overview
pub async fn get_overview(State(service): State<AppState>) -> Result<Json<Overview>, ApiError> {
    service.overview().await.map(Json).map_err(error_response)
}

/// GET /api/v1/rankings/:dimension
pub async fn get_ranking(
    State(service): State<AppState>,
    Path(dimension): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let dimension: Dimension = dimension.parse().map_err(|error| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
    })?;

    let threshold = service.config().label_threshold_percent;
    match service.ranking(dimension, params.limit).await {
        Ok(ranking) => Ok(Json(RankingResponse::new(ranking, threshold))),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/volume/monthly
pub async fn get_monthly_volume(
    State(service): State<AppState>,
) -> Result<Json<MonthlyVolumeResponse>, ApiError> {
    let threshold = service.config().label_threshold_percent;
    match service.monthly_volume().await {
        Ok(months) => {
            let counts: Vec<f64> = months.iter().map(|(_, n)| *n as f64).collect();
            let styles = place_labels(&counts, threshold);
            Ok(Json(MonthlyVolumeResponse {
                total: months.iter().map(|(_, n)| n).sum(),
                layout: TextLayout::for_values(&counts, threshold),
                months: months
                    .into_iter()
                    .zip(styles)
                    .map(|((month, invoices), style)| MonthVolumeResponse { month, invoices, style })
                    .collect(),
            }))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/sla/carriers
pub async fn get_carrier_sla(State(service): State<AppState>) -> Result<Json<CarrierSlaResponse>, ApiError> {
    let min_deliveries = service.config().min_carrier_deliveries;
    match service.carrier_attainment().await {
        Ok(carriers) => Ok(Json(CarrierSlaResponse {
            min_deliveries,
            message: carriers.is_empty().then(|| {
                format!("No carrier has at least {} evaluated deliveries", min_deliveries)
            }),
            carriers,
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/pending
pub async fn get_pending(State(service): State<AppState>) -> Result<Json<PendingResponse>, ApiError> {
    service
        .pending()
        .await
        .map(|p| Json(PendingResponse::from(p)))
        .map_err(error_response)
}

/// GET /api/v1/invoices?q=
pub async fn search_invoices(
    State(service): State<AppState>,
    Query(params): Query<InvoiceQuery>,
) -> Result<Json<InvoiceSearchResponse>, ApiError> {
    match service.lookup(&params.q).await {
        Ok(invoices) => Ok(Json(InvoiceSearchResponse {
            message: invoices
                .is_empty()
                .then(|| format!("No invoice found matching '{}'", params.q)),
            query: params.q,
            matches: invoices.len(),
            invoices,
        })),
        Err(e) => Err(error_response(e)),
    }
}
