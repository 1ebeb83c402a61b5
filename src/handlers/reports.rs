use crate::errors::ServiceError;
use crate::services::inventory::TransactionFilter;
use crate::services::reports::Timeframe;
use crate::{ApiResponse, AppState, Pagination};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

// Request DTOs

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DailyReportQuery {
    /// Report day, YYYY-MM-DD. Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct StockMovementQuery {
    /// One of weekly, monthly or yearly. Defaults to monthly.
    pub timeframe: Option<String>,
}

/// Query parameters accepted by the transaction history endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    /// Start of the performed-at window (inclusive), YYYY-MM-DD
    pub start_date: Option<NaiveDate>,
    /// End of the performed-at window (inclusive), YYYY-MM-DD
    pub end_date: Option<NaiveDate>,
    /// Movement direction, "in" or "out"
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Restrict to one item's history
    pub item_id: Option<Uuid>,
    /// Case-insensitive substring match on parts name or parts number
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl TransactionListQuery {
    fn into_filter(self) -> TransactionFilter {
        TransactionFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            transaction_type: self.transaction_type,
            item_id: self.item_id,
            search: self.search,
        }
    }
}

// Handler functions

/// Daily activity summary for one day
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily",
    params(DailyReportQuery),
    responses(
        (status = 200, description = "Daily report returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<DailyReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.daily_summary(query.date).await?;

    info!("Generated daily report for {}", report.date);

    Ok(Json(ApiResponse::success(report)))
}

/// Stock movement series over a timeframe
#[utoipa::path(
    get,
    path = "/api/v1/reports/stock-movement",
    params(StockMovementQuery),
    responses(
        (status = 200, description = "Stock movement report returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn stock_movement(
    State(state): State<AppState>,
    Query(query): Query<StockMovementQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let timeframe = Timeframe::parse(query.timeframe.as_deref());
    let report = state.services.reports.stock_movement(timeframe).await?;

    info!("Generated stock movement report ({:?})", report.timeframe);

    Ok(Json(ApiResponse::success(report)))
}

/// Aggregate statistics over the whole inventory
#[utoipa::path(
    get,
    path = "/api/v1/reports/inventory-stats",
    responses(
        (status = 200, description = "Inventory statistics returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn inventory_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.reports.inventory_stats().await?;

    info!("Generated inventory statistics");

    Ok(Json(ApiResponse::success(stats)))
}

/// Paginated transaction history with optional filtering
#[utoipa::path(
    get,
    path = "/api/v1/reports/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Transaction history returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state
        .config
        .clamp_page_size(query.limit.unwrap_or(state.config.api_default_page_size));
    let filter = query.into_filter();

    let (transactions, total) = state
        .services
        .inventory
        .list_transactions(&filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::paginated(
        transactions,
        Pagination::new(total, page, limit),
    )))
}

/// Creates the router for report endpoints
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/daily", get(daily_report))
        .route("/stock-movement", get(stock_movement))
        .route("/inventory-stats", get(inventory_stats))
        .route("/transactions", get(list_transactions))
}
