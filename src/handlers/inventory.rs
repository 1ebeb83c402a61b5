use crate::errors::ServiceError;
use crate::services::inventory::{
    CreateItemRequest, ItemFilter, RecordTransactionRequest, UpdateItemRequest,
};
use crate::{ApiResponse, AppState, Pagination};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Query parameters accepted by the item listing endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    /// Restrict to one component category (Engine, Hydraulic, ...)
    pub component: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    /// Case-insensitive substring match on parts name or parts number
    pub search: Option<String>,
    /// Earliest acquired date (inclusive), YYYY-MM-DD
    pub start_date: Option<NaiveDate>,
    /// Latest acquired date (inclusive), YYYY-MM-DD
    pub end_date: Option<NaiveDate>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ItemListQuery {
    fn into_filter(self) -> ItemFilter {
        ItemFilter {
            component: self.component,
            min_price: self.min_price,
            max_price: self.max_price,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            search: self.search,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Create the inventory router
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route("/transaction", post(record_transaction))
        .route(
            "/:id",
            get(get_inventory).put(update_inventory).delete(delete_inventory),
        )
}

/// List inventory items with optional filtering and pagination
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Inventory items returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state
        .config
        .clamp_page_size(query.limit.unwrap_or(state.config.api_default_page_size));
    let filter = query.into_filter();

    let (items, total) = state
        .services
        .inventory
        .list_items(&filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::paginated(
        items,
        Pagination::new(total, page, limit),
    )))
}

/// Fetch a single inventory item by id
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Inventory item returned"),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.get_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Create a new inventory item
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Inventory item created"),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Update an existing inventory item
#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Inventory item updated"),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.update_item(id, payload).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete an inventory item, closing out any remaining stock
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Inventory item deleted"),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.inventory.delete_item(id).await?;
    Ok(Json(ApiResponse::success(json!({}))))
}

/// Record a stock movement against an item
#[utoipa::path(
    post,
    path = "/api/v1/inventory/transaction",
    request_body = RecordTransactionRequest,
    responses(
        (status = 200, description = "Stock movement recorded"),
        (status = 400, description = "Invalid transaction", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<RecordTransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let recorded = state.services.inventory.record_transaction(payload).await?;
    Ok(Json(ApiResponse::success(recorded)))
}
