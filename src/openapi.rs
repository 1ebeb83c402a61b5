use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = r#"
# Stockroom Inventory Ledger API

A backend for tracking spare parts in a warehouse: stock bookkeeping, an
append-only transaction audit trail, and reporting.

## Features

- **Item Management**: Create, update, and retire warehouse parts
- **Stock Movements**: Every quantity change is recorded as a ledger entry
- **Transaction History**: Filterable, paginated audit trail
- **Reports**: Daily summaries, stock movement series, and inventory statistics

## Error Handling

The API uses a consistent error response format with appropriate HTTP status codes:

```json
{
  "success": false,
  "message": "Inventory item not found",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 10, max: 100)
        "#,
        contact(
            name = "Stockroom Maintainers",
            url = "https://github.com/stockroom-api/stockroom-api"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "inventory", description = "Inventory item and stock movement endpoints"),
        (name = "reports", description = "Reporting and transaction history endpoints")
    ),
    paths(
        // Inventory
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,
        crate::handlers::inventory::record_transaction,

        // Reports
        crate::handlers::reports::daily_report,
        crate::handlers::reports::stock_movement,
        crate::handlers::reports::inventory_stats,
        crate::handlers::reports::list_transactions,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::Pagination,

            // Entities
            crate::entities::inventory_item::Model,
            crate::entities::inventory_transaction::Model,

            // Inventory types
            crate::services::inventory::CreateItemRequest,
            crate::services::inventory::UpdateItemRequest,
            crate::services::inventory::RecordTransactionRequest,
            crate::services::inventory::RecordedTransaction,

            // Report types
            crate::services::reports::Timeframe,
            crate::services::reports::DailySummary,
            crate::services::reports::DailyReport,
            crate::services::reports::StockMovementReport,
            crate::services::reports::ComponentBreakdown,
            crate::services::reports::StockLevelEntry,
            crate::services::reports::InventoryStats,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Stockroom API"));
        assert!(json.contains("/api/v1/inventory"));
        assert!(json.contains("/api/v1/reports/daily"));
    }
}
