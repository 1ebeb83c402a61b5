//! Stockroom API Library
//!
//! Inventory ledger backend for parts warehouses: current-state item records,
//! an append-only transaction log, and the service layer that keeps the two
//! consistent.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod request_id;
pub mod services;

use axum::{response::Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers

/// Envelope every endpoint answers with: `{success, data?, message?, pagination?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata accompanying list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: total.div_ceil(limit.max(1)),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Versioned API routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest("/reports", handlers::reports::report_routes())
}

/// Service banner served at `/`
pub async fn service_banner() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui",
    })))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn pagination_rounds_page_count_up() {
        let pagination = Pagination::new(21, 1, 10);
        assert_eq!(pagination.pages, 3);

        let exact = Pagination::new(20, 2, 10);
        assert_eq!(exact.pages, 2);

        let empty = Pagination::new(0, 1, 10);
        assert_eq!(empty.pages, 0);
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::success(json!({"ok": true}))).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("message").is_none());
        assert!(body.get("pagination").is_none());

        let body =
            serde_json::to_value(ApiResponse::paginated(json!([]), Pagination::new(5, 1, 2)))
                .unwrap();
        assert_eq!(body["pagination"]["pages"], 3);
        assert_eq!(body["pagination"]["total"], 5);
    }
}
