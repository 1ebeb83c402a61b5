pub mod health;
pub mod inventory;
pub mod reports;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: crate::services::inventory::InventoryService,
    pub reports: crate::services::reports::ReportService,
}

impl AppServices {
    /// Build the AppServices container backed by the shared database pool.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let inventory =
            crate::services::inventory::InventoryService::new(db_pool.clone(), event_sender);
        let reports =
            crate::services::reports::ReportService::new(db_pool, config.low_stock_threshold);

        Self { inventory, reports }
    }
}
