//! Seed data script - populates the database with realistic demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 12 warehouse parts across all component categories
//! - An opening stock-in ledger entry per part
//! - A handful of extra stock movements so the reports have shape

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ConnectOptions;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;
use tracing::info;

use stockroom_api::events::{process_events, EventSender};
use stockroom_api::services::inventory::{
    CreateItemRequest, InventoryService, RecordTransactionRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Stockroom API Seed Data ===");
    info!("Creating realistic demo data for exploration...");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://stockroom.db?mode=rwc".to_string());

    let mut options = ConnectOptions::new(database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(StdDuration::from_secs(10))
        .acquire_timeout(StdDuration::from_secs(10));

    info!("Connecting to database: {}", database_url);
    let db = sea_orm::Database::connect(options).await?;
    stockroom_api::db::run_migrations(&db).await?;
    info!("Connected, schema ready");

    let db = Arc::new(db);
    let (event_tx, event_rx) = mpsc::channel(256);
    let event_task = tokio::spawn(process_events(event_rx));
    let inventory = InventoryService::new(db, Arc::new(EventSender::new(event_tx)));

    info!("Creating inventory items...");
    let items = create_items(&inventory).await?;
    info!("  Created {} items with opening ledger entries", items.len());

    info!("Recording extra stock movements...");
    let movements = record_movements(&inventory, &items).await?;
    info!("  Recorded {} stock movements", movements);

    info!("=== Seed Data Complete ===");
    info!("");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/inventory");
    info!("  curl http://localhost:8080/api/v1/reports/inventory-stats");
    info!("  curl http://localhost:8080/api/v1/reports/stock-movement?timeframe=weekly");
    info!("");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    event_task.abort();
    Ok(())
}

async fn create_items(
    inventory: &InventoryService,
) -> anyhow::Result<Vec<stockroom_api::entities::inventory_item::Model>> {
    // (name, number, component, qty, price, rack, po, ctpl, days_ago)
    let items_data: Vec<(&str, &str, &str, i32, Decimal, &str, &str, &str, i64)> = vec![
        ("Crankshaft Assembly", "ENG-104", "Engine", 12, dec!(420.00), "A1", "PO-2301", "CTPL-104", 45),
        ("Oil Filter", "ENG-221", "Engine", 60, dec!(12.50), "A2", "PO-2301", "CTPL-221", 45),
        ("Turbocharger Core", "ENG-310", "Engine", 4, dec!(980.00), "A3", "PO-2310", "CTPL-310", 30),
        ("Hydraulic Pump 40L", "HYD-040", "Hydraulic", 8, dec!(650.00), "B1", "PO-2305", "CTPL-040", 40),
        ("Hose Coupling 3/4\"", "HYD-112", "Hydraulic", 150, dec!(4.75), "B2", "PO-2305", "CTPL-112", 40),
        ("Cylinder Seal Kit", "HYD-200", "Hydraulic", 25, dec!(38.00), "B2", "PO-2318", "CTPL-200", 14),
        ("Alternator 24V", "ELE-024", "Electrical", 10, dec!(310.00), "C1", "PO-2307", "CTPL-024", 35),
        ("Wiring Harness", "ELE-118", "Electrical", 18, dec!(95.00), "C2", "PO-2307", "CTPL-118", 35),
        ("Drive Chain 1.5m", "MEC-015", "Mechanical", 30, dec!(55.00), "D1", "PO-2312", "CTPL-015", 21),
        ("Bearing Set 6204", "MEC-620", "Mechanical", 80, dec!(9.90), "D1", "PO-2312", "CTPL-620", 21),
        ("Cab Door Panel", "BOD-301", "Body", 6, dec!(240.00), "E1", "PO-2315", "CTPL-301", 10),
        ("Mirror Assembly", "BOD-415", "Body", 14, dec!(78.00), "E2", "PO-2315", "CTPL-415", 10),
    ];

    let today = Utc::now().date_naive();
    let mut created = Vec::new();

    for (name, number, component, quantity, price, rack, po, ctpl, days_ago) in items_data {
        let request = CreateItemRequest {
            parts_name: name.to_string(),
            parts_number: number.to_string(),
            component: component.to_string(),
            quantity,
            item_price: price,
            image_data: None,
            rack: rack.to_string(),
            tax: price * dec!(0.12),
            total_amount: price * Decimal::from(quantity),
            pic: "Warehouse Demo".to_string(),
            po_number: po.to_string(),
            ctpl_number: ctpl.to_string(),
            acquired_date: today - Duration::days(days_ago),
            created_by: Some("seed-data".to_string()),
        };

        let item = inventory.create_item(request).await?;
        info!("  {} {} x{}", item.parts_number, item.parts_name, item.quantity);
        created.push(item);
    }

    Ok(created)
}

async fn record_movements(
    inventory: &InventoryService,
    items: &[stockroom_api::entities::inventory_item::Model],
) -> anyhow::Result<usize> {
    // (item index, direction, quantity, note)
    let movements = [
        (0usize, "out", 3, "Issued to workshop bay 2"),
        (1, "out", 12, "Scheduled service batch"),
        (1, "in", 24, "Restock from supplier"),
        (4, "out", 40, "Line replacement job"),
        (6, "out", 2, "Warranty replacement"),
        (8, "in", 10, "Returned from project surplus"),
        (10, "out", 1, "Damage write-off"),
    ];

    for (index, direction, quantity, note) in movements {
        let item = &items[index];
        inventory
            .record_transaction(RecordTransactionRequest {
                item_id: Some(item.id),
                transaction_type: Some(direction.to_string()),
                quantity: Some(quantity),
                notes: Some(note.to_string()),
                performed_by: Some("seed-data".to_string()),
            })
            .await?;
    }

    Ok(movements.len())
}
