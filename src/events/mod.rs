use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Quantity at which an item is considered low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated(Uuid),
    ItemUpdated(Uuid),
    ItemDeleted(Uuid),
    StockRecorded {
        item_id: Uuid,
        transaction_type: String,
        quantity: i32,
        previous_quantity: i32,
        new_quantity: i32,
    },
}

// Function to process incoming events and act on them.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        match event {
            Event::StockRecorded {
                item_id,
                transaction_type,
                quantity,
                previous_quantity,
                new_quantity,
            } => {
                if let Err(e) = handle_stock_recorded(
                    item_id,
                    &transaction_type,
                    quantity,
                    previous_quantity,
                    new_quantity,
                )
                .await
                {
                    error!(
                        "Failed to handle stock recorded event: item_id={}, error={}",
                        item_id, e
                    );
                }
            }
            Event::ItemCreated(item_id) => {
                info!("Inventory item created: {}", item_id);
            }
            Event::ItemUpdated(item_id) => {
                info!("Inventory item updated: {}", item_id);
            }
            Event::ItemDeleted(item_id) => {
                info!("Inventory item deleted: {}", item_id);
            }
        }
    }

    warn!("Event processing loop has ended");
}

async fn handle_stock_recorded(
    item_id: Uuid,
    transaction_type: &str,
    quantity: i32,
    previous_quantity: i32,
    new_quantity: i32,
) -> Result<(), String> {
    info!(
        "Processing stock movement: item={}, type={}, quantity={}, {} -> {}",
        item_id, transaction_type, quantity, previous_quantity, new_quantity
    );

    if new_quantity == 0 {
        warn!("Out of stock: item {} has no units remaining", item_id);
        // Could trigger a reorder or purchasing workflow
    } else if new_quantity < LOW_STOCK_THRESHOLD {
        warn!(
            "Low stock alert: item {} has only {} units remaining",
            item_id, new_quantity
        );
    }

    Ok(())
}
