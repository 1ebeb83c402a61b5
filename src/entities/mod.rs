pub mod inventory_item;
pub mod inventory_transaction;

pub use inventory_item::Component;
pub use inventory_transaction::TransactionType;
