use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::inventory_item::{self, Component, Entity as InventoryItem},
    entities::inventory_transaction::{self, TransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Actor recorded when the caller does not identify one.
pub const DEFAULT_ACTOR: &str = "system";

/// Attempts for a version-guarded write before giving up with
/// `ConcurrentModification`.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Decoded size limit for inline item images.
const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Request/Response types for the inventory service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Please add a parts name"))]
    pub parts_name: String,
    #[validate(length(min = 1, message = "Please add a parts number"))]
    pub parts_number: String,
    #[validate(length(min = 1, message = "Please specify the component type"))]
    pub component: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(custom = "validate_price")]
    pub item_price: Decimal,
    pub image_data: Option<String>,
    #[validate(length(min = 1, message = "Please specify rack location"))]
    pub rack: String,
    #[serde(default)]
    pub tax: Decimal,
    pub total_amount: Decimal,
    #[validate(length(min = 1, message = "Please add PIC"))]
    pub pic: String,
    #[validate(length(min = 1, message = "Please add PO number"))]
    pub po_number: String,
    #[validate(length(min = 1, message = "Please add CTPL number"))]
    pub ctpl_number: String,
    pub acquired_date: NaiveDate,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, message = "Please add a parts name"))]
    pub parts_name: Option<String>,
    #[validate(length(min = 1, message = "Please add a parts number"))]
    pub parts_number: Option<String>,
    pub component: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_price")]
    pub item_price: Option<Decimal>,
    pub image_data: Option<String>,
    #[validate(length(min = 1, message = "Please specify rack location"))]
    pub rack: Option<String>,
    pub tax: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    #[validate(length(min = 1, message = "Please add PIC"))]
    pub pic: Option<String>,
    #[validate(length(min = 1, message = "Please add PO number"))]
    pub po_number: Option<String>,
    #[validate(length(min = 1, message = "Please add CTPL number"))]
    pub ctpl_number: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub created_by: Option<String>,
}

/// Stock in/out request. Fields are optional on the wire so an incomplete
/// body gets the explicit "Please provide ..." message instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub item_id: Option<Uuid>,
    pub transaction_type: Option<String>,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
    pub performed_by: Option<String>,
}

/// Outcome of a ledger write: the refreshed item and the appended entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordedTransaction {
    pub item: inventory_item::Model,
    pub transaction: inventory_transaction::Model,
}

/// Item listing predicates, AND-ed together. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub component: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ItemFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(component) = &self.component {
            condition = condition.add(inventory_item::Column::Component.eq(component.clone()));
        }
        if let Some(min_price) = self.min_price {
            condition = condition.add(inventory_item::Column::ItemPrice.gte(min_price));
        }
        if let Some(max_price) = self.max_price {
            condition = condition.add(inventory_item::Column::ItemPrice.lte(max_price));
        }
        if let Some(min_quantity) = self.min_quantity {
            condition = condition.add(inventory_item::Column::Quantity.gte(min_quantity));
        }
        if let Some(max_quantity) = self.max_quantity {
            condition = condition.add(inventory_item::Column::Quantity.lte(max_quantity));
        }
        if let Some(search) = &self.search {
            condition = condition.add(
                Condition::any()
                    .add(contains_ignore_case(
                        inventory_item::Column::PartsName,
                        search,
                    ))
                    .add(contains_ignore_case(
                        inventory_item::Column::PartsNumber,
                        search,
                    )),
            );
        }
        if let Some(start_date) = self.start_date {
            condition = condition.add(inventory_item::Column::AcquiredDate.gte(start_date));
        }
        if let Some(end_date) = self.end_date {
            condition = condition.add(inventory_item::Column::AcquiredDate.lte(end_date));
        }
        condition
    }
}

/// Transaction listing predicates, AND-ed together.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub transaction_type: Option<String>,
    pub item_id: Option<Uuid>,
    pub search: Option<String>,
}

impl TransactionFilter {
    /// The date range applies only when both bounds are present; it covers
    /// the whole end day by using a half-open window up to the next
    /// midnight.
    fn performed_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = (self.start_date?, self.end_date?);
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let to = end
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();
        Some((from, to))
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some((from, to)) = self.performed_window() {
            condition = condition
                .add(inventory_transaction::Column::PerformedAt.gte(from))
                .add(inventory_transaction::Column::PerformedAt.lt(to));
        }
        // Unrecognized direction values are ignored rather than rejected
        if let Some(kind) = self
            .transaction_type
            .as_deref()
            .and_then(TransactionType::from_str)
        {
            condition =
                condition.add(inventory_transaction::Column::TransactionType.eq(kind.as_str()));
        }
        if let Some(item_id) = self.item_id {
            condition = condition.add(inventory_transaction::Column::ItemId.eq(item_id));
        }
        if let Some(search) = &self.search {
            condition = condition.add(
                Condition::any()
                    .add(contains_ignore_case(
                        inventory_transaction::Column::PartsName,
                        search,
                    ))
                    .add(contains_ignore_case(
                        inventory_transaction::Column::PartsNumber,
                        search,
                    )),
            );
        }
        condition
    }
}

/// Ledger service: the only write path for item quantities and the
/// transaction log. Every mutation couples the item write with its audit
/// entry inside one database transaction.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists items matching the filter, newest first, with the total match
    /// count for pagination.
    #[instrument(skip(self, filter))]
    pub async fn list_items(
        &self,
        filter: &ItemFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_item::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = InventoryItem::find()
            .filter(filter.condition())
            .order_by_desc(inventory_item::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: Uuid) -> Result<inventory_item::Model, ServiceError> {
        let db = &*self.db_pool;

        InventoryItem::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inventory item not found".to_string()))
    }

    /// Creates an item and, when the initial quantity is positive, its
    /// opening stock-in entry in the same database transaction.
    #[instrument(skip(self, request), fields(parts_number = %request.parts_number))]
    pub async fn create_item(
        &self,
        request: CreateItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;
        let component = parse_component(&request.component)?;
        if let Some(image) = request.image_data.as_deref() {
            validate_image_data(image)?;
        }

        let db = &*self.db_pool;

        // Friendlier duplicate report than the unique-index violation below
        let duplicate = InventoryItem::find()
            .filter(inventory_item::Column::PartsNumber.eq(request.parts_number.clone()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::ValidationError(
                "Duplicate field value entered: partsNumber".to_string(),
            ));
        }

        let created_by = request
            .created_by
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string());
        let now = Utc::now();

        let item = db
            .transaction::<_, inventory_item::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let item = inventory_item::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        parts_name: Set(request.parts_name.clone()),
                        parts_number: Set(request.parts_number.clone()),
                        component: Set(component.as_str().to_string()),
                        quantity: Set(request.quantity),
                        item_price: Set(request.item_price),
                        image_data: Set(request.image_data.clone()),
                        rack: Set(request.rack.clone()),
                        tax: Set(request.tax),
                        total_amount: Set(request.total_amount),
                        pic: Set(request.pic.clone()),
                        po_number: Set(request.po_number.clone()),
                        ctpl_number: Set(request.ctpl_number.clone()),
                        acquired_date: Set(request.acquired_date),
                        created_by: Set(created_by.clone()),
                        version: Set(1),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    let item = item.insert(txn).await.map_err(map_unique_violation)?;

                    // A zero-quantity opening entry would break the log's
                    // quantity >= 1 invariant, so it is skipped
                    if item.quantity > 0 {
                        append_entry(
                            txn,
                            &item,
                            TransactionType::In,
                            item.quantity,
                            0,
                            "Initial inventory creation".to_string(),
                            created_by.clone(),
                        )
                        .await?;
                    }

                    Ok(item)
                })
            })
            .await
            .map_err(map_txn_error)?;

        info!(item_id = %item.id, parts_number = %item.parts_number, "Inventory item created");

        if let Err(e) = self.event_sender.send(Event::ItemCreated(item.id)).await {
            warn!(error = %e, item_id = %item.id, "Failed to send item created event");
        }

        Ok(item)
    }

    /// Replaces the provided item fields. A quantity change is audited with
    /// a delta entry, deliberately without the stock-availability check:
    /// this is the administrative override path, distinct from
    /// `record_transaction`.
    #[instrument(skip(self, request), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;
        let component = match &request.component {
            Some(raw) => Some(parse_component(raw)?),
            None => None,
        };
        if let Some(image) = request.image_data.as_deref() {
            validate_image_data(image)?;
        }

        let db = &*self.db_pool;

        let mut attempt = 1;
        let (item, entry) = loop {
            let request = request.clone();
            let outcome = db
                .transaction::<_, (inventory_item::Model, Option<inventory_transaction::Model>), ServiceError>(
                    move |txn| {
                        Box::pin(async move {
                            let item = InventoryItem::find_by_id(item_id)
                                .one(txn)
                                .await?
                                .ok_or_else(|| {
                                    ServiceError::NotFound("Inventory item not found".to_string())
                                })?;

                            let previous_quantity = item.quantity;
                            let new_quantity = request.quantity.unwrap_or(previous_quantity);
                            let actor = request
                                .created_by
                                .clone()
                                .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

                            // A changed part number must not collide with
                            // another item
                            if let Some(parts_number) = &request.parts_number {
                                if *parts_number != item.parts_number {
                                    let duplicate = InventoryItem::find()
                                        .filter(
                                            inventory_item::Column::PartsNumber
                                                .eq(parts_number.clone()),
                                        )
                                        .one(txn)
                                        .await?;
                                    if duplicate.is_some() {
                                        return Err(ServiceError::ValidationError(
                                            "Duplicate field value entered: partsNumber"
                                                .to_string(),
                                        ));
                                    }
                                }
                            }

                            let new_version = bump_item_version(txn, item_id, item.version).await?;

                            let mut active: inventory_item::ActiveModel = item.into();
                            if let Some(parts_name) = request.parts_name {
                                active.parts_name = Set(parts_name);
                            }
                            if let Some(parts_number) = request.parts_number {
                                active.parts_number = Set(parts_number);
                            }
                            if let Some(component) = component {
                                active.component = Set(component.as_str().to_string());
                            }
                            if let Some(item_price) = request.item_price {
                                active.item_price = Set(item_price);
                            }
                            if let Some(image_data) = request.image_data {
                                active.image_data = Set(Some(image_data));
                            }
                            if let Some(rack) = request.rack {
                                active.rack = Set(rack);
                            }
                            if let Some(tax) = request.tax {
                                active.tax = Set(tax);
                            }
                            if let Some(total_amount) = request.total_amount {
                                active.total_amount = Set(total_amount);
                            }
                            if let Some(pic) = request.pic {
                                active.pic = Set(pic);
                            }
                            if let Some(po_number) = request.po_number {
                                active.po_number = Set(po_number);
                            }
                            if let Some(ctpl_number) = request.ctpl_number {
                                active.ctpl_number = Set(ctpl_number);
                            }
                            if let Some(acquired_date) = request.acquired_date {
                                active.acquired_date = Set(acquired_date);
                            }
                            if let Some(created_by) = request.created_by {
                                active.created_by = Set(created_by);
                            }
                            active.quantity = Set(new_quantity);
                            active.version = Set(new_version);
                            active.updated_at = Set(Utc::now());

                            let updated = active.update(txn).await?;

                            let entry = if new_quantity != previous_quantity {
                                let (transaction_type, delta) = if new_quantity > previous_quantity
                                {
                                    (TransactionType::In, new_quantity - previous_quantity)
                                } else {
                                    (TransactionType::Out, previous_quantity - new_quantity)
                                };
                                Some(
                                    append_entry(
                                        txn,
                                        &updated,
                                        transaction_type,
                                        delta,
                                        previous_quantity,
                                        "Updated via inventory management".to_string(),
                                        actor,
                                    )
                                    .await?,
                                )
                            } else {
                                None
                            };

                            Ok((updated, entry))
                        })
                    },
                )
                .await
                .map_err(map_txn_error);

            match outcome {
                Err(ServiceError::ConcurrentModification(id)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(item_id = %id, attempt, "Version guard missed, retrying item update");
                    attempt += 1;
                }
                other => break other?,
            }
        };

        info!(item_id = %item.id, quantity_changed = entry.is_some(), "Inventory item updated");

        if let Err(e) = self.event_sender.send(Event::ItemUpdated(item.id)).await {
            warn!(error = %e, item_id = %item.id, "Failed to send item updated event");
        }
        if let Some(entry) = &entry {
            self.publish_stock_recorded(entry).await;
        }

        Ok(item)
    }

    /// Removes an item. A positive final quantity is closed out with an
    /// `out` entry for the full amount in the same database transaction.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let mut attempt = 1;
        let entry = loop {
            let outcome = db
                .transaction::<_, Option<inventory_transaction::Model>, ServiceError>(move |txn| {
                    Box::pin(async move {
                        let item = InventoryItem::find_by_id(item_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound("Inventory item not found".to_string())
                            })?;

                        // Claim the row so the closing entry reflects the
                        // final committed quantity
                        bump_item_version(txn, item_id, item.version).await?;

                        let entry = if item.quantity > 0 {
                            Some(
                                append_entry(
                                    txn,
                                    &item,
                                    TransactionType::Out,
                                    item.quantity,
                                    item.quantity,
                                    "Item removed from inventory".to_string(),
                                    DEFAULT_ACTOR.to_string(),
                                )
                                .await?,
                            )
                        } else {
                            None
                        };

                        InventoryItem::delete_by_id(item_id).exec(txn).await?;

                        Ok(entry)
                    })
                })
                .await
                .map_err(map_txn_error);

            match outcome {
                Err(ServiceError::ConcurrentModification(id)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(item_id = %id, attempt, "Version guard missed, retrying item delete");
                    attempt += 1;
                }
                other => break other?,
            }
        };

        info!(item_id = %item_id, closed_out = entry.is_some(), "Inventory item deleted");

        if let Err(e) = self.event_sender.send(Event::ItemDeleted(item_id)).await {
            warn!(error = %e, item_id = %item_id, "Failed to send item deleted event");
        }
        if let Some(entry) = &entry {
            self.publish_stock_recorded(entry).await;
        }

        Ok(())
    }

    /// Applies a stock movement to an item and appends the audit entry, all
    /// inside one database transaction. An `out` movement larger than the
    /// on-hand quantity fails with `InsufficientStock` and changes nothing.
    #[instrument(skip(self, request))]
    pub async fn record_transaction(
        &self,
        request: RecordTransactionRequest,
    ) -> Result<RecordedTransaction, ServiceError> {
        let (item_id, kind, quantity) = match (
            request.item_id,
            request.transaction_type.as_deref(),
            request.quantity,
        ) {
            (Some(item_id), Some(kind), Some(quantity)) if quantity != 0 => {
                (item_id, kind, quantity)
            }
            _ => {
                return Err(ServiceError::InvalidInput(
                    "Please provide itemId, transactionType, and quantity".to_string(),
                ))
            }
        };

        let transaction_type = TransactionType::from_str(kind).ok_or_else(|| {
            ServiceError::InvalidInput(
                "Transaction type must be either \"in\" or \"out\"".to_string(),
            )
        })?;
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let notes = request
            .notes
            .clone()
            .unwrap_or_else(|| default_note(transaction_type).to_string());
        let performed_by = request
            .performed_by
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

        let db = &*self.db_pool;

        let mut attempt = 1;
        let (item, transaction) = loop {
            let notes = notes.clone();
            let performed_by = performed_by.clone();
            let outcome = db
                .transaction::<_, (inventory_item::Model, inventory_transaction::Model), ServiceError>(
                    move |txn| {
                        Box::pin(async move {
                            let item = InventoryItem::find_by_id(item_id)
                                .one(txn)
                                .await?
                                .ok_or_else(|| {
                                    ServiceError::NotFound("Inventory item not found".to_string())
                                })?;

                            let previous_quantity = item.quantity;
                            let new_quantity = match transaction_type {
                                TransactionType::In => previous_quantity + quantity,
                                TransactionType::Out => {
                                    if previous_quantity < quantity {
                                        return Err(ServiceError::InsufficientStock(format!(
                                            "Not enough stock. Current quantity: {}",
                                            previous_quantity
                                        )));
                                    }
                                    previous_quantity - quantity
                                }
                            };

                            let new_version = bump_item_version(txn, item_id, item.version).await?;

                            let mut active: inventory_item::ActiveModel = item.into();
                            active.quantity = Set(new_quantity);
                            active.version = Set(new_version);
                            active.updated_at = Set(Utc::now());
                            let updated = active.update(txn).await?;

                            let entry = append_entry(
                                txn,
                                &updated,
                                transaction_type,
                                quantity,
                                previous_quantity,
                                notes,
                                performed_by,
                            )
                            .await?;

                            Ok((updated, entry))
                        })
                    },
                )
                .await
                .map_err(map_txn_error);

            match outcome {
                Err(ServiceError::ConcurrentModification(id)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(item_id = %id, attempt, "Version guard missed, retrying stock transaction");
                    attempt += 1;
                }
                other => break other?,
            }
        };

        info!(
            item_id = %item.id,
            transaction_type = transaction_type.as_str(),
            quantity,
            previous_quantity = transaction.previous_quantity,
            new_quantity = transaction.new_quantity,
            "Stock transaction recorded"
        );

        self.publish_stock_recorded(&transaction).await;

        Ok(RecordedTransaction { item, transaction })
    }

    /// Lists transactions matching the filter, newest first, with the total
    /// match count for pagination.
    #[instrument(skip(self, filter))]
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_transaction::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = inventory_transaction::Entity::find()
            .filter(filter.condition())
            .order_by_desc(inventory_transaction::Column::PerformedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await?;
        let transactions = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((transactions, total))
    }

    async fn publish_stock_recorded(&self, entry: &inventory_transaction::Model) {
        let event = Event::StockRecorded {
            item_id: entry.item_id,
            transaction_type: entry.transaction_type.clone(),
            quantity: entry.quantity,
            previous_quantity: entry.previous_quantity,
            new_quantity: entry.new_quantity,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, item_id = %entry.item_id, "Failed to send stock recorded event");
        }
    }
}

/// Bumps the item's version counter under a `WHERE version = ?` guard.
/// Zero rows affected means another writer committed since `read_version`
/// was read; the caller rolls back and retries from a fresh read.
async fn bump_item_version<C: ConnectionTrait>(
    txn: &C,
    item_id: Uuid,
    read_version: i32,
) -> Result<i32, ServiceError> {
    let guard = InventoryItem::update_many()
        .col_expr(
            inventory_item::Column::Version,
            Expr::value(read_version + 1),
        )
        .filter(inventory_item::Column::Id.eq(item_id))
        .filter(inventory_item::Column::Version.eq(read_version))
        .exec(txn)
        .await?;

    if guard.rows_affected == 0 {
        return Err(ServiceError::ConcurrentModification(item_id));
    }

    Ok(read_version + 1)
}

/// Appends one entry to the transaction log inside the caller's unit of
/// work. Derives `new_quantity` from the direction so the entry can never
/// disagree with itself, and refuses deltas that would record a negative
/// balance.
async fn append_entry<C: ConnectionTrait>(
    txn: &C,
    item: &inventory_item::Model,
    transaction_type: TransactionType,
    quantity: i32,
    previous_quantity: i32,
    notes: String,
    performed_by: String,
) -> Result<inventory_transaction::Model, ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let new_quantity = match transaction_type {
        TransactionType::In => previous_quantity + quantity,
        TransactionType::Out => previous_quantity - quantity,
    };
    if new_quantity < 0 {
        return Err(ServiceError::InternalError(format!(
            "Ledger entry for item {} would record a negative balance",
            item.id
        )));
    }

    let entry = inventory_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item.id),
        parts_name: Set(item.parts_name.clone()),
        parts_number: Set(item.parts_number.clone()),
        transaction_type: Set(transaction_type.as_str().to_string()),
        quantity: Set(quantity),
        previous_quantity: Set(previous_quantity),
        new_quantity: Set(new_quantity),
        notes: Set(notes),
        performed_by: Set(performed_by),
        performed_at: Set(Utc::now()),
    };

    Ok(entry.insert(txn).await?)
}

fn default_note(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::In => "Stock added to inventory",
        TransactionType::Out => "Stock removed from inventory",
    }
}

/// Checks an inline item image. Payloads arrive from the client as
/// `data:<mime>;base64,<data>` URIs, so both the wrapper and the encoded
/// bytes are checked before anything is stored.
fn validate_image_data(image_data: &str) -> Result<(), ServiceError> {
    let Some((mime_type, payload)) = image_data
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    else {
        return Err(invalid_image());
    };
    if payload.is_empty() {
        return Err(invalid_image());
    }

    if !IMAGE_ALLOWED_TYPES.contains(&mime_type) {
        return Err(ServiceError::ValidationError(format!(
            "Unsupported image format. Allowed types: {}",
            IMAGE_ALLOWED_TYPES.join(", ")
        )));
    }

    let decoded = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| invalid_image())?;
    if decoded.len() > IMAGE_MAX_BYTES {
        return Err(ServiceError::ValidationError(format!(
            "Image is too large. Maximum size: {}MB",
            IMAGE_MAX_BYTES / (1024 * 1024)
        )));
    }

    Ok(())
}

fn invalid_image() -> ServiceError {
    ServiceError::ValidationError("Invalid image format".to_string())
}

fn parse_component(raw: &str) -> Result<Component, ServiceError> {
    Component::from_str(raw).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "Invalid component \"{}\". Must be one of: Engine, Hydraulic, Electrical, Mechanical, Body",
            raw
        ))
    })
}

fn contains_ignore_case<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

fn validate_price(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = validator::ValidationError::new("min");
        err.message = Some("Price cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

fn map_unique_violation(err: sea_orm::DbErr) -> ServiceError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => ServiceError::ValidationError(
            "Duplicate field value entered: partsNumber".to_string(),
        ),
        _ => ServiceError::DatabaseError(err),
    }
}

fn map_txn_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_notes_follow_direction() {
        assert_eq!(default_note(TransactionType::In), "Stock added to inventory");
        assert_eq!(
            default_note(TransactionType::Out),
            "Stock removed from inventory"
        );
    }

    #[test]
    fn component_parsing_rejects_unknown_values() {
        assert!(parse_component("Engine").is_ok());
        assert!(parse_component("Body").is_ok());

        let err = parse_component("Chassis").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Chassis"));
    }

    #[test]
    fn transaction_window_requires_both_bounds() {
        let only_start = TransactionFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..Default::default()
        };
        assert!(only_start.performed_window().is_none());

        let only_end = TransactionFilter {
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12),
            ..Default::default()
        };
        assert!(only_end.performed_window().is_none());

        let both = TransactionFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12),
            ..Default::default()
        };
        let (from, to) = both.performed_window().unwrap();
        assert_eq!(from.to_rfc3339(), "2025-03-10T00:00:00+00:00");
        // Half-open upper bound: the whole of March 12 is included
        assert_eq!(to.to_rfc3339(), "2025-03-13T00:00:00+00:00");
    }

    #[test]
    fn price_validation_rejects_negatives() {
        assert!(validate_price(&Decimal::new(1050, 2)).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_ok());
        assert!(validate_price(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn image_payloads_must_be_data_uris() {
        let tiny_gif =
            "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";
        assert!(validate_image_data(tiny_gif).is_ok());

        assert!(validate_image_data("not-an-image").is_err());
        assert!(validate_image_data("data:image/png;base64,").is_err());
        assert!(validate_image_data("data:image/png;base64,@@not base64@@").is_err());

        let err = validate_image_data("data:image/webp;base64,AAAA").unwrap_err();
        assert!(err.to_string().contains("Unsupported image format"));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
