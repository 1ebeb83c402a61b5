use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::inventory_item,
    entities::inventory_transaction::{self, TransactionType},
    errors::ServiceError,
};

/// Grouping granularity for the stock movement series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Weekly,
    Monthly,
    Yearly,
}

impl Timeframe {
    /// Maps a query string to a timeframe. Anything unrecognized falls back
    /// to monthly.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("weekly") => Timeframe::Weekly,
            Some("yearly") => Timeframe::Yearly,
            _ => Timeframe::Monthly,
        }
    }
}

/// Aggregate counters for one day of ledger activity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub stock_in_count: i64,
    pub stock_out_count: i64,
    pub total_transactions: i64,
    pub stock_in_quantity: i64,
    pub stock_out_quantity: i64,
}

/// One calendar day of ledger activity, newest entry first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub transactions: Vec<inventory_transaction::Model>,
    pub summary: DailySummary,
}

/// Chart-ready movement series over a trailing window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementReport {
    pub timeframe: Timeframe,
    pub labels: Vec<String>,
    pub raw_labels: Vec<String>,
    pub stock_in_data: Vec<i64>,
    pub stock_out_data: Vec<i64>,
}

/// Per-component slice of the stock on hand.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBreakdown {
    pub component: String,
    pub count: i64,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

/// Item summary used in the low stock and out of stock listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelEntry {
    pub id: Uuid,
    pub parts_name: String,
    pub parts_number: String,
    pub component: String,
    pub quantity: i32,
}

/// Warehouse-wide statistics for the dashboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: i64,
    pub total_quantity: i64,
    pub component_breakdown: Vec<ComponentBreakdown>,
    pub low_stock_items: Vec<StockLevelEntry>,
    pub out_of_stock_items: Vec<StockLevelEntry>,
    pub inventory_value: Decimal,
    pub recent_transactions: Vec<inventory_transaction::Model>,
}

/// Read-only aggregations over the item store and the transaction log.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    low_stock_threshold: i32,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>, low_stock_threshold: i32) -> Self {
        Self {
            db_pool,
            low_stock_threshold,
        }
    }

    /// Transactions for one calendar day (UTC) plus summary counters.
    #[instrument(skip(self))]
    pub async fn daily_summary(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<DailyReport, ServiceError> {
        let db = &*self.db_pool;
        let day = date.unwrap_or_else(|| Utc::now().date_naive());
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = day
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let transactions = inventory_transaction::Entity::find()
            .filter(inventory_transaction::Column::PerformedAt.gte(start))
            .filter(inventory_transaction::Column::PerformedAt.lt(end))
            .order_by_desc(inventory_transaction::Column::PerformedAt)
            .all(db)
            .await?;

        let mut summary = DailySummary {
            stock_in_count: 0,
            stock_out_count: 0,
            total_transactions: transactions.len() as i64,
            stock_in_quantity: 0,
            stock_out_quantity: 0,
        };
        for entry in &transactions {
            match TransactionType::from_str(&entry.transaction_type) {
                Some(TransactionType::In) => {
                    summary.stock_in_count += 1;
                    summary.stock_in_quantity += i64::from(entry.quantity);
                }
                Some(TransactionType::Out) => {
                    summary.stock_out_count += 1;
                    summary.stock_out_quantity += i64::from(entry.quantity);
                }
                None => {}
            }
        }

        Ok(DailyReport {
            date: day,
            transactions,
            summary,
        })
    }

    /// Quantity moved per period over a trailing window, densified so every
    /// period of the window appears even when nothing moved in it.
    #[instrument(skip(self))]
    pub async fn stock_movement(
        &self,
        timeframe: Timeframe,
    ) -> Result<StockMovementReport, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let entries = inventory_transaction::Entity::find()
            .filter(inventory_transaction::Column::PerformedAt.gte(window_start(timeframe, now)))
            .filter(inventory_transaction::Column::PerformedAt.lte(now))
            .all(db)
            .await?;

        Ok(build_movement_series(timeframe, now, &entries))
    }

    /// Stock levels, valuation and recent activity for the dashboard.
    #[instrument(skip(self))]
    pub async fn inventory_stats(&self) -> Result<InventoryStats, ServiceError> {
        let db = &*self.db_pool;

        let items = inventory_item::Entity::find().all(db).await?;

        let mut total_quantity: i64 = 0;
        let mut inventory_value = Decimal::ZERO;
        let mut by_component: HashMap<String, ComponentBreakdown> = HashMap::new();
        for item in &items {
            let value = item.item_price * Decimal::from(item.quantity);
            total_quantity += i64::from(item.quantity);
            inventory_value += value;

            let slice = by_component
                .entry(item.component.clone())
                .or_insert_with(|| ComponentBreakdown {
                    component: item.component.clone(),
                    count: 0,
                    total_quantity: 0,
                    total_value: Decimal::ZERO,
                });
            slice.count += 1;
            slice.total_quantity += i64::from(item.quantity);
            slice.total_value += value;
        }
        let mut component_breakdown: Vec<ComponentBreakdown> =
            by_component.into_values().collect();
        component_breakdown.sort_by(|a, b| b.total_value.cmp(&a.total_value));

        let low_stock_items = inventory_item::Entity::find()
            .filter(inventory_item::Column::Quantity.lt(self.low_stock_threshold))
            .order_by_asc(inventory_item::Column::Quantity)
            .all(db)
            .await?
            .into_iter()
            .map(stock_level_entry)
            .collect();

        let out_of_stock_items = inventory_item::Entity::find()
            .filter(inventory_item::Column::Quantity.eq(0))
            .all(db)
            .await?
            .into_iter()
            .map(stock_level_entry)
            .collect();

        let recent_transactions = inventory_transaction::Entity::find()
            .order_by_desc(inventory_transaction::Column::PerformedAt)
            .limit(5)
            .all(db)
            .await?;

        Ok(InventoryStats {
            total_items: items.len() as i64,
            total_quantity,
            component_breakdown,
            low_stock_items,
            out_of_stock_items,
            inventory_value,
            recent_transactions,
        })
    }
}

fn stock_level_entry(item: inventory_item::Model) -> StockLevelEntry {
    StockLevelEntry {
        id: item.id,
        parts_name: item.parts_name,
        parts_number: item.parts_number,
        component: item.component,
        quantity: item.quantity,
    }
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Year and zero-based month index reached by stepping `back` months from
/// `year`/`month`.
fn shift_month(year: i32, month: u32, back: i32) -> (i32, usize) {
    let total = year * 12 + month as i32 - 1 - back;
    (total.div_euclid(12), total.rem_euclid(12) as usize)
}

/// Start of the trailing window the series covers.
fn window_start(timeframe: Timeframe, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = match timeframe {
        Timeframe::Weekly => today - Duration::days(6),
        Timeframe::Monthly => {
            let (year, month_index) = shift_month(today.year(), today.month(), 11);
            NaiveDate::from_ymd_opt(year, month_index as u32 + 1, 1).unwrap_or(today)
        }
        Timeframe::Yearly => NaiveDate::from_ymd_opt(today.year() - 6, 1, 1).unwrap_or(today),
    };
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Bucket key an entry falls into. Must match the raw labels produced by
/// `bucket_sequence`.
fn bucket_key(timeframe: Timeframe, at: DateTime<Utc>) -> String {
    match timeframe {
        Timeframe::Weekly => at.format("%Y-%m-%d").to_string(),
        Timeframe::Monthly => format!("{:04}-{:02}", at.year(), at.month()),
        Timeframe::Yearly => at.year().to_string(),
    }
}

/// The window's full label sequence, oldest first, as (raw key, display
/// label) pairs.
fn bucket_sequence(timeframe: Timeframe, now: DateTime<Utc>) -> Vec<(String, String)> {
    let today = now.date_naive();
    match timeframe {
        Timeframe::Weekly => (0..7)
            .rev()
            .map(|back| {
                let day = today - Duration::days(back);
                (
                    day.format("%Y-%m-%d").to_string(),
                    day.format("%a").to_string(),
                )
            })
            .collect(),
        Timeframe::Monthly => (0..12)
            .rev()
            .map(|back| {
                let (year, month_index) = shift_month(today.year(), today.month(), back);
                (
                    format!("{:04}-{:02}", year, month_index + 1),
                    MONTH_LABELS[month_index].to_string(),
                )
            })
            .collect(),
        Timeframe::Yearly => (today.year() - 6..=today.year())
            .map(|year| (year.to_string(), year.to_string()))
            .collect(),
    }
}

/// Sums entry quantities into per-period buckets and lays them over the full
/// sequence, zero-filling periods with no movement.
fn build_movement_series(
    timeframe: Timeframe,
    now: DateTime<Utc>,
    entries: &[inventory_transaction::Model],
) -> StockMovementReport {
    let mut stock_in: HashMap<String, i64> = HashMap::new();
    let mut stock_out: HashMap<String, i64> = HashMap::new();
    for entry in entries {
        let bucket = bucket_key(timeframe, entry.performed_at);
        match TransactionType::from_str(&entry.transaction_type) {
            Some(TransactionType::In) => {
                *stock_in.entry(bucket).or_insert(0) += i64::from(entry.quantity)
            }
            Some(TransactionType::Out) => {
                *stock_out.entry(bucket).or_insert(0) += i64::from(entry.quantity)
            }
            None => {}
        }
    }

    let mut report = StockMovementReport {
        timeframe,
        labels: Vec::new(),
        raw_labels: Vec::new(),
        stock_in_data: Vec::new(),
        stock_out_data: Vec::new(),
    };
    for (raw, label) in bucket_sequence(timeframe, now) {
        report
            .stock_in_data
            .push(stock_in.get(&raw).copied().unwrap_or(0));
        report
            .stock_out_data
            .push(stock_out.get(&raw).copied().unwrap_or(0));
        report.raw_labels.push(raw);
        report.labels.push(label);
    }
    report
}
