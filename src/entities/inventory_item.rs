use async_trait::async_trait;
use chrono::{NaiveDate, DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Component categories a part can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Engine,
    Hydraulic,
    Electrical,
    Mechanical,
    Body,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Engine,
        Component::Hydraulic,
        Component::Electrical,
        Component::Mechanical,
        Component::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Engine => "Engine",
            Component::Hydraulic => "Hydraulic",
            Component::Electrical => "Electrical",
            Component::Mechanical => "Mechanical",
            Component::Body => "Body",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Engine" => Some(Component::Engine),
            "Hydraulic" => Some(Component::Hydraulic),
            "Electrical" => Some(Component::Electrical),
            "Mechanical" => Some(Component::Mechanical),
            "Body" => Some(Component::Body),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_items")]
#[serde(rename_all = "camelCase")]
#[schema(as = InventoryItem)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parts_name: String,
    pub parts_number: String,
    pub component: String, // Storing as string in DB, but will convert to/from enum
    pub quantity: i32,
    pub item_price: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_data: Option<String>,
    pub rack: String,
    pub tax: Decimal,
    pub total_amount: Decimal,
    pub pic: String,
    pub po_number: String,
    pub ctpl_number: String,
    pub acquired_date: NaiveDate,
    pub created_by: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
            if let ActiveValue::NotSet = active_model.version {
                active_model.version = Set(1);
            }
        }
        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_round_trips_through_strings() {
        for component in Component::ALL {
            assert_eq!(Component::from_str(component.as_str()), Some(component));
        }
        assert_eq!(Component::from_str("Transmission"), None);
        assert_eq!(Component::from_str("engine"), None);
    }
}
