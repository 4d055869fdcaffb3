use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Canceled")]
    Canceled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseOrderStatus::Pending => write!(f, "Pending"),
            PurchaseOrderStatus::Completed => write!(f, "Completed"),
            PurchaseOrderStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub po_number: String,
    pub vendor_id: i32,
    pub order_date: DateTimeUtc,
    /// Promised delivery date.
    pub delivery_date: DateTimeUtc,
    pub actual_delivery_date: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text")]
    pub items: String,
    pub quantity: i32,
    pub status: PurchaseOrderStatus,
    pub quality_rating: Option<f64>,
    pub issue_date: DateTimeUtc,
    /// `None` until the vendor acknowledges the order.
    pub acknowledgment_date: Option<DateTimeUtc>,
}

impl Model {
    pub fn is_completed(&self) -> bool {
        self.status == PurchaseOrderStatus::Completed
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgment_date.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id",
        on_delete = "Cascade"
    )]
    Vendor,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
