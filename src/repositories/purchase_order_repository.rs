use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use super::{BaseRepository, CrudRepository, Repository};
use crate::errors::ServiceError;
use crate::models::{purchase_order, vendor, PurchaseOrderStatus};

/// Purchase order joined with its vendor row (if the vendor still exists).
pub type PurchaseOrderWithVendor = (purchase_order::Model, Option<vendor::Model>);

#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub po_number: String,
    pub vendor_id: i32,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub items: String,
    pub quantity: i32,
    pub status: PurchaseOrderStatus,
    pub quality_rating: Option<f64>,
    pub issue_date: DateTime<Utc>,
    pub acknowledgment_date: Option<DateTime<Utc>>,
}

/// Partial update. For the nullable columns the outer `Option` says whether the
/// field was supplied and the inner one carries the new value or an explicit clear.
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderPatch {
    pub po_number: Option<String>,
    pub vendor_id: Option<i32>,
    pub order_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<Option<DateTime<Utc>>>,
    pub items: Option<String>,
    pub quantity: Option<i32>,
    pub status: Option<PurchaseOrderStatus>,
    pub quality_rating: Option<Option<f64>>,
    pub issue_date: Option<DateTime<Utc>>,
    pub acknowledgment_date: Option<Option<DateTime<Utc>>>,
}

impl PurchaseOrderPatch {
    fn apply(self, active: &mut purchase_order::ActiveModel) {
        if let Some(v) = self.po_number {
            active.po_number = Set(v);
        }
        if let Some(v) = self.vendor_id {
            active.vendor_id = Set(v);
        }
        if let Some(v) = self.order_date {
            active.order_date = Set(v);
        }
        if let Some(v) = self.delivery_date {
            active.delivery_date = Set(v);
        }
        if let Some(v) = self.actual_delivery_date {
            active.actual_delivery_date = Set(v);
        }
        if let Some(v) = self.items {
            active.items = Set(v);
        }
        if let Some(v) = self.quantity {
            active.quantity = Set(v);
        }
        if let Some(v) = self.status {
            active.status = Set(v);
        }
        if let Some(v) = self.quality_rating {
            active.quality_rating = Set(v);
        }
        if let Some(v) = self.issue_date {
            active.issue_date = Set(v);
        }
        if let Some(v) = self.acknowledgment_date {
            active.acknowledgment_date = Set(v);
        }
    }
}

/// Repository for purchase order operations
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    base: BaseRepository,
}

impl PurchaseOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn not_found(id: i32) -> ServiceError {
        ServiceError::NotFound(format!("Purchase order with ID {} not found", id))
    }

    pub async fn find_all_with_vendor(&self) -> Result<Vec<PurchaseOrderWithVendor>, ServiceError> {
        purchase_order::Entity::find()
            .find_also_related(vendor::Entity)
            .order_by_asc(purchase_order::Column::Id)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn find_by_id_with_vendor(
        &self,
        id: i32,
    ) -> Result<Option<PurchaseOrderWithVendor>, ServiceError> {
        purchase_order::Entity::find_by_id(id)
            .find_also_related(vendor::Entity)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Completed orders of one vendor, the input set of every performance metric.
    pub async fn find_completed_by_vendor(
        &self,
        vendor_id: i32,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find()
            .filter(purchase_order::Column::VendorId.eq(vendor_id))
            .filter(purchase_order::Column::Status.eq(PurchaseOrderStatus::Completed))
            .order_by_asc(purchase_order::Column::Id)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[async_trait]
impl CrudRepository for PurchaseOrderRepository {
    type Model = purchase_order::Model;
    type NewRecord = NewPurchaseOrder;
    type Patch = PurchaseOrderPatch;

    async fn find_by_id(&self, id: i32) -> Result<Option<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn find_all(&self) -> Result<Vec<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find()
            .order_by_asc(purchase_order::Column::Id)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn create(&self, record: NewPurchaseOrder) -> Result<purchase_order::Model, ServiceError> {
        let active = purchase_order::ActiveModel {
            po_number: Set(record.po_number),
            vendor_id: Set(record.vendor_id),
            order_date: Set(record.order_date),
            delivery_date: Set(record.delivery_date),
            actual_delivery_date: Set(record.actual_delivery_date),
            items: Set(record.items),
            quantity: Set(record.quantity),
            status: Set(record.status),
            quality_rating: Set(record.quality_rating),
            issue_date: Set(record.issue_date),
            acknowledgment_date: Set(record.acknowledgment_date),
            ..Default::default()
        };

        active
            .insert(self.get_db())
            .await
            .map_err(|e| ServiceError::from_write(e, "Purchase order with this po_number"))
    }

    async fn update(
        &self,
        id: i32,
        patch: PurchaseOrderPatch,
    ) -> Result<purchase_order::Model, ServiceError> {
        let existing = self.find_by_id(id).await?.ok_or_else(|| Self::not_found(id))?;

        let mut active: purchase_order::ActiveModel = existing.clone().into();
        patch.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }

        active
            .update(self.get_db())
            .await
            .map_err(|e| ServiceError::from_write(e, "Purchase order with this po_number"))
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = purchase_order::Entity::delete_by_id(id)
            .exec(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

impl Repository for PurchaseOrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
