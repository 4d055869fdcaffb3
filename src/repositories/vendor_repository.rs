use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use super::{BaseRepository, CrudRepository, Repository};
use crate::errors::ServiceError;
use crate::models::{purchase_order, vendor};
use crate::services::performance::PerformanceMetrics;

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub name: String,
    pub contact_details: String,
    pub address: String,
    pub vendor_code: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub contact_details: Option<String>,
    pub address: Option<String>,
    pub vendor_code: Option<String>,
}

impl VendorPatch {
    fn apply(self, active: &mut vendor::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(contact_details) = self.contact_details {
            active.contact_details = Set(contact_details);
        }
        if let Some(address) = self.address {
            active.address = Set(address);
        }
        if let Some(vendor_code) = self.vendor_code {
            active.vendor_code = Set(vendor_code);
        }
    }
}

/// Repository for vendor operations
#[derive(Debug, Clone)]
pub struct VendorRepository {
    base: BaseRepository,
}

impl VendorRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn require(&self, id: i32) -> Result<vendor::Model, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor with ID {} not found", id)))
    }

    /// Overwrites the cached performance columns.
    pub async fn update_performance(
        &self,
        id: i32,
        metrics: &PerformanceMetrics,
    ) -> Result<vendor::Model, ServiceError> {
        let existing = self.require(id).await?;

        let mut active: vendor::ActiveModel = existing.into();
        active.on_time_delivery_rate = Set(metrics.on_time_delivery_rate);
        active.quality_rating_avg = Set(metrics.quality_rating_avg);
        active.average_response_time = Set(metrics.average_response_time);
        active.fulfillment_rate = Set(metrics.fulfillment_rate);

        active
            .update(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[async_trait]
impl CrudRepository for VendorRepository {
    type Model = vendor::Model;
    type NewRecord = NewVendor;
    type Patch = VendorPatch;

    async fn find_by_id(&self, id: i32) -> Result<Option<vendor::Model>, ServiceError> {
        vendor::Entity::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn find_all(&self) -> Result<Vec<vendor::Model>, ServiceError> {
        vendor::Entity::find()
            .order_by_asc(vendor::Column::Id)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn create(&self, record: NewVendor) -> Result<vendor::Model, ServiceError> {
        let active = vendor::ActiveModel {
            name: Set(record.name),
            contact_details: Set(record.contact_details),
            address: Set(record.address),
            vendor_code: Set(record.vendor_code),
            on_time_delivery_rate: Set(0.0),
            quality_rating_avg: Set(0.0),
            average_response_time: Set(0.0),
            fulfillment_rate: Set(0.0),
            ..Default::default()
        };

        active
            .insert(self.get_db())
            .await
            .map_err(|e| ServiceError::from_write(e, "Vendor with this vendor_code"))
    }

    async fn update(&self, id: i32, patch: VendorPatch) -> Result<vendor::Model, ServiceError> {
        let existing = self.require(id).await?;

        let mut active: vendor::ActiveModel = existing.clone().into();
        patch.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }

        active
            .update(self.get_db())
            .await
            .map_err(|e| ServiceError::from_write(e, "Vendor with this vendor_code"))
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.require(id).await?;

        // Orders go with their vendor, whatever the backend's FK enforcement.
        let removed_orders = self
            .get_db()
            .transaction::<_, u64, DbErr>(move |txn| {
                Box::pin(async move {
                    let orders = purchase_order::Entity::delete_many()
                        .filter(purchase_order::Column::VendorId.eq(id))
                        .exec(txn)
                        .await?;
                    vendor::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(orders.rows_affected)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) | TransactionError::Transaction(e) => {
                    ServiceError::DatabaseError(e)
                }
            })?;

        debug!(vendor_id = id, removed_orders, "Vendor removed");
        Ok(())
    }
}

impl Repository for VendorRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
