use crate::errors::ServiceError;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod purchase_order_repository;
pub mod vendor_repository;

pub use purchase_order_repository::{NewPurchaseOrder, PurchaseOrderPatch, PurchaseOrderRepository};
pub use vendor_repository::{NewVendor, VendorPatch, VendorRepository};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Get-by-id, list, create, partial update and delete over one record type.
#[async_trait]
pub trait CrudRepository: Send + Sync {
    type Model: Send;
    type NewRecord: Send + 'static;
    type Patch: Send + 'static;

    async fn find_by_id(&self, id: i32) -> Result<Option<Self::Model>, ServiceError>;

    async fn find_all(&self) -> Result<Vec<Self::Model>, ServiceError>;

    async fn create(&self, record: Self::NewRecord) -> Result<Self::Model, ServiceError>;

    /// Applies `patch` and returns the stored record; `NotFound` if `id` does not exist.
    async fn update(&self, id: i32, patch: Self::Patch) -> Result<Self::Model, ServiceError>;

    /// `NotFound` if `id` does not exist.
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;
}
