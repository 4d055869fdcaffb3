use metrics::counter;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::vendor;
use crate::repositories::{
    CrudRepository, NewVendor, PurchaseOrderRepository, VendorPatch, VendorRepository,
};
use crate::services::performance::{self, PerformanceMetrics};

/// Service for managing vendors and their performance snapshot
#[derive(Clone)]
pub struct VendorService {
    vendors: VendorRepository,
    purchase_orders: PurchaseOrderRepository,
}

impl VendorService {
    /// Creates a new vendor service instance
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            vendors: VendorRepository::new(db_pool.clone()),
            purchase_orders: PurchaseOrderRepository::new(db_pool),
        }
    }

    /// Lists all vendors
    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<vendor::Model>, ServiceError> {
        self.vendors.find_all().await
    }

    /// Gets a vendor by ID
    #[instrument(skip(self))]
    pub async fn get_vendor(&self, vendor_id: i32) -> Result<vendor::Model, ServiceError> {
        self.vendors.find_by_id(vendor_id).await?.ok_or_else(|| {
            warn!(vendor_id, "Vendor not found");
            ServiceError::NotFound(format!("Vendor with ID {} not found", vendor_id))
        })
    }

    /// Creates a new vendor with a zeroed performance snapshot
    #[instrument(skip(self))]
    pub async fn create_vendor(&self, new_vendor: NewVendor) -> Result<vendor::Model, ServiceError> {
        let created = self.vendors.create(new_vendor).await?;
        info!(vendor_id = created.id, vendor_code = %created.vendor_code, "Vendor created");
        Ok(created)
    }

    /// Applies a partial update to a vendor profile
    #[instrument(skip(self))]
    pub async fn update_vendor(
        &self,
        vendor_id: i32,
        patch: VendorPatch,
    ) -> Result<vendor::Model, ServiceError> {
        let updated = self.vendors.update(vendor_id, patch).await?;
        info!(vendor_id, "Vendor updated");
        Ok(updated)
    }

    /// Deletes a vendor together with its purchase orders
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, vendor_id: i32) -> Result<(), ServiceError> {
        self.vendors.delete(vendor_id).await?;
        info!(vendor_id, "Vendor deleted");
        Ok(())
    }

    /// Recomputes the performance metrics from the vendor's completed orders,
    /// stores them on the vendor and returns them.
    #[instrument(skip(self))]
    pub async fn recompute_performance(
        &self,
        vendor_id: i32,
    ) -> Result<PerformanceMetrics, ServiceError> {
        self.get_vendor(vendor_id).await?;

        let completed = self.purchase_orders.find_completed_by_vendor(vendor_id).await?;
        let metrics = performance::compute(&completed);

        self.vendors.update_performance(vendor_id, &metrics).await?;
        counter!("vendor_performance.recomputations", 1);

        info!(
            vendor_id,
            completed_orders = completed.len(),
            on_time_rate = metrics.on_time_delivery_rate,
            quality_avg = metrics.quality_rating_avg,
            response_minutes = metrics.average_response_time,
            fulfillment_rate = metrics.fulfillment_rate,
            "Vendor performance recomputed"
        );

        Ok(metrics)
    }
}
