use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::purchase_order;
use crate::repositories::purchase_order_repository::PurchaseOrderWithVendor;
use crate::repositories::{
    CrudRepository, NewPurchaseOrder, PurchaseOrderPatch, PurchaseOrderRepository,
    VendorRepository,
};

/// Highest quality rating a vendor can receive on an order.
pub const MAX_QUALITY_RATING: f64 = 5.0;

/// Service for managing purchase orders
#[derive(Clone)]
pub struct PurchaseOrderService {
    purchase_orders: PurchaseOrderRepository,
    vendors: VendorRepository,
}

impl PurchaseOrderService {
    /// Creates a new purchase order service instance
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            purchase_orders: PurchaseOrderRepository::new(db_pool.clone()),
            vendors: VendorRepository::new(db_pool),
        }
    }

    async fn ensure_vendor_exists(&self, vendor_id: i32) -> Result<(), ServiceError> {
        match self.vendors.find_by_id(vendor_id).await? {
            Some(_) => Ok(()),
            None => {
                warn!(vendor_id, "Purchase order references unknown vendor");
                Err(ServiceError::NotFound(format!(
                    "Vendor with ID {} not found",
                    vendor_id
                )))
            }
        }
    }

    /// Lists all purchase orders with their vendor
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrderWithVendor>, ServiceError> {
        self.purchase_orders.find_all_with_vendor().await
    }

    /// Gets a purchase order and its vendor by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        purchase_order_id: i32,
    ) -> Result<PurchaseOrderWithVendor, ServiceError> {
        self.purchase_orders
            .find_by_id_with_vendor(purchase_order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Purchase order with ID {} not found",
                    purchase_order_id
                ))
            })
    }

    /// Creates a purchase order for an existing vendor
    #[instrument(skip(self))]
    pub async fn create_purchase_order(
        &self,
        new_order: NewPurchaseOrder,
    ) -> Result<purchase_order::Model, ServiceError> {
        validate_quality_rating(new_order.quality_rating)?;
        validate_quantity(new_order.quantity)?;
        self.ensure_vendor_exists(new_order.vendor_id).await?;

        let created = self.purchase_orders.create(new_order).await?;
        info!(
            purchase_order_id = created.id,
            po_number = %created.po_number,
            vendor_id = created.vendor_id,
            "Purchase order created"
        );
        Ok(created)
    }

    /// Applies a partial update; a new `vendor_id` must name an existing vendor
    #[instrument(skip(self))]
    pub async fn update_purchase_order(
        &self,
        purchase_order_id: i32,
        patch: PurchaseOrderPatch,
    ) -> Result<purchase_order::Model, ServiceError> {
        if let Some(rating) = patch.quality_rating {
            validate_quality_rating(rating)?;
        }
        if let Some(quantity) = patch.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(vendor_id) = patch.vendor_id {
            self.ensure_vendor_exists(vendor_id).await?;
        }

        let updated = self.purchase_orders.update(purchase_order_id, patch).await?;
        info!(purchase_order_id, status = %updated.status, "Purchase order updated");
        Ok(updated)
    }

    /// Deletes a purchase order
    #[instrument(skip(self))]
    pub async fn delete_purchase_order(&self, purchase_order_id: i32) -> Result<(), ServiceError> {
        self.purchase_orders.delete(purchase_order_id).await?;
        info!(purchase_order_id, "Purchase order deleted");
        Ok(())
    }
}

fn validate_quality_rating(rating: Option<f64>) -> Result<(), ServiceError> {
    match rating {
        Some(r) if !(0.0..=MAX_QUALITY_RATING).contains(&r) => Err(ServiceError::ValidationError(
            format!("quality_rating must be between 0 and {}", MAX_QUALITY_RATING),
        )),
        _ => Ok(()),
    }
}

fn validate_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 0 {
        return Err(ServiceError::ValidationError(
            "quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}
