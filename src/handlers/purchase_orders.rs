use super::common::{
    deserialize_datetime, deserialize_optional_datetime, deserialize_some,
    deserialize_some_datetime, format_date, map_service_error, message_response,
    success_response, validate_input, ApiJson, ApiPath,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::{purchase_order, vendor, PurchaseOrderStatus},
    repositories::{NewPurchaseOrder, PurchaseOrderPatch},
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

// Request and response DTOs

/// Dates accept an RFC 3339 timestamp or a plain `YYYY-MM-DD` (midnight UTC)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub po_number: String,
    pub vendor_id: i32,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub order_date: DateTime<Utc>,
    /// Promised delivery date
    #[serde(deserialize_with = "deserialize_datetime")]
    pub delivery_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub actual_delivery_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub items: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub quality_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub issue_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub acknowledgment_date: Option<DateTime<Utc>>,
}

impl From<CreatePurchaseOrderRequest> for NewPurchaseOrder {
    fn from(req: CreatePurchaseOrderRequest) -> Self {
        Self {
            po_number: req.po_number,
            vendor_id: req.vendor_id,
            order_date: req.order_date,
            delivery_date: req.delivery_date,
            actual_delivery_date: req.actual_delivery_date,
            items: req.items,
            quantity: req.quantity,
            status: req.status,
            quality_rating: req.quality_rating,
            issue_date: req.issue_date,
            acknowledgment_date: req.acknowledgment_date,
        }
    }
}

/// Omitted fields are left unchanged; `null` clears a nullable field
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub po_number: Option<String>,
    pub vendor_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_some_datetime")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub actual_delivery_date: Option<Option<DateTime<Utc>>>,
    #[validate(length(min = 1))]
    pub items: Option<String>,
    pub quantity: Option<i32>,
    pub status: Option<PurchaseOrderStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<f64>)]
    pub quality_rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_some_datetime")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub acknowledgment_date: Option<Option<DateTime<Utc>>>,
}

impl From<UpdatePurchaseOrderRequest> for PurchaseOrderPatch {
    fn from(req: UpdatePurchaseOrderRequest) -> Self {
        Self {
            po_number: req.po_number,
            vendor_id: req.vendor_id,
            order_date: req.order_date,
            delivery_date: req.delivery_date,
            actual_delivery_date: req.actual_delivery_date,
            items: req.items,
            quantity: req.quantity,
            status: req.status,
            quality_rating: req.quality_rating,
            issue_date: req.issue_date,
            acknowledgment_date: req.acknowledgment_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderResponse {
    pub po_number: String,
    /// Vendor name
    pub vendor: String,
    #[schema(example = "2024-03-01")]
    pub order_date: String,
    #[schema(example = "2024-03-08")]
    pub delivery_date: String,
    pub status: PurchaseOrderStatus,
}

impl From<(purchase_order::Model, Option<vendor::Model>)> for PurchaseOrderResponse {
    fn from((order, vendor): (purchase_order::Model, Option<vendor::Model>)) -> Self {
        Self {
            order_date: format_date(&order.order_date),
            delivery_date: format_date(&order.delivery_date),
            po_number: order.po_number,
            vendor: vendor.map(|v| v.name).unwrap_or_default(),
            status: order.status,
        }
    }
}

// Handler functions

/// Create a purchase order
#[utoipa::path(
    post,
    path = "/purchase_orders/create/",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order created", body = crate::handlers::common::MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "po_number already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase_orders"
)]
pub async fn create_purchase_order(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .purchase_orders
        .create_purchase_order(payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", order.po_number);

    Ok(message_response("Purchase Order created successfully"))
}

/// List purchase orders
#[utoipa::path(
    get,
    path = "/purchase_orders/",
    responses(
        (status = 200, description = "All purchase orders", body = [PurchaseOrderResponse]),
    ),
    tag = "purchase_orders"
)]
pub async fn list_purchase_orders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .list_purchase_orders()
        .await
        .map_err(map_service_error)?;

    let body: Vec<PurchaseOrderResponse> = orders
        .into_iter()
        .map(PurchaseOrderResponse::from)
        .collect();
    Ok(success_response(body))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/purchase_orders/{id}/",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order found", body = PurchaseOrderResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase_orders"
)]
pub async fn get_purchase_order(
    State(state): State<Arc<AppState>>,
    ApiPath(purchase_order_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get_purchase_order(purchase_order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PurchaseOrderResponse::from(order)))
}

/// Update a purchase order
#[utoipa::path(
    put,
    path = "/purchase_orders/{id}/update/",
    params(("id" = i32, Path, description = "Purchase order ID")),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = crate::handlers::common::MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order or vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "po_number already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase_orders"
)]
pub async fn update_purchase_order(
    State(state): State<Arc<AppState>>,
    ApiPath(purchase_order_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .purchase_orders
        .update_purchase_order(purchase_order_id, payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Purchase order updated: {}", purchase_order_id);

    Ok(message_response("Purchase Order updated successfully"))
}

/// Delete a purchase order
#[utoipa::path(
    delete,
    path = "/purchase_orders/{id}/delete/",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order deleted", body = crate::handlers::common::MessageResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "purchase_orders"
)]
pub async fn delete_purchase_order(
    State(state): State<Arc<AppState>>,
    ApiPath(purchase_order_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete_purchase_order(purchase_order_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order deleted: {}", purchase_order_id);

    Ok(message_response("Purchase Order deleted successfully"))
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/purchase_orders/", get(list_purchase_orders))
        .route("/purchase_orders/create/", post(create_purchase_order))
        .route("/purchase_orders/:id/", get(get_purchase_order))
        .route("/purchase_orders/:id/update/", put(update_purchase_order))
        .route("/purchase_orders/:id/delete/", delete(delete_purchase_order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_request_parses_rfc3339_and_optional_fields() {
        let req: CreatePurchaseOrderRequest = serde_json::from_str(
            r#"{
                "po_number": "PO-100",
                "vendor_id": 1,
                "order_date": "2024-03-01T09:00:00Z",
                "delivery_date": "2024-03-08T09:00:00+02:00",
                "items": "steel beams",
                "quantity": 12,
                "status": "Pending",
                "issue_date": "2024-03-01T09:00:00Z"
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(
            req.delivery_date,
            Utc.with_ymd_and_hms(2024, 3, 8, 7, 0, 0).unwrap()
        );
        assert!(req.quality_rating.is_none());
        assert!(req.acknowledgment_date.is_none());
    }

    #[test]
    fn create_request_accepts_plain_dates() {
        let req: CreatePurchaseOrderRequest = serde_json::from_str(
            r#"{
                "po_number": "PO-102",
                "vendor_id": 1,
                "order_date": "2024-03-01",
                "delivery_date": "2024-03-08",
                "actual_delivery_date": null,
                "items": "gaskets",
                "quantity": 3,
                "status": "Pending",
                "issue_date": "2024-03-01"
            }"#,
        )
        .unwrap();

        assert_eq!(req.order_date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(req.delivery_date, Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap());
        assert!(req.actual_delivery_date.is_none());
    }

    #[test]
    fn create_request_rejects_unknown_status() {
        let parsed = serde_json::from_str::<CreatePurchaseOrderRequest>(
            r#"{
                "po_number": "PO-103",
                "vendor_id": 1,
                "order_date": "2024-03-01",
                "delivery_date": "2024-03-08",
                "items": "gaskets",
                "quantity": 3,
                "status": "Shipped",
                "issue_date": "2024-03-01"
            }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn create_request_rejects_out_of_range_rating() {
        let req: CreatePurchaseOrderRequest = serde_json::from_str(
            r#"{
                "po_number": "PO-101",
                "vendor_id": 1,
                "order_date": "2024-03-01T09:00:00Z",
                "delivery_date": "2024-03-08T09:00:00Z",
                "items": "bolts",
                "quantity": -1,
                "status": "Completed",
                "quality_rating": 7.0,
                "issue_date": "2024-03-01T09:00:00Z"
            }"#,
        )
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("quality_rating"));
        assert!(fields.contains_key("quantity"));
    }

    #[test]
    fn response_uses_vendor_name_and_plain_dates() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap();
        let order = purchase_order::Model {
            id: 3,
            po_number: "PO-3".into(),
            vendor_id: 9,
            order_date: at,
            delivery_date: at + chrono::Duration::days(2),
            actual_delivery_date: None,
            items: "crates".into(),
            quantity: 1,
            status: PurchaseOrderStatus::Pending,
            quality_rating: None,
            issue_date: at,
            acknowledgment_date: None,
        };
        let vendor = vendor::Model {
            id: 9,
            name: "Globex".into(),
            contact_details: "c".into(),
            address: "a".into(),
            vendor_code: "GLX".into(),
            on_time_delivery_rate: 0.0,
            quality_rating_avg: 0.0,
            average_response_time: 0.0,
            fulfillment_rate: 0.0,
        };

        let body = serde_json::to_value(PurchaseOrderResponse::from((order, Some(vendor)))).unwrap();
        assert_eq!(body["vendor"], "Globex");
        assert_eq!(body["order_date"], "2024-03-01");
        assert_eq!(body["delivery_date"], "2024-03-03");
        assert_eq!(body["status"], "Pending");
    }
}
