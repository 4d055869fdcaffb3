use super::common::{
    map_service_error, message_response, success_response, validate_input, ApiJson, ApiPath,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::vendor,
    repositories::{NewVendor, VendorPatch},
    services::performance::PerformanceMetrics,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub contact_details: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1, max = 64))]
    pub vendor_code: String,
}

impl From<CreateVendorRequest> for NewVendor {
    fn from(req: CreateVendorRequest) -> Self {
        Self {
            name: req.name,
            contact_details: req.contact_details,
            address: req.address,
            vendor_code: req.vendor_code,
        }
    }
}

/// Omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub contact_details: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub vendor_code: Option<String>,
}

impl From<UpdateVendorRequest> for VendorPatch {
    fn from(req: UpdateVendorRequest) -> Self {
        Self {
            name: req.name,
            contact_details: req.contact_details,
            address: req.address,
            vendor_code: req.vendor_code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorSummary {
    pub id: i32,
    pub name: String,
}

impl From<vendor::Model> for VendorSummary {
    fn from(model: vendor::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Vendor profile with the last computed performance snapshot
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorResponse {
    pub id: i32,
    pub name: String,
    pub contact_details: String,
    pub address: String,
    pub vendor_code: String,
    pub on_time_delivery_rate: f64,
    pub quality_rating_avg: f64,
    pub average_response_time: f64,
    pub fulfillment_rate: f64,
}

impl From<vendor::Model> for VendorResponse {
    fn from(model: vendor::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_details: model.contact_details,
            address: model.address,
            vendor_code: model.vendor_code,
            on_time_delivery_rate: model.on_time_delivery_rate,
            quality_rating_avg: model.quality_rating_avg,
            average_response_time: model.average_response_time,
            fulfillment_rate: model.fulfillment_rate,
        }
    }
}

// Handler functions

/// Create a new vendor
#[utoipa::path(
    post,
    path = "/vendors/create/",
    request_body = CreateVendorRequest,
    responses(
        (status = 200, description = "Vendor created", body = crate::handlers::common::MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "vendor_code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .create_vendor(payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Vendor created: {}", vendor.id);

    Ok(message_response("Vendor created successfully"))
}

/// List vendors
#[utoipa::path(
    get,
    path = "/vendors/",
    responses(
        (status = 200, description = "All vendors", body = [VendorSummary]),
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let vendors = state
        .services
        .vendors
        .list_vendors()
        .await
        .map_err(map_service_error)?;

    let body: Vec<VendorSummary> = vendors.into_iter().map(VendorSummary::from).collect();
    Ok(success_response(body))
}

/// Get a vendor by ID
#[utoipa::path(
    get,
    path = "/vendors/{id}/",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor found", body = VendorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<Arc<AppState>>,
    ApiPath(vendor_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state
        .services
        .vendors
        .get_vendor(vendor_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(VendorResponse::from(vendor)))
}

/// Update a vendor
#[utoipa::path(
    put,
    path = "/vendors/{id}/update/",
    params(("id" = i32, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = crate::handlers::common::MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "vendor_code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<Arc<AppState>>,
    ApiPath(vendor_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .vendors
        .update_vendor(vendor_id, payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Vendor updated: {}", vendor_id);

    Ok(message_response("Vendor updated successfully"))
}

/// Delete a vendor and its purchase orders
#[utoipa::path(
    delete,
    path = "/vendors/{id}/delete/",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deleted", body = crate::handlers::common::MessageResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<Arc<AppState>>,
    ApiPath(vendor_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .vendors
        .delete_vendor(vendor_id)
        .await
        .map_err(map_service_error)?;

    info!("Vendor deleted: {}", vendor_id);

    Ok(message_response("Vendor deleted successfully"))
}

/// Recompute and return a vendor's performance metrics
#[utoipa::path(
    get,
    path = "/vendors/{id}/performance/",
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Freshly computed metrics", body = PerformanceMetrics),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn vendor_performance(
    State(state): State<Arc<AppState>>,
    ApiPath(vendor_id): ApiPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = state
        .services
        .vendors
        .recompute_performance(vendor_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(metrics))
}

/// Creates the router for vendor endpoints
pub fn vendor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vendors/", get(list_vendors))
        .route("/vendors/create/", post(create_vendor))
        .route("/vendors/:id/", get(get_vendor))
        .route("/vendors/:id/update/", put(update_vendor))
        .route("/vendors/:id/delete/", delete(delete_vendor))
        .route("/vendors/:id/performance/", get(vendor_performance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_blank_fields() {
        let req = CreateVendorRequest {
            name: String::new(),
            contact_details: "c".into(),
            address: "a".into(),
            vendor_code: String::new(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("vendor_code"));
        assert!(!fields.contains_key("address"));
    }

    #[test]
    fn update_request_validates_only_present_fields() {
        assert!(UpdateVendorRequest::default().validate().is_ok());

        let req = UpdateVendorRequest {
            vendor_code: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_ignores_performance_fields() {
        let req: UpdateVendorRequest =
            serde_json::from_str(r#"{"name": "Acme", "fulfillment_rate": 100.0}"#).unwrap();
        let patch = VendorPatch::from(req);
        assert_eq!(patch.name.as_deref(), Some("Acme"));
        assert!(patch.vendor_code.is_none());
    }
}
