use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendor Management API",
        version = "0.1.0",
        description = r#"
# Vendor Management API

Vendor profiles, purchase order tracking and vendor performance evaluation.

## Performance metrics

`GET /vendors/{id}/performance/` recomputes four metrics from the vendor's
`Completed` purchase orders, stores them on the vendor and returns them:

- `on_time_delivery_rate`: share of completed orders delivered on or before the promised date (%)
- `quality_rating_avg`: mean quality rating over rated completed orders
- `average_response_time`: mean minutes from issue to acknowledgment
- `fulfillment_rate`: share of completed orders that were acknowledged (%)

## Error Handling

Failures return a JSON body with `error`, `message`, `request_id` and `timestamp`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "vendors", description = "Vendor profiles and performance"),
        (name = "purchase_orders", description = "Purchase order tracking"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
        crate::handlers::vendors::vendor_performance,

        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,

        crate::health::health_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::handlers::common::MessageResponse,
            crate::handlers::vendors::CreateVendorRequest,
            crate::handlers::vendors::UpdateVendorRequest,
            crate::handlers::vendors::VendorSummary,
            crate::handlers::vendors::VendorResponse,
            crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
            crate::handlers::purchase_orders::UpdatePurchaseOrderRequest,
            crate::handlers::purchase_orders::PurchaseOrderResponse,
            crate::models::PurchaseOrderStatus,
            crate::services::performance::PerformanceMetrics,
            crate::health::HealthInfo,
            crate::health::HealthStatus,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDocV1::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/vendors/",
            "/vendors/create/",
            "/vendors/{id}/",
            "/vendors/{id}/update/",
            "/vendors/{id}/delete/",
            "/vendors/{id}/performance/",
            "/purchase_orders/",
            "/purchase_orders/create/",
            "/purchase_orders/{id}/",
            "/purchase_orders/{id}/update/",
            "/purchase_orders/{id}/delete/",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
