#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vendor_management_api::{build_router, config::AppConfig, db, AppState};

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Creates a vendor through the API and returns its id.
    pub async fn create_vendor(&self, name: &str, vendor_code: &str) -> i64 {
        let (status, body) = self
            .json(
                Method::POST,
                "/vendors/create/",
                Some(vendor_body(name, vendor_code)),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "vendor create failed: {body}");

        let (_, vendors) = self.json(Method::GET, "/vendors/", None).await;
        vendors
            .as_array()
            .and_then(|list| list.iter().find(|v| v["name"] == name))
            .and_then(|v| v["id"].as_i64())
            .expect("created vendor missing from list")
    }

    /// Creates a purchase order through the API.
    pub async fn create_purchase_order(&self, body: Value) {
        let (status, response) = self
            .json(Method::POST, "/purchase_orders/create/", Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "purchase order create failed: {response}");
    }

    /// Looks up a purchase order id by its number.
    pub async fn purchase_order_id(&self, po_number: &str) -> i32 {
        use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
        use vendor_management_api::models::purchase_order;

        purchase_order::Entity::find()
            .filter(purchase_order::Column::PoNumber.eq(po_number))
            .one(self.state.db.as_ref())
            .await
            .expect("query purchase order")
            .map(|po| po.id)
            .expect("purchase order exists")
    }
}

pub fn vendor_body(name: &str, vendor_code: &str) -> Value {
    json!({
        "name": name,
        "contact_details": format!("{} <sales@example.com>", name),
        "address": "221B Baker Street, London",
        "vendor_code": vendor_code,
    })
}

/// A purchase order body; callers override fields as needed.
pub fn purchase_order_body(po_number: &str, vendor_id: i64, status: &str) -> Value {
    json!({
        "po_number": po_number,
        "vendor_id": vendor_id,
        "order_date": "2024-03-01T09:00:00Z",
        "delivery_date": "2024-03-08T17:00:00Z",
        "items": "10x hydraulic pumps",
        "quantity": 10,
        "status": status,
        "issue_date": "2024-03-01T09:00:00Z",
    })
}
