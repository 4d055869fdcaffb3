//! Vendor Management API Library
//!
//! Vendor profiles, purchase order tracking and vendor performance evaluation
//! over an axum HTTP surface backed by sea-orm.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// Vendor and purchase order resource routes, mounted at the root
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(handlers::vendors::vendor_routes())
        .merge(handlers::purchase_orders::purchase_order_routes())
}

/// Full application router: resources, health, Swagger UI, request ids and HTTP tracing.
///
/// CORS and compression are environment concerns and are layered on by the binary.
pub fn build_router(state: AppState) -> Router {
    let db = state.db.clone();

    Router::new()
        .route("/", get(|| async { "vendor-management-api up" }))
        .merge(api_routes())
        .merge(health::health_routes::<Arc<AppState>>(db))
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(Arc::new(state))
}
