//! Lager API Library
//!
//! This crate provides the core functionality for the Lager inventory API:
//! barcode-keyed stock records, the add-item workflow, decrement-by-scan and
//! the UPC lookup proxy.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod storage;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn storage::ItemStore>,
    pub catalog: Arc<catalog::Catalog>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub inventory_service: services::inventory::InventoryService,
    pub add_item_service: services::add_item::AddItemService,
    pub lookup_client: services::lookup::UpcLookupClient,
}

impl AppState {
    /// Wires the services around a store. The lookup client comes from the
    /// config's UPC settings.
    pub fn build(
        store: Arc<dyn storage::ItemStore>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Result<Self, errors::ServiceError> {
        let lookup_client = services::lookup::UpcLookupClient::from_config(&config)?;
        Ok(Self::with_lookup_client(
            store,
            config,
            event_sender,
            lookup_client,
        ))
    }

    /// Same wiring with an explicit lookup client; tests point it at a local
    /// mock upstream.
    pub fn with_lookup_client(
        store: Arc<dyn storage::ItemStore>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        lookup_client: services::lookup::UpcLookupClient,
    ) -> Self {
        let catalog = Arc::new(catalog::Catalog::builtin());
        let inventory_service =
            services::inventory::InventoryService::new(store.clone(), event_sender.clone());
        let add_item_service = services::add_item::AddItemService::new(
            store.clone(),
            lookup_client.clone(),
            catalog.clone(),
            event_sender.clone(),
        );

        Self {
            store,
            catalog,
            config,
            event_sender,
            inventory_service,
            add_item_service,
            lookup_client,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    /// Success that also carries a user-facing notice, e.g. the add-item
    /// outcome messages.
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        // Items API
        .nest("/items", handlers::items::items_routes())
        // Catalog API
        .nest("/catalog", handlers::catalog::catalog_routes())
}

/// Assembles the HTTP application: root banner, health, the v1 API, the
/// legacy lookup proxy and Swagger UI, wrapped in the shared middleware
/// stack. The CORS layer comes from the composition root because building it
/// can reject the config. It covers only the API surface: the legacy proxy
/// writes its own CORS headers and must stay out of the layer's reach.
pub fn app(state: AppState, cors_layer: CorsLayer) -> Router {
    let api = Router::new()
        .route("/", get(|| async { "lager-api up" }))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // Apply CORS
        .layer(cors_layer);

    Router::new()
        .merge(api)
        // Legacy lookup proxy outside /api/v1
        .merge(handlers::lookup::lookup_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        // Apply compression and timeouts
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(tracing::request_id_middleware))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "lager-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // A cheap count doubles as the connectivity probe for either backend
    match state.store.count().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "healthy", "database": "healthy"})),
        ),
        Err(err) => {
            tracing::error!("Health check store probe failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unhealthy", "database": "unhealthy"})),
            )
        }
    }
}
