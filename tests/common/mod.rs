#![allow(dead_code)]

//! Shared harness for the HTTP integration tests. Every [`TestApp`] owns an
//! isolated store, its own event loop and a full router, so tests can run in
//! parallel without touching each other's state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use lager_api::config::AppConfig;
use lager_api::db::{establish_connection_with_config, run_migrations, DbConfig};
use lager_api::events::{process_events, EventSender};
use lager_api::models::{Item, NewItem};
use lager_api::services::lookup::UpcLookupClient;
use lager_api::storage::{DbItemStore, ItemStore, MemoryItemStore};
use lager_api::AppState;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _event_task: JoinHandle<()>,
    db_file: Option<PathBuf>,
}

impl TestApp {
    /// App over the in-memory adapter.
    pub async fn new() -> Self {
        Self::build(Arc::new(MemoryItemStore::new()), test_config(), None).await
    }

    /// App over the sqlite adapter, migrated from scratch in a throwaway
    /// file. A single connection keeps sqlite writes serialized.
    pub async fn with_sqlite() -> Self {
        let db_file =
            std::env::temp_dir().join(format!("lager_test_{}.db", Uuid::new_v4().simple()));
        let db_config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", db_file.display()),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = establish_connection_with_config(&db_config)
            .await
            .expect("test database should connect");
        run_migrations(&pool).await.expect("migrations should apply");

        let store = Arc::new(DbItemStore::new(Arc::new(pool)));
        let mut app = Self::build(store, test_config(), None).await;
        app.db_file = Some(db_file);
        app
    }

    /// App whose lookup proxy talks to the given upstream base URL.
    pub async fn with_lookup_base(base_url: &str) -> Self {
        let lookup = UpcLookupClient::new(base_url, Duration::from_secs(5))
            .expect("lookup client should build");
        Self::build(Arc::new(MemoryItemStore::new()), test_config(), Some(lookup)).await
    }

    async fn build(
        store: Arc<dyn ItemStore>,
        config: AppConfig,
        lookup: Option<UpcLookupClient>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_task = tokio::spawn(process_events(event_rx));
        let event_sender = EventSender::new(event_tx);

        let state = match lookup {
            Some(client) => AppState::with_lookup_client(store, config, event_sender, client),
            None => AppState::build(store, config, event_sender).expect("app state should build"),
        };
        let router = lager_api::app(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            _event_task: event_task,
            db_file: None,
        }
    }

    /// Inserts directly through the store, bypassing the HTTP surface.
    pub async fn insert_item(&self, new_item: NewItem) -> Item {
        self.state
            .store
            .insert(new_item)
            .await
            .expect("test item should insert")
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }

        let request = match body {
            Some(json) => builder
                .body(Body::from(
                    serde_json::to_vec(&json).expect("body should serialize"),
                ))
                .expect("request should build"),
            None => builder.body(Body::empty()).expect("request should build"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should produce a response")
    }

    /// Like [`TestApp::request`] without a body, with extra headers. The
    /// lookup proxy tests use this to play different caller origins.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::empty()).expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should produce a response")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        if let Some(path) = self.db_file.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Config shared by every test app. Lookup origins mirror the production
/// defaults so the proxy's CORS handling stays observable.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new(
        "sqlite://lager_test.db?mode=memory".to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    );
    config.storage_backend = "memory".to_string();
    config.seed_on_empty = false;
    config.lookup_allowed_origins =
        "https://lager-tesla.vercel.app,http://localhost:5173".to_string();
    config.lookup_fallback_origin = "https://lager-tesla.vercel.app".to_string();
    config
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable")
        .to_vec()
}

/// A well-formed submission payload; tests tweak individual fields.
pub fn item_payload(barcode: &str) -> Value {
    serde_json::json!({
        "barcode": barcode,
        "name": "KINGSTON FURY 32GB Beast RGB DDR5 5600MHz CL36 KIT",
        "supplier": "CPU",
        "imageUrl": "https://media.icdn.hu/product/2022-09/831757/1999502_kingston.webp",
        "purchasePrice": 145.0,
        "quantity": 12,
        "categoryId": "cat-1",
        "subcategoryId": "sub-3"
    })
}

/// A [`NewItem`] ready for direct store insertion.
pub fn new_item(barcode: &str, quantity: i32) -> NewItem {
    NewItem {
        barcode: barcode.to_string(),
        name: "LOGITECH G502 Lightspeed black".to_string(),
        supplier: "Alza".to_string(),
        image_url: "https://media.icdn.hu/product/2019-07/559569/1261083_logitech_g502.webp"
            .to_string(),
        purchase_price: rust_decimal_macros::dec!(45.00),
        quantity,
        category_id: "cat-2".to_string(),
        subcategory_id: "sub-8".to_string(),
    }
}
