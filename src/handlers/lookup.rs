use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::handlers::AppState;

#[derive(Debug, Deserialize)]
pub struct UpcParams {
    pub upc: Option<String>,
}

/// Create the legacy lookup proxy router
pub fn lookup_routes() -> Router<AppState> {
    Router::new().route("/api/upc", get(proxy_lookup).options(preflight))
}

/// Every proxy response carries these, echoing an allow-listed request origin
/// and falling back to the canonical one otherwise.
fn cors_headers(state: &AppState, headers: &HeaderMap) -> [(HeaderName, String); 3] {
    let allowed = state.config.lookup_origins();
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .filter(|origin| allowed.iter().any(|entry| entry == origin))
        .unwrap_or(state.config.lookup_fallback_origin.as_str());

    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.to_string()),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            "GET, OPTIONS".to_string(),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type".to_string(),
        ),
    ]
}

/// UPC lookup proxy kept on its pre-v1 path for the deployed clients
///
/// The wire contract is frozen: plain `{"error": ...}` bodies on 400/404/500
/// and the normalized lookup result on 200, never the enveloped error shape
/// the rest of the API uses.
#[utoipa::path(
    get,
    path = "/api/upc",
    params(
        ("upc" = Option<String>, Query, description = "Barcode to look up")
    ),
    responses(
        (status = 200, description = "Normalized product data", body = crate::models::LookupResult),
        (status = 400, description = "Missing UPC parameter"),
        (status = 404, description = "Product not found upstream"),
        (status = 500, description = "Upstream failure")
    ),
    tag = "lookup"
)]
pub async fn proxy_lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<UpcParams>,
) -> Response {
    let cors = cors_headers(&state, &headers);

    let barcode = match params.upc.as_deref().map(str::trim) {
        Some(upc) if !upc.is_empty() => upc,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                cors,
                Json(json!({ "error": "Missing UPC parameter" })),
            )
                .into_response();
        }
    };

    match state.lookup_client.lookup(barcode).await {
        Ok(Some(result)) => (StatusCode::OK, cors, Json(result)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            cors,
            Json(json!({ "error": "Product not found" })),
        )
            .into_response(),
        Err(err) => {
            error!("UPC proxy lookup failed for {}: {}", barcode, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                cors,
                Json(json!({ "error": "Server error" })),
            )
                .into_response()
        }
    }
}

/// Answers CORS preflight with the same headers and an empty body
pub async fn preflight(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    (StatusCode::OK, cors_headers(&state, &headers))
}
