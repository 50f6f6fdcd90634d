use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::models::Item;
use crate::services::add_item::AddItemForm;
use crate::services::inventory::ItemQuery;
use crate::ApiResponse;

/// Create the items router
pub fn items_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(add_item))
        .route("/prefill", get(prefill_item))
        .route("/:barcode", get(get_item).put(update_item))
        .route("/:barcode/decrement", post(decrement_item))
}

/// List items with optional search, category narrowing and sorting
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(
        ItemQuery
    ),
    responses(
        (status = 200, description = "Item list returned, newest first unless sorted"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.inventory_service.browse(&query).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Submit the add-item form: creates a new item or restocks an existing barcode
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = AddItemForm,
    responses(
        (status = 201, description = "Item created"),
        (status = 200, description = "Existing item restocked additively"),
        (status = 400, description = "Form validation failed, field messages in details", body = crate::errors::ErrorResponse),
        (status = 409, description = "Barcode already taken", body = crate::errors::ErrorResponse),
        (status = 503, description = "Store rejected the write", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Json(form): Json<AddItemForm>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.add_item_service.submit(form).await?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = outcome.message();
    let item = outcome.item().clone();

    Ok((status, Json(ApiResponse::success_with_message(item, message))))
}

/// Fetch a single item by its barcode
#[utoipa::path(
    get,
    path = "/api/v1/items/{barcode}",
    params(
        ("barcode" = String, Path, description = "Item barcode")
    ),
    responses(
        (status = 200, description = "Item returned"),
        (status = 404, description = "No item carries this barcode", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.inventory_service.get_by_barcode(&barcode).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Overwrite an item record by id
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(
        ("id" = String, Path, description = "Item id")
    ),
    request_body = Item,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "Unknown item id", body = crate::errors::ErrorResponse),
        (status = 409, description = "Barcode already taken by another item", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut item): Json<Item>,
) -> Result<impl IntoResponse, ServiceError> {
    // The path names the record; a mismatched body id is overridden.
    item.id = id;
    let updated = state.inventory_service.update_item(item).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Remove one unit for a scanned barcode
///
/// Misses and empty stock are ordinary outcomes: the response is always 200
/// and the verdict rides the body, so a scanner loop never has to branch on
/// status codes.
#[utoipa::path(
    post,
    path = "/api/v1/items/{barcode}/decrement",
    params(
        ("barcode" = String, Path, description = "Scanned barcode")
    ),
    responses(
        (status = 200, description = "Scan verdict", body = crate::models::DecrementOutcome),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn decrement_item(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .inventory_service
        .decrement_by_barcode(&barcode)
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrefillParams {
    /// Barcode to prefill the form for; blank is rejected.
    pub barcode: Option<String>,
}

/// Prefill the add-item form for a barcode
///
/// Answers from the store when the barcode is already known, otherwise from
/// the UPC database. Lookup trouble degrades to a notice so manual entry can
/// proceed.
#[utoipa::path(
    get,
    path = "/api/v1/items/prefill",
    params(
        PrefillParams
    ),
    responses(
        (status = 200, description = "Prefill data with its source and notice", body = crate::services::add_item::PrefillResponse),
        (status = 400, description = "Missing barcode", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn prefill_item(
    State(state): State<AppState>,
    Query(params): Query<PrefillParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .add_item_service
        .prefill(params.barcode.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(response))
}
