use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::Subcategory;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::ApiResponse;

/// One category with the subcategories filed under it.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    pub id: String,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

/// Create the catalog router
pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/", get(get_catalog))
}

/// The fixed category tree items are filed under
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    responses(
        (status = 200, description = "Categories with their subcategories")
    ),
    tag = "catalog"
)]
pub async fn get_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let tree: Vec<CategoryTree> = state
        .catalog
        .categories()
        .iter()
        .map(|category| CategoryTree {
            id: category.id.clone(),
            name: category.name.clone(),
            subcategories: state.catalog.subcategories_of(&category.id),
        })
        .collect();

    Ok(Json(ApiResponse::success(tree)))
}
