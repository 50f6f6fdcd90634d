use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lager API",
        version = "0.3.0",
        description = r#"
# Lager API

Inventory tracking for a small stock room: items are identified by barcode,
filed under a fixed category tree, added through a prefillable form and
consumed by scanning.

## Features

- **Items**: list, search, sort and filter the stock; fetch single records by barcode
- **Add-item workflow**: prefill from the store or the UPC database, then create or restock additively
- **Decrement by scan**: one unit per scan, never below zero, verdict always on a 200 response
- **Catalog**: the fixed category/subcategory tree
- **UPC proxy**: the pre-v1 `/api/upc` lookup passthrough kept for deployed clients

## Error Handling

Errors use a consistent envelope with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Molimo popunite sva obavezna polja",
  "details": {"barcode": "Barkod je obavezan"},
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Form validation failures key field messages under `details`. The legacy
`/api/upc` endpoint keeps its own plain `{"error": ...}` bodies.
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
        (name = "items", description = "Inventory item endpoints"),
        (name = "catalog", description = "Category tree endpoints"),
        (name = "lookup", description = "UPC lookup proxy endpoints")
    ),
    paths(
        // Items
        crate::handlers::items::list_items,
        crate::handlers::items::add_item,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::decrement_item,
        crate::handlers::items::prefill_item,

        // Catalog
        crate::handlers::catalog::get_catalog,

        // Legacy lookup proxy
        crate::handlers::lookup::proxy_lookup,

        // Health & status intentionally omitted from OpenAPI paths
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,

            // Item types
            crate::models::Item,
            crate::models::StockLevel,
            crate::models::DecrementOutcome,
            crate::models::LookupResult,

            // Add-item workflow types
            crate::services::add_item::AddItemForm,
            crate::services::add_item::PrefillResponse,
            crate::services::add_item::PrefillSource,

            // Listing types
            crate::services::inventory::SortField,
            crate::services::inventory::SortDirection,

            // Catalog types
            crate::catalog::Category,
            crate::catalog::Subcategory,
            crate::handlers::catalog::CategoryTree,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
