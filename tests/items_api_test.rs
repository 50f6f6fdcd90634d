mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::{json, Value};

use common::{item_payload, new_item, response_json, TestApp};

#[tokio::test]
async fn health_reports_a_healthy_store() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body, json!({"status": "healthy", "database": "healthy"}));
}

#[tokio::test]
async fn status_reports_service_and_version() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "lager-api");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["environment"], "test");
}

#[tokio::test]
async fn responses_carry_a_request_id_in_header_and_meta() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/items", None).await;
    assert_matches!(response.headers().get("x-request-id"), Some(_));

    let header_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("request id header should be a string");

    let body = response_json(response).await;
    assert_eq!(body["meta"]["request_id"], header_id);
}

#[tokio::test]
async fn creating_an_item_returns_201_with_the_stored_record() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/items", Some(item_payload("111")))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Artikal uspješno dodat");
    assert_eq!(body["data"]["barcode"], "111");
    assert_eq!(body["data"]["quantity"], 12);
    assert_eq!(body["data"]["purchasePrice"], 145.0);
    assert!(body["data"]["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["data"]["createdAt"].is_string());
}

#[tokio::test]
async fn resubmitting_a_barcode_restocks_instead_of_duplicating() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/api/v1/items", Some(item_payload("111")))
        .await;

    let mut restock = item_payload("111");
    restock["quantity"] = json!(5);
    let response = app
        .request(Method::POST, "/api/v1/items", Some(restock))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Dodano 5 kom. Nova količina: 17");
    assert_eq!(body["data"]["quantity"], 17);

    // Still one record for the barcode.
    let list = response_json(app.request(Method::GET, "/api/v1/items", None).await).await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn blank_submission_reports_every_field_in_croatian() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/items", Some(json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Molimo popunite sva obavezna polja");

    let details = &body["details"];
    assert_eq!(details["barcode"], "Barkod je obavezan");
    assert_eq!(details["name"], "Naziv je obavezan");
    assert_eq!(details["supplier"], "Dobavljač je obavezan");
    assert_eq!(details["imageUrl"], "URL slike je obavezan");
    assert_eq!(details["purchasePrice"], "Nabavna cijena mora biti veća od 0");
    assert_eq!(details["quantity"], "Količina mora biti 0 ili veća");
    assert_eq!(details["categoryId"], "Kategorija je obavezna");
    assert_eq!(details["subcategoryId"], "Potkategorija je obavezna");
}

#[rstest]
#[case::unknown_category("cat-99", "sub-1", "categoryId", "Nepoznata kategorija")]
#[case::foreign_subcategory(
    "cat-1",
    "sub-8",
    "subcategoryId",
    "Potkategorija ne pripada odabranoj kategoriji"
)]
#[tokio::test]
async fn catalog_references_are_checked_on_submit(
    #[case] category_id: &str,
    #[case] subcategory_id: &str,
    #[case] field: &str,
    #[case] message: &str,
) {
    let app = TestApp::new().await;

    let mut payload = item_payload("111");
    payload["categoryId"] = json!(category_id);
    payload["subcategoryId"] = json!(subcategory_id);

    let response = app
        .request(Method::POST, "/api/v1/items", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["details"][field], message);
}

#[tokio::test]
async fn fetching_by_barcode_round_trips() {
    let app = TestApp::new().await;
    app.insert_item(new_item("4567890123456", 25)).await;

    let response = app
        .request(Method::GET, "/api/v1/items/4567890123456", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["barcode"], "4567890123456");
    assert_eq!(body["data"]["name"], "LOGITECH G502 Lightspeed black");
}

#[tokio::test]
async fn fetching_an_unknown_barcode_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/items/0000000000000", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Not found: Artikal nije pronađen");
}

async fn seed_showroom(app: &TestApp) {
    let mut board = new_item("111", 8);
    board.name = "ASUS ROG STRIX B650E-F GAMING WIFI".to_string();
    board.supplier = "IPON".to_string();
    board.category_id = "cat-1".to_string();
    board.subcategory_id = "sub-2".to_string();
    app.insert_item(board).await;

    let mut memory = new_item("222", 15);
    memory.name = "KINGSTON FURY 32GB Beast RGB DDR5".to_string();
    memory.supplier = "CPU".to_string();
    memory.category_id = "cat-1".to_string();
    memory.subcategory_id = "sub-3".to_string();
    app.insert_item(memory).await;

    // The helper's defaults are already a cat-2/sub-8 mouse.
    app.insert_item(new_item("333", 25)).await;
}

#[tokio::test]
async fn listing_returns_newest_first() {
    let app = TestApp::new().await;
    seed_showroom(&app).await;

    let body = response_json(app.request(Method::GET, "/api/v1/items", None).await).await;
    let barcodes: Vec<_> = body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|item| item["barcode"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(barcodes, vec!["333", "222", "111"]);
}

#[tokio::test]
async fn listing_searches_name_and_supplier() {
    let app = TestApp::new().await;
    seed_showroom(&app).await;

    let body = response_json(
        app.request(Method::GET, "/api/v1/items?search=fury", None)
            .await,
    )
    .await;
    let data = body["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["barcode"], "222");

    let body = response_json(
        app.request(Method::GET, "/api/v1/items?search=ipon", None)
            .await,
    )
    .await;
    let data = body["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["barcode"], "111");
}

#[tokio::test]
async fn listing_filters_by_category_and_subcategory() {
    let app = TestApp::new().await;
    seed_showroom(&app).await;

    let body = response_json(
        app.request(Method::GET, "/api/v1/items?categoryId=cat-1", None)
            .await,
    )
    .await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    // A chosen subcategory narrows past the category.
    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/items?categoryId=cat-1&subcategoryId=sub-8",
            None,
        )
        .await,
    )
    .await;
    let data = body["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["barcode"], "333");
}

#[tokio::test]
async fn listing_sorts_by_quantity_descending() {
    let app = TestApp::new().await;
    seed_showroom(&app).await;

    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/items?sortBy=quantity&sortOrder=desc",
            None,
        )
        .await,
    )
    .await;
    let quantities: Vec<_> = body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|item| item["quantity"].as_i64().unwrap_or_default())
        .collect();
    assert_eq!(quantities, vec![25, 15, 8]);
}

#[tokio::test]
async fn updating_an_item_overwrites_the_record() {
    let app = TestApp::new().await;

    let created = response_json(
        app.request(Method::POST, "/api/v1/items", Some(item_payload("111")))
            .await,
    )
    .await;
    let id = created["data"]["id"]
        .as_str()
        .expect("created item should have an id")
        .to_string();

    let mut item = created["data"].clone();
    item["name"] = json!("KINGSTON FURY 32GB (tray)");
    item["quantity"] = json!(40);

    let response = app
        .request(Method::PUT, &format!("/api/v1/items/{id}"), Some(item))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "KINGSTON FURY 32GB (tray)");
    assert_eq!(body["data"]["quantity"], 40);

    let fetched = response_json(app.request(Method::GET, "/api/v1/items/111", None).await).await;
    assert_eq!(fetched["data"]["quantity"], 40);
}

#[tokio::test]
async fn updating_an_unknown_id_is_not_found() {
    let app = TestApp::new().await;

    let created = response_json(
        app.request(Method::POST, "/api/v1/items", Some(item_payload("111")))
            .await,
    )
    .await;

    let mut body = created["data"].clone();
    // A fresh barcode keeps the uniqueness check out of the way.
    body["barcode"] = json!("999");

    let response = app
        .request(Method::PUT, "/api/v1/items/nepostojeci-id", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_cannot_steal_another_items_barcode() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/api/v1/items", Some(item_payload("111")))
        .await;
    let second = response_json(
        app.request(Method::POST, "/api/v1/items", Some(item_payload("222")))
            .await,
    )
    .await;
    let second_id = second["data"]["id"]
        .as_str()
        .expect("created item should have an id")
        .to_string();

    let mut hijack = second["data"].clone();
    hijack["barcode"] = json!("111");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/items/{second_id}"),
            Some(hijack),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Conflict: Artikal s ovim barkodom već postoji"
    );
}

#[tokio::test]
async fn catalog_returns_the_category_tree() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/catalog", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let tree = body["data"].as_array().expect("data should be an array");
    assert_eq!(tree.len(), 4);

    assert_eq!(tree[0]["id"], "cat-1");
    assert_eq!(tree[0]["name"], "Računarske komponente");
    assert_eq!(tree[0]["subcategories"].as_array().map(Vec::len), Some(7));
    assert_eq!(tree[0]["subcategories"][0]["name"], "CPU");

    assert_eq!(tree[1]["id"], "cat-2");
    assert_eq!(tree[1]["subcategories"].as_array().map(Vec::len), Some(4));
    assert_eq!(tree[3]["subcategories"][0]["name"], "Kamere");
}

#[tokio::test]
async fn prefill_prefers_the_store() {
    let app = TestApp::new().await;
    app.insert_item(new_item("4567890123456", 25)).await;

    let response = app
        .request(Method::GET, "/api/v1/items/prefill?barcode=4567890123456", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["source"], "store");
    assert_eq!(body["notice"], "Artikal već postoji – podaci su učitani iz baze");
    assert_eq!(body["item"]["barcode"], "4567890123456");
}

#[tokio::test]
async fn prefill_without_a_barcode_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/items/prefill", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation error: Unesite barkod");
}
