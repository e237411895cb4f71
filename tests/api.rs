use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use storefront_bot::{api, db, AppState, Config, EventPublisher};
use tower::ServiceExt;

async fn state(token: Option<&str>) -> AppState {
    let pool = db::connect_in_memory().await.unwrap();
    let config = Config { admin_api_token: token.map(str::to_string), ..Config::default() };
    AppState::new(pool, config, EventPublisher::disabled())
}

async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = api::router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn health_is_public() {
    let state = state(Some("secret")).await;
    let (status, body) = call(&state, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn token_is_required_when_configured() {
    let state = state(Some("secret")).await;
    let (status, body) = call(&state, "GET", "/api/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = call(&state, "GET", "/api/v1/categories", None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = call(&state, "GET", "/api/v1/categories", None, Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn catalog_round_trip() {
    let state = state(None).await;
    let (status, category) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": "Electronics", "description": "Gadgets"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();
    assert_eq!(category["is_active"], true);

    let (status, product) = call(&state, "POST", "/api/v1/products", Some(json!({"category_id": category_id, "name": "Laptop Pro"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_i64().unwrap();

    let variant = json!({"product_id": product_id, "name": "16GB RAM", "price": 129_999, "stock": 4});
    let (status, created) = call(&state, "POST", "/api/v1/variants", Some(variant), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!((created["price"].as_i64(), created["stock"].as_i64()), (Some(129_999), Some(4)));

    let (_, variants) = call(&state, "GET", &format!("/api/v1/products/{product_id}/variants"), None, None).await;
    assert_eq!(variants.as_array().unwrap().len(), 1);
    let (_, products) = call(&state, "GET", &format!("/api/v1/categories/{category_id}/products"), None, None).await;
    assert_eq!(products[0]["name"], "Laptop Pro");

    let renamed = json!({"name": "Computers", "position": 1});
    let (status, updated) = call(&state, "PUT", &format!("/api/v1/categories/{category_id}"), Some(renamed), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Computers");
}

#[tokio::test]
async fn invalid_input_and_missing_rows() {
    let state = state(None).await;
    let (status, _) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": ""})), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(&state, "GET", "/api/v1/products/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product 42 not found");

    let (status, _) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": "Food"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": "Food"})), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let bad_price = json!({"product_id": 1, "name": "x", "price": -5});
    let (status, _) = call(&state, "POST", "/api/v1/variants", Some(bad_price), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn orders_listing_and_delivery() {
    let state = state(None).await;
    assert!(db::seed::sample_data(&state.db).await.unwrap());
    let (status, page) = call(&state, "GET", "/api/v1/orders?status=pending&page=1&per_page=10", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((page["total"].as_i64(), page["page"].as_u64()), (Some(0), Some(1)));

    let (status, _) = call(&state, "POST", "/api/v1/orders/1/deliver", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) = call(&state, "GET", "/api/v1/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 0);
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() {
    let state = state(None).await;
    let (status, page) = call(&state, "GET", "/api/v1/orders?page=4294967295&per_page=100", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["page"].as_u64(), Some(u64::from(u32::MAX)));
}

#[tokio::test]
async fn category_visibility_can_be_toggled() {
    let state = state(None).await;
    let (_, category) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": "Books", "position": 4})), None).await;
    let id = category["id"].as_i64().unwrap();

    let (status, hidden) = call(&state, "PATCH", &format!("/api/v1/categories/{id}/active"), Some(json!({"is_active": false})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((hidden["is_active"].as_bool(), hidden["position"].as_i64()), (Some(false), Some(4)));
    assert!(storefront_bot::db::catalog::list_active_categories(&state.db).await.unwrap().is_empty());

    let (status, body) = call(&state, "PATCH", "/api/v1/categories/999/active", Some(json!({"is_active": true})), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "category 999 not found");
}

#[tokio::test]
async fn product_gallery_endpoints() {
    let state = state(None).await;
    let (_, category) = call(&state, "POST", "/api/v1/categories", Some(json!({"name": "Shoes"})), None).await;
    let (_, product) = call(&state, "POST", "/api/v1/products", Some(json!({"category_id": category["id"], "name": "Runner"})), None).await;
    let id = product["id"].as_i64().unwrap();

    let (status, image) = call(&state, "POST", &format!("/api/v1/products/{id}/images"), Some(json!({"file_id": "AgAD-1"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&state, "POST", &format!("/api/v1/products/{id}/images"), Some(json!({"file_id": ""})), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, gallery) = call(&state, "GET", &format!("/api/v1/products/{id}/images"), None, None).await;
    assert_eq!(gallery[0]["file_id"], "AgAD-1");

    let image_id = image["id"].as_i64().unwrap();
    let (status, _) = call(&state, "DELETE", &format!("/api/v1/images/{image_id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&state, "DELETE", &format!("/api/v1/images/{image_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
