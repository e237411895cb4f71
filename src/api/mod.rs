//! Admin REST API and health check.

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;
use crate::db::catalog::{self, CategoryInput, ProductImageInput, ProductInput, SubcategoryInput, VariantInput};
use crate::db::orders::{self, OrderDetails, OrderStats};
use crate::domain::{Category, DomainEvent, Order, OrderError, OrderStatus, Product, ProductError, ProductImage, Subcategory, Variant};
use crate::{AppState, StorefrontError};

type ApiResult<T> = Result<Json<T>, StorefrontError>;
type Created<T> = Result<(StatusCode, Json<T>), StorefrontError>;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", get(get_category).put(update_category))
        .route("/categories/:id/active", patch(set_category_active))
        .route("/categories/:id/subcategories", get(list_subcategories))
        .route("/categories/:id/products", get(list_products))
        .route("/subcategories", post(create_subcategory))
        .route("/products", post(create_product))
        .route("/products/:id", get(get_product).put(update_product))
        .route("/products/:id/variants", get(list_variants))
        .route("/products/:id/images", get(list_images).post(add_image))
        .route("/images/:id", delete(delete_image))
        .route("/variants", post(create_variant))
        .route("/variants/:id", get(get_variant).put(update_variant))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/deliver", post(deliver_order))
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-bot"})) }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer token check; the API is open when no token is configured.
async fn require_token(State(s): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = s.config.admin_api_token.as_deref() else { return next.run(request).await };
    let presented = request.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected) {
        next.run(request).await
    } else {
        StorefrontError::Unauthorized.into_response()
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = match &self {
            StorefrontError::NotFound { .. } | StorefrontError::NotRegistered => StatusCode::NOT_FOUND,
            StorefrontError::Unauthorized => StatusCode::UNAUTHORIZED,
            StorefrontError::Order(OrderError::InvalidTransition { .. })
            | StorefrontError::Order(OrderError::OutOfStock { .. })
            | StorefrontError::Order(OrderError::Unavailable { .. })
            | StorefrontError::Product(ProductError::InsufficientStock { .. }) => StatusCode::CONFLICT,
            StorefrontError::Product(_)
            | StorefrontError::Order(_)
            | StorefrontError::Phone(_)
            | StorefrontError::Location(_)
            | StorefrontError::InvalidCallback(_)
            | StorefrontError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StorefrontError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => StatusCode::CONFLICT,
            StorefrontError::Database(sqlx::Error::Database(e)) if e.is_foreign_key_violation() || e.is_check_violation() => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)] pub struct ListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub status: Option<OrderStatus> }
#[derive(Debug, Deserialize)] pub struct ActiveRequest { pub is_active: bool }
#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: i64, pub page: u32 }

async fn list_categories(State(s): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(Json(catalog::list_categories(&s.db).await?))
}

async fn get_category(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Category> {
    Ok(Json(catalog::get_category(&s.db, id).await?))
}

async fn create_category(State(s): State<AppState>, Json(r): Json<CategoryInput>) -> Created<Category> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(catalog::create_category(&s.db, &r).await?)))
}

async fn update_category(State(s): State<AppState>, Path(id): Path<i64>, Json(r): Json<CategoryInput>) -> ApiResult<Category> {
    r.validate()?;
    Ok(Json(catalog::update_category(&s.db, id, &r).await?))
}

async fn set_category_active(State(s): State<AppState>, Path(id): Path<i64>, Json(r): Json<ActiveRequest>) -> ApiResult<Category> {
    Ok(Json(catalog::set_active(&s.db, id, r.is_active).await?))
}

async fn list_subcategories(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Vec<Subcategory>> {
    catalog::get_category(&s.db, id).await?;
    Ok(Json(catalog::list_subcategories(&s.db, id).await?))
}

async fn create_subcategory(State(s): State<AppState>, Json(r): Json<SubcategoryInput>) -> Created<Subcategory> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(catalog::create_subcategory(&s.db, &r).await?)))
}

async fn list_products(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Vec<Product>> {
    catalog::get_category(&s.db, id).await?;
    Ok(Json(catalog::list_all_products(&s.db, id).await?))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Product> {
    Ok(Json(catalog::get_product(&s.db, id).await?))
}

async fn create_product(State(s): State<AppState>, Json(r): Json<ProductInput>) -> Created<Product> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(catalog::create_product(&s.db, &r).await?)))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<i64>, Json(r): Json<ProductInput>) -> ApiResult<Product> {
    r.validate()?;
    Ok(Json(catalog::update_product(&s.db, id, &r).await?))
}

async fn list_images(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Vec<ProductImage>> {
    catalog::get_product(&s.db, id).await?;
    Ok(Json(catalog::list_product_images(&s.db, id).await?))
}

async fn add_image(State(s): State<AppState>, Path(id): Path<i64>, Json(r): Json<ProductImageInput>) -> Created<ProductImage> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(catalog::add_product_image(&s.db, id, &r).await?)))
}

async fn delete_image(State(s): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, StorefrontError> {
    catalog::delete_product_image(&s.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_variants(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Vec<Variant>> {
    catalog::get_product(&s.db, id).await?;
    Ok(Json(catalog::list_variants(&s.db, id).await?))
}

async fn get_variant(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Variant> {
    Ok(Json(catalog::get_variant(&s.db, id).await?))
}

async fn create_variant(State(s): State<AppState>, Json(r): Json<VariantInput>) -> Created<Variant> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(catalog::create_variant(&s.db, &r).await?)))
}

async fn update_variant(State(s): State<AppState>, Path(id): Path<i64>, Json(r): Json<VariantInput>) -> ApiResult<Variant> {
    r.validate()?;
    Ok(Json(catalog::update_variant(&s.db, id, &r).await?))
}

async fn list_orders(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<PaginatedResponse<Order>> {
    let page = p.page.unwrap_or(1).max(1); let per_page = p.per_page.unwrap_or(20).clamp(1, 100);
    let (data, total) = orders::list(&s.db, p.status, page, per_page).await?;
    Ok(Json(PaginatedResponse { data, total, page }))
}

async fn get_order(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderDetails> {
    Ok(Json(orders::get(&s.db, id).await?))
}

async fn deliver_order(State(s): State<AppState>, Path(id): Path<i64>) -> ApiResult<Order> {
    let order = orders::mark_delivered(&s.db, id).await?;
    s.events.publish(DomainEvent::OrderDelivered { order_id: id }).await;
    Ok(Json(order))
}

async fn stats(State(s): State<AppState>) -> ApiResult<OrderStats> {
    Ok(Json(orders::stats(&s.db).await?))
}
