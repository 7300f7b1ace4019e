//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use dreamy_layers_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::routes::parse_id;
use crate::services::products::ProductService;
use crate::state::AppState;

fn service(state: &AppState) -> ProductService<'_> {
    ProductService::new(state.repos(), state.product_cache())
}

/// `GET /api/products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(service(&state).list().await?))
}

/// `GET /api/products/{id}`
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "Product")?;
    Ok(Json(service(&state).get(id).await?))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<NewProduct>,
) -> Result<impl IntoResponse> {
    let product = service(&state).create(body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "Product")?;
    Ok(Json(service(&state).update(id, patch).await?))
}

/// `DELETE /api/products/{id}`
///
/// Existing cart lines, wishlist entries and orders keep their snapshot.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ProductId = parse_id(&id, "Product")?;
    service(&state).delete(id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}
