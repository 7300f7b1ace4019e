//! Cart route handlers.
//!
//! Every route is scoped to the `{user_id}` in the path and open to that
//! user or an admin. Mutations return the full line list.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use dreamy_layers_core::{CartLines, ProductId, UserId};

use crate::error::Result;
use crate::middleware::{RequireAuth, ensure_access};
use crate::models::CurrentUser;
use crate::routes::{AddProductBody, ProductRef, parse_id};
use crate::services::cart::CartService;
use crate::state::AppState;

fn service(state: &AppState) -> CartService<'_> {
    CartService::new(state.repos(), state.product_cache())
}

/// Parse the path owner and check the caller may act on it.
fn owner(user: &CurrentUser, raw: &str) -> Result<UserId> {
    let owner = parse_id(raw, "User")?;
    ensure_access(user, owner)?;
    Ok(owner)
}

/// `GET /api/cart/{user_id}` - `{"items": [...]}`, empty when no cart exists.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let owner = owner(&user, &user_id)?;
    let lines = service(&state).get(owner).await?;
    Ok(Json(json!({ "items": lines })))
}

/// `POST /api/cart/{user_id}` - add one unit of `product`.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
    Json(body): Json<AddProductBody>,
) -> Result<Json<CartLines>> {
    let owner = owner(&user, &user_id)?;
    let product_id = body.product.product_id()?;
    Ok(Json(service(&state).add(owner, product_id).await?))
}

/// `PUT /api/cart/{user_id}/increase`
pub async fn increase(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
    Json(body): Json<ProductRef>,
) -> Result<Json<CartLines>> {
    let owner = owner(&user, &user_id)?;
    let product_id = body.product_id()?;
    Ok(Json(service(&state).increase(owner, product_id).await?))
}

/// `PUT /api/cart/{user_id}/decrease` - never drops a line below 1.
pub async fn decrease(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
    Json(body): Json<ProductRef>,
) -> Result<Json<CartLines>> {
    let owner = owner(&user, &user_id)?;
    let product_id = body.product_id()?;
    Ok(Json(service(&state).decrease(owner, product_id).await?))
}

/// `DELETE /api/cart/{user_id}/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<CartLines>> {
    let owner = owner(&user, &user_id)?;
    let product_id: ProductId = parse_id(&product_id, "Product")?;
    Ok(Json(service(&state).remove(owner, product_id).await?))
}

/// `DELETE /api/cart/{user_id}/all` - `{"items": []}`.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let owner = owner(&user, &user_id)?;
    let lines = service(&state).clear(owner).await?;
    Ok(Json(json!({ "items": lines })))
}

/// `DELETE /api/cart/{user_id}` - removes the cart itself.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    let owner = owner(&user, &user_id)?;
    service(&state).delete(owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
