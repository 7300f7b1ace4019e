//! Wishlist route handlers. Same access rules as the cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use dreamy_layers_core::{ProductId, UserId, WishlistItems};

use crate::error::Result;
use crate::middleware::{RequireAuth, ensure_access};
use crate::routes::{AddProductBody, parse_id};
use crate::services::wishlist::WishlistService;
use crate::state::AppState;

fn service(state: &AppState) -> WishlistService<'_> {
    WishlistService::new(state.repos(), state.product_cache())
}

/// `GET /api/wishlist/{user_id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let owner: UserId = parse_id(&user_id, "User")?;
    ensure_access(&user, owner)?;
    let items = service(&state).get(owner).await?;
    Ok(Json(json!({ "items": items })))
}

/// `POST /api/wishlist/{user_id}`
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
    Json(body): Json<AddProductBody>,
) -> Result<Json<WishlistItems>> {
    let owner: UserId = parse_id(&user_id, "User")?;
    ensure_access(&user, owner)?;
    let product_id = body.product.product_id()?;
    Ok(Json(service(&state).add(owner, product_id).await?))
}

/// `DELETE /api/wishlist/{user_id}/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<WishlistItems>> {
    let owner: UserId = parse_id(&user_id, "User")?;
    ensure_access(&user, owner)?;
    let product_id: ProductId = parse_id(&product_id, "Product")?;
    Ok(Json(service(&state).remove(owner, product_id).await?))
}
