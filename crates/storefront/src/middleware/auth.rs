//! Authentication extractors.
//!
//! The logged-in user lives in the session under
//! [`keys::CURRENT_USER`](crate::models::session::keys::CURRENT_USER).
//! Handlers declare what they need by taking [`RequireAuth`] or
//! [`RequireAdmin`]; ownership checks against a path id go through
//! [`ensure_access`].

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use dreamy_layers_core::UserId;

use crate::error::{AppError, Result};
use crate::models::{CurrentUser, session::keys};

/// Extractor that requires a logged-in user.
///
/// Rejects with `401 {"message": "Not authorized"}` when the session carries
/// no user.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
///     Json(user)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        current_user(parts).await.map(Self)
    }
}

/// Extractor that requires a logged-in admin.
///
/// Anonymous callers get 401, authenticated non-admins get 403.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = current_user(parts).await?;
        if !user.is_admin() {
            return Err(AppError::AccessDenied("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

async fn current_user(parts: &Parts) -> Result<CurrentUser> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(not_authorized)?;

    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or_else(not_authorized)
}

fn not_authorized() -> AppError {
    AppError::Unauthorized("Not authorized".to_string())
}

/// Allow the owner of `owner`'s resources or any admin.
///
/// # Errors
///
/// Returns `AppError::AccessDenied` for anyone else.
pub fn ensure_access(user: &CurrentUser, owner: UserId) -> Result<()> {
    if user.can_access(owner) {
        Ok(())
    } else {
        Err(AppError::AccessDenied("Access denied".to_string()))
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Drop the logged-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.flush().await
}
