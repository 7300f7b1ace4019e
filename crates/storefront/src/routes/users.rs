//! Account route handlers: registration, session login/logout, and admin
//! account management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use dreamy_layers_core::UserId;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, RequireAuth, clear_current_user, set_current_user};
use crate::models::User;
use crate::routes::parse_id;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}

/// `POST /api/users/register`
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Registration>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.repos()).register(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    ))
}

/// `POST /api/users/login`
///
/// Rotates the session id before storing the user.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.repos())
        .login(&body.email, &body.password)
        .await?;

    session.cycle_id().await.map_err(session_error)?;
    set_current_user(&session, &user.to_current_user())
        .await
        .map_err(session_error)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(json!({ "message": "Login successful", "user": user })))
}

/// `POST /api/users/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await.map_err(session_error)?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/users/me`
///
/// Reads the account fresh so block and role changes are visible.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = AuthService::new(state.repos()).get_user(current.id).await?;
    Ok(Json(user))
}

/// `GET /api/users`
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(AuthService::new(state.repos()).list_users().await?))
}

/// `GET /api/users/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "User")?;
    Ok(Json(AuthService::new(state.repos()).get_user(id).await?))
}

/// `PUT /api/users/block/{id}`
pub async fn block(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "User")?;
    if id == admin.id {
        return Err(AppError::Validation("You cannot block yourself".to_string()));
    }
    Ok(Json(
        AuthService::new(state.repos()).set_blocked(id, true).await?,
    ))
}

/// `PUT /api/users/unblock/{id}`
pub async fn unblock(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "User")?;
    Ok(Json(
        AuthService::new(state.repos()).set_blocked(id, false).await?,
    ))
}
