//! Admin account bootstrap.
//!
//! There is no HTTP route that grants the admin role; the first admin is
//! created here and can then manage everything else through the API.

use thiserror::Error;

use dreamy_layers_core::UserRole;
use dreamy_layers_storefront::db::Repositories;
use dreamy_layers_storefront::services::auth::{AuthError, AuthService, Registration};

use super::ConnectError;

/// Errors that can occur while creating an admin.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create an admin account and return its id.
pub async fn create_admin(name: &str, email: &str, password: &str) -> Result<i32, AdminError> {
    let pool = super::connect().await?;
    let repos = Repositories::postgres(&pool);

    let registration = Registration {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    };

    let user = AuthService::new(&repos)
        .register_with_role(&registration, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id.as_i32())
}
