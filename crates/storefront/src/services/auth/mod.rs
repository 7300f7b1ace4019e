//! Authentication and account management.
//!
//! Passwords are hashed with Argon2id. Login checks the password before the
//! blocked flag, so a blocked account is only revealed to someone who knows
//! its password.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use tracing::instrument;

use dreamy_layers_core::{Email, UserId, UserRole};

use crate::db::{RepositoryError, Repositories, UserStore};
use crate::models::{NewUser, User};

/// Minimum name length.
const MIN_NAME_LENGTH: usize = 3;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authentication service.
///
/// Handles registration, login, and admin account management.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(repos: &'a Repositories) -> Self {
        Self {
            users: repos.users.as_ref(),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a short name or password,
    /// `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        self.register_with_role(registration, UserRole::User).await
    }

    /// Register an account with an explicit role.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %role))]
    pub async fn register_with_role(
        &self,
        registration: &Registration,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let name = validate_name(&registration.name)?;
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password)?;

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a missing field or malformed
    /// email, `AuthError::InvalidCredentials` if the email/password is wrong
    /// and `AuthError::Blocked` if the account is blocked.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = validate_login(email, password)?;

        let credentials = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credentials.password_hash)?;

        if credentials.user.blocked {
            tracing::warn!(user_id = %credentials.user.id, "blocked account attempted login");
            return Err(AuthError::Blocked);
        }

        Ok(credentials.user)
    }

    // =========================================================================
    // Account management (admin)
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown id.
    pub async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Block or unblock an account. Takes effect at the user's next login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn set_blocked(&self, id: UserId, blocked: bool) -> Result<User, AuthError> {
        let user = self
            .users
            .set_blocked(id, blocked)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %user.id, blocked, "account block flag changed");
        Ok(user)
    }
}

/// Trim and length-check a display name.
fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "name must be at least {MIN_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Presence and shape checks on login input, before any lookup.
fn validate_login(email: &str, password: &str) -> Result<Email, AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    let email = Email::parse(email)
        .map_err(|_| AuthError::Validation("Enter a valid email".to_string()))?;
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(email)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("sprinkles").unwrap();
        assert!(verify_password("sprinkles", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_name_and_password() {
        assert!(validate_name("  Al ").is_err());
        assert_eq!(validate_name(" Ana ").unwrap(), "Ana");
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_validate_login_messages() {
        let message = |email: &str, password: &str| match validate_login(email, password) {
            Err(AuthError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        };

        assert_eq!(message("", "secret1"), "Email is required");
        assert_eq!(message("   ", ""), "Email is required");
        assert_eq!(message("garbage", "secret1"), "Enter a valid email");
        assert_eq!(message("p@example.com", ""), "Password is required");
        assert_eq!(
            validate_login(" P@Example.com ", "x").unwrap().as_str(),
            "p@example.com"
        );
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repos = Repositories::in_memory();
        let auth = AuthService::new(&repos);

        let user = auth
            .register(&registration("Priya", "Priya@Example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.email.as_str(), "priya@example.com");

        let logged_in = auth.login("priya@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let repos = Repositories::in_memory();
        let auth = AuthService::new(&repos);
        auth.register(&registration("Priya", "p@example.com", "secret1"))
            .await
            .unwrap();

        let err = auth
            .register(&registration("Other", "P@example.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_unknown_and_wrong_password_look_the_same() {
        let repos = Repositories::in_memory();
        let auth = AuthService::new(&repos);
        auth.register(&registration("Priya", "p@example.com", "secret1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.login("nobody@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("p@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_blocked_user_cannot_login() {
        let repos = Repositories::in_memory();
        let auth = AuthService::new(&repos);
        let user = auth
            .register(&registration("Priya", "p@example.com", "secret1"))
            .await
            .unwrap();

        auth.set_blocked(user.id, true).await.unwrap();
        assert!(matches!(
            auth.login("p@example.com", "secret1").await,
            Err(AuthError::Blocked)
        ));

        auth.set_blocked(user.id, false).await.unwrap();
        assert!(auth.login("p@example.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_set_blocked_unknown_user() {
        let repos = Repositories::in_memory();
        let auth = AuthService::new(&repos);
        assert!(matches!(
            auth.set_blocked(UserId::new(42), true).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
