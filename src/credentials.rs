use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use async_trait::async_trait;
use std::{collections::BTreeSet, sync::Arc};
use uuid::Uuid;

use crate::{
    error::RepositoryError,
    models::{NewUser, User},
};

/// AuthError
///
/// Outcome of a failed `authenticate` call. A wrong username and a wrong password
/// both map to `InvalidCredentials`, so callers cannot tell which part failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// RoleResolver
///
/// Answers which role names are assigned to a user right now. A user without any
/// assignment has an empty set, which is not an error.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn roles_for(&self, user_id: Uuid) -> Result<BTreeSet<String>, RepositoryError>;
}

/// CredentialStore
///
/// Holds user accounts and verifies username/password pairs.
///
/// Implementors provide the lookup and seeding primitives; `authenticate` is shared
/// so the matching rules (case-insensitive username, exact password, stripped secret)
/// are identical for every backend.
#[async_trait]
pub trait CredentialStore: RoleResolver {
    /// Looks a user up by username, ignoring case. The returned record still carries
    /// its password hash and must not leave the store.
    async fn find_credentials(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Creates a user with its role assignments. Returns `false` without touching
    /// anything when the username is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<bool, RepositoryError>;

    /// authenticate
    ///
    /// Verifies `password` against the stored hash of `username`. On success the user
    /// is returned with `roles` populated and `password_hash` cleared.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(mut user) = self.find_credentials(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(stored_hash) = user.password_hash.take() else {
            return Err(AuthError::InvalidCredentials);
        };

        // Argon2 is deliberately slow; keep it off the async worker threads.
        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &candidate))
            .await
            .map_err(|e| RepositoryError::PasswordHash(e.to_string()))?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        user.roles = self.roles_for(user.id).await?;
        Ok(user)
    }
}

/// CredentialStoreState
///
/// The shared handle stored in `AppState`.
pub type CredentialStoreState = Arc<dyn CredentialStore>;

/// Hashes `password` into an Argon2id PHC string with a random 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, RepositoryError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))
}

/// Checks `password` against a PHC string. A malformed hash never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
