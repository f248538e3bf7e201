use crate::{
    credentials::{CredentialStore, hash_password},
    error::RepositoryError,
    models::NewUser,
};

/// SeedUser
///
/// A development account created at startup when `SEED_DEFAULT_USERS` is enabled.
pub struct SeedUser {
    pub username: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub roles: &'static [&'static str],
}

/// The read-only and read-write accounts used for local development.
pub const DEFAULT_USERS: [SeedUser; 2] = [
    SeedUser {
        username: "readonly@user.com",
        password: "Readonly@user",
        first_name: "Read Only",
        last_name: "User",
        roles: &["reader"],
    },
    SeedUser {
        username: "readwrite@user.com",
        password: "Readwrite@user",
        first_name: "Read Write",
        last_name: "User",
        roles: &["reader", "writer"],
    },
];

/// seed_users
///
/// Hashes and inserts each account unless its username already exists.
/// Returns how many accounts were actually created.
pub async fn seed_users(
    store: &dyn CredentialStore,
    users: &[SeedUser],
) -> Result<usize, RepositoryError> {
    let mut created = 0;
    for seed in users {
        let new_user = NewUser {
            username: seed.username.to_string(),
            email: seed.username.to_string(),
            first_name: seed.first_name.to_string(),
            last_name: seed.last_name.to_string(),
            password_hash: hash_password(seed.password)?,
            roles: seed.roles.iter().map(|r| r.to_string()).collect(),
        };

        if store.insert_user(new_user).await? {
            tracing::info!(username = seed.username, roles = ?seed.roles, "seeded user");
            created += 1;
        }
    }
    Ok(created)
}
