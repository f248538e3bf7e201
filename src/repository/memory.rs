use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Repository;
use crate::{
    credentials::{CredentialStore, RoleResolver},
    error::RepositoryError,
    models::{NewUser, Record, User},
};

/// InMemoryRepository
///
/// A process-local `Repository<T>` backed by a `HashMap`. Used when no `DATABASE_URL`
/// is configured in local mode, and by the test suites.
pub struct InMemoryRepository<T: Record> {
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a repository already holding `records`, keyed by their own ids.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn add(&self, entity: T) -> Result<T, RepositoryError> {
        let stored = entity.with_id(Uuid::new_v4());
        self.records
            .write()
            .await
            .insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, entity: T) -> Result<Option<T>, RepositoryError> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(existing) => {
                *existing = entity.with_id(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        Ok(self.records.write().await.remove(&id))
    }
}

/// InMemoryUserStore
///
/// Credential store and role resolver kept entirely in memory. Mirrors the
/// `users` / `roles` / `users_roles` layout so role resolution goes through the
/// join rows exactly like the Postgres implementation.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UserTables>,
}

#[derive(Default)]
struct UserTables {
    users: Vec<User>,
    // role id -> role name
    roles: HashMap<Uuid, String>,
    // (user id, role id)
    user_roles: Vec<(Uuid, Uuid)>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an existing role to an existing user. Used to model role changes
    /// after a user has been created.
    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) {
        let mut tables = self.inner.write().await;
        let role_id = tables.role_id(role_name);
        if !tables.user_roles.contains(&(user_id, role_id)) {
            tables.user_roles.push((user_id, role_id));
        }
    }
}

impl UserTables {
    fn role_id(&mut self, name: &str) -> Uuid {
        if let Some((id, _)) = self.roles.iter().find(|(_, n)| n.as_str() == name) {
            return *id;
        }
        let id = Uuid::new_v4();
        self.roles.insert(id, name.to_string());
        id
    }
}

#[async_trait]
impl RoleResolver for InMemoryUserStore {
    async fn roles_for(&self, user_id: Uuid) -> Result<BTreeSet<String>, RepositoryError> {
        let tables = self.inner.read().await;
        let role_ids: Vec<Uuid> = tables
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid)
            .collect();

        Ok(role_ids
            .iter()
            .filter_map(|rid| tables.roles.get(rid).cloned())
            .collect())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_credentials(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let wanted = username.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<bool, RepositoryError> {
        let mut tables = self.inner.write().await;
        let wanted = user.username.to_lowercase();
        if tables.users.iter().any(|u| u.username.to_lowercase() == wanted) {
            return Ok(false);
        }

        let id = Uuid::new_v4();
        for role in &user.roles {
            let role_id = tables.role_id(role);
            tables.user_roles.push((id, role_id));
        }
        tables.users.push(User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: Some(user.password_hash),
            roles: BTreeSet::new(),
        });
        Ok(true)
    }
}
