use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::RepositoryError,
    models::{Record, Region, Walk, WalkDifficulty},
};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryRepository, InMemoryUserStore};
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The generic persistence contract shared by regions, walks and walk difficulties.
/// Handlers only ever see `Arc<dyn Repository<T>>`, so the Postgres and in-memory
/// implementations are interchangeable.
///
/// `None` from `get`, `update` and `delete` means the id does not exist; it is not an
/// error. `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Every stored record. No filtering, no pagination, unspecified order.
    async fn get_all(&self) -> Result<Vec<T>, RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, RepositoryError>;

    /// Stores `entity` under a fresh server-assigned id. Any id on the input is ignored.
    async fn add(&self, entity: T) -> Result<T, RepositoryError>;

    /// Overwrites every mutable field of the record `id` with those of `entity`.
    async fn update(&self, id: Uuid, entity: T) -> Result<Option<T>, RepositoryError>;

    /// Removes the record and returns its last state.
    async fn delete(&self, id: Uuid) -> Result<Option<T>, RepositoryError>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState` for each entity type.
pub type RepositoryState<T> = Arc<dyn Repository<T>>;

pub type RegionRepositoryState = RepositoryState<Region>;
pub type WalkRepositoryState = RepositoryState<Walk>;
pub type WalkDifficultyRepositoryState = RepositoryState<WalkDifficulty>;
