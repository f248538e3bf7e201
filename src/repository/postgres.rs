use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::Repository;
use crate::{
    credentials::{CredentialStore, RoleResolver},
    error::RepositoryError,
    models::{NewUser, Region, User, Walk, WalkDifficulty},
};

/// PostgresRepository
///
/// The PostgreSQL implementation of every persistence contract: one
/// `Repository<T>` per entity type plus the credential store and role resolver.
/// A single pooled handle is shared and cast to each trait object in `AppState`.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

// --- REGIONS ---

#[async_trait]
impl Repository<Region> for PostgresRepository {
    async fn get_all(&self) -> Result<Vec<Region>, RepositoryError> {
        let regions = sqlx::query_as::<_, Region>(
            "SELECT id, code, name, area, lat, long, population FROM regions",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(regions)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Region>, RepositoryError> {
        let region = sqlx::query_as::<_, Region>(
            "SELECT id, code, name, area, lat, long, population FROM regions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(region)
    }

    async fn add(&self, region: Region) -> Result<Region, RepositoryError> {
        let region = sqlx::query_as::<_, Region>(
            r#"
            INSERT INTO regions (id, code, name, area, lat, long, population)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, code, name, area, lat, long, population
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(region.code)
        .bind(region.name)
        .bind(region.area)
        .bind(region.lat)
        .bind(region.long)
        .bind(region.population)
        .fetch_one(&self.pool)
        .await?;
        Ok(region)
    }

    async fn update(&self, id: Uuid, region: Region) -> Result<Option<Region>, RepositoryError> {
        let region = sqlx::query_as::<_, Region>(
            r#"
            UPDATE regions
            SET code = $2, name = $3, area = $4, lat = $5, long = $6, population = $7
            WHERE id = $1
            RETURNING id, code, name, area, lat, long, population
            "#,
        )
        .bind(id)
        .bind(region.code)
        .bind(region.name)
        .bind(region.area)
        .bind(region.lat)
        .bind(region.long)
        .bind(region.population)
        .fetch_optional(&self.pool)
        .await?;
        Ok(region)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Region>, RepositoryError> {
        let region = sqlx::query_as::<_, Region>(
            "DELETE FROM regions WHERE id = $1 RETURNING id, code, name, area, lat, long, population",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(region)
    }
}

// --- WALK DIFFICULTIES ---

#[async_trait]
impl Repository<WalkDifficulty> for PostgresRepository {
    async fn get_all(&self) -> Result<Vec<WalkDifficulty>, RepositoryError> {
        let difficulties =
            sqlx::query_as::<_, WalkDifficulty>("SELECT id, code FROM walk_difficulties")
                .fetch_all(&self.pool)
                .await?;
        Ok(difficulties)
    }

    async fn get(&self, id: Uuid) -> Result<Option<WalkDifficulty>, RepositoryError> {
        let difficulty = sqlx::query_as::<_, WalkDifficulty>(
            "SELECT id, code FROM walk_difficulties WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(difficulty)
    }

    async fn add(&self, difficulty: WalkDifficulty) -> Result<WalkDifficulty, RepositoryError> {
        let difficulty = sqlx::query_as::<_, WalkDifficulty>(
            "INSERT INTO walk_difficulties (id, code) VALUES ($1, $2) RETURNING id, code",
        )
        .bind(Uuid::new_v4())
        .bind(difficulty.code)
        .fetch_one(&self.pool)
        .await?;
        Ok(difficulty)
    }

    async fn update(
        &self,
        id: Uuid,
        difficulty: WalkDifficulty,
    ) -> Result<Option<WalkDifficulty>, RepositoryError> {
        let difficulty = sqlx::query_as::<_, WalkDifficulty>(
            "UPDATE walk_difficulties SET code = $2 WHERE id = $1 RETURNING id, code",
        )
        .bind(id)
        .bind(difficulty.code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(difficulty)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<WalkDifficulty>, RepositoryError> {
        let difficulty = sqlx::query_as::<_, WalkDifficulty>(
            "DELETE FROM walk_difficulties WHERE id = $1 RETURNING id, code",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(difficulty)
    }
}

// --- WALKS ---

#[async_trait]
impl Repository<Walk> for PostgresRepository {
    async fn get_all(&self) -> Result<Vec<Walk>, RepositoryError> {
        let walks = sqlx::query_as::<_, Walk>(
            "SELECT id, name, length, region_id, walk_difficulty_id FROM walks",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(walks)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Walk>, RepositoryError> {
        let walk = sqlx::query_as::<_, Walk>(
            "SELECT id, name, length, region_id, walk_difficulty_id FROM walks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(walk)
    }

    async fn add(&self, walk: Walk) -> Result<Walk, RepositoryError> {
        let walk = sqlx::query_as::<_, Walk>(
            r#"
            INSERT INTO walks (id, name, length, region_id, walk_difficulty_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, length, region_id, walk_difficulty_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(walk.name)
        .bind(walk.length)
        .bind(walk.region_id)
        .bind(walk.walk_difficulty_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(walk)
    }

    async fn update(&self, id: Uuid, walk: Walk) -> Result<Option<Walk>, RepositoryError> {
        let walk = sqlx::query_as::<_, Walk>(
            r#"
            UPDATE walks
            SET name = $2, length = $3, region_id = $4, walk_difficulty_id = $5
            WHERE id = $1
            RETURNING id, name, length, region_id, walk_difficulty_id
            "#,
        )
        .bind(id)
        .bind(walk.name)
        .bind(walk.length)
        .bind(walk.region_id)
        .bind(walk.walk_difficulty_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(walk)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Walk>, RepositoryError> {
        let walk = sqlx::query_as::<_, Walk>(
            "DELETE FROM walks WHERE id = $1 RETURNING id, name, length, region_id, walk_difficulty_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(walk)
    }
}

// --- USERS & ROLES ---

#[async_trait]
impl RoleResolver for PostgresRepository {
    /// roles_for
    ///
    /// Two plain reads over the join table: the user's role ids first, then the names
    /// of those roles.
    async fn roles_for(&self, user_id: Uuid) -> Result<BTreeSet<String>, RepositoryError> {
        let role_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT role_id FROM users_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        if role_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM roles WHERE id = ANY($1)")
            .bind(&role_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(names.into_iter().collect())
    }
}

#[async_trait]
impl CredentialStore for PostgresRepository {
    async fn find_credentials(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash
            FROM users
            WHERE lower(username) = lower($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// insert_user
    ///
    /// Inserts the user and its role links in one transaction. Roles that do not
    /// exist yet are created on the fly.
    async fn insert_user(&self, user: NewUser) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = inserted else {
            tx.rollback().await?;
            return Ok(false);
        };

        for role in &user.roles {
            sqlx::query(
                "INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(role)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO users_roles (id, user_id, role_id)
                SELECT $1, $2, id FROM roles WHERE name = $3
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(role)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
