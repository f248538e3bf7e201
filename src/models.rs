use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Domain Records (Mapped to Database) ---

/// Record
///
/// Implemented by every entity stored behind the generic `Repository<T>` contract.
/// The repository owns identity: `with_id` stamps the server-assigned (or target) id
/// onto an incoming entity before it is stored.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn with_id(self, id: Uuid) -> Self;
}

/// Region
///
/// A geographic region from the `regions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct Region {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    // Square kilometres. Always > 0 once validated.
    pub area: f64,
    pub lat: f64,
    pub long: f64,
    pub population: i64,
}

/// WalkDifficulty
///
/// A difficulty grade (e.g. "Easy", "Medium", "Hard") from `walk_difficulties`.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct WalkDifficulty {
    pub id: Uuid,
    pub code: String,
}

/// Walk
///
/// A walking track from the `walks` table. Both foreign keys must resolve to existing
/// rows when the walk is written.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct Walk {
    pub id: Uuid,
    pub name: String,
    // Kilometres.
    pub length: f64,
    pub region_id: Uuid,
    pub walk_difficulty_id: Uuid,
}

impl Record for Region {
    fn id(&self) -> Uuid {
        self.id
    }

    fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }
}

impl Record for WalkDifficulty {
    fn id(&self) -> Uuid {
        self.id
    }

    fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }
}

impl Record for Walk {
    fn id(&self) -> Uuid {
        self.id
    }

    fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }
}

/// User
///
/// The account record from the `users` table.
///
/// `password_hash` holds an Argon2 PHC string while the record is inside the
/// credential store and is always `None` once the record has been handed out.
/// `roles` is not a column: it is resolved through `users_roles` at authentication time.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    #[sqlx(skip)]
    pub roles: BTreeSet<String>,
}

/// NewUser
///
/// Seed input for `CredentialStore::insert_user`. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "readwrite@user.com")]
    pub username: String,
    pub password: String,
}

/// RegionRequest
///
/// Body of `POST /regions` and `PUT /regions/{id}`. Missing fields deserialize to
/// their zero value so that validation can report every problem at once.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct RegionRequest {
    #[schema(example = "AKL")]
    pub code: String,
    #[schema(example = "Auckland")]
    pub name: String,
    pub area: f64,
    pub lat: f64,
    pub long: f64,
    pub population: i64,
}

/// WalkDifficultyRequest
///
/// Body of `POST /walkdifficulties` and `PUT /walkdifficulties/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct WalkDifficultyRequest {
    #[schema(example = "Medium")]
    pub code: String,
}

/// WalkRequest
///
/// Body of `POST /walks` and `PUT /walks/{id}`. The two ids must reference an existing
/// region and walk difficulty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct WalkRequest {
    pub name: String,
    pub length: f64,
    pub region_id: Uuid,
    pub walk_difficulty_id: Uuid,
}

impl From<RegionRequest> for Region {
    fn from(req: RegionRequest) -> Self {
        Self {
            id: Uuid::nil(),
            code: req.code,
            name: req.name,
            area: req.area,
            lat: req.lat,
            long: req.long,
            population: req.population,
        }
    }
}

impl From<WalkDifficultyRequest> for WalkDifficulty {
    fn from(req: WalkDifficultyRequest) -> Self {
        Self {
            id: Uuid::nil(),
            code: req.code,
        }
    }
}

impl From<WalkRequest> for Walk {
    fn from(req: WalkRequest) -> Self {
        Self {
            id: Uuid::nil(),
            name: req.name,
            length: req.length,
            region_id: req.region_id,
            walk_difficulty_id: req.walk_difficulty_id,
        }
    }
}

// --- Response Payloads (Output Schemas) ---

/// LoginResponse
///
/// Output of a successful `POST /login`: a bearer token valid for 15 minutes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegionDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub area: f64,
    pub lat: f64,
    pub long: f64,
    pub population: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WalkDifficultyDto {
    pub id: Uuid,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WalkDto {
    pub id: Uuid,
    pub name: String,
    pub length: f64,
    pub region_id: Uuid,
    pub walk_difficulty_id: Uuid,
}

impl From<Region> for RegionDto {
    fn from(region: Region) -> Self {
        Self {
            id: region.id,
            code: region.code,
            name: region.name,
            area: region.area,
            lat: region.lat,
            long: region.long,
            population: region.population,
        }
    }
}

impl From<WalkDifficulty> for WalkDifficultyDto {
    fn from(difficulty: WalkDifficulty) -> Self {
        Self {
            id: difficulty.id,
            code: difficulty.code,
        }
    }
}

impl From<Walk> for WalkDto {
    fn from(walk: Walk) -> Self {
        Self {
            id: walk.id,
            name: walk.name,
            length: walk.length,
            region_id: walk.region_id,
            walk_difficulty_id: walk.walk_difficulty_id,
        }
    }
}
