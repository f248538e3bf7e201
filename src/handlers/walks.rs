use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use super::{Created, created};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    extract::ValidJson,
    models::{WalkDto, WalkRequest},
    validation::validate_walk,
};

/// get_all_walks
///
/// [Reader Route] Lists every walk.
#[utoipa::path(
    get,
    path = "/walks",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All walks", body = [WalkDto]))
)]
pub async fn get_all_walks(State(state): State<AppState>) -> Result<Json<Vec<WalkDto>>, ApiError> {
    let walks = state.walks.get_all().await?;
    Ok(Json(walks.into_iter().map(WalkDto::from).collect()))
}

/// get_walk
///
/// [Reader Route] Retrieves a single walk, 404 when the id is unknown.
#[utoipa::path(
    get,
    path = "/walks/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk ID")),
    responses(
        (status = 200, description = "Found", body = WalkDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_walk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalkDto>, ApiError> {
    match state.walks.get(id).await? {
        Some(walk) => Ok(Json(walk.into())),
        None => Err(ApiError::NotFound),
    }
}

/// add_walk
///
/// [Writer Route] Creates a walk.
///
/// `regionId` and `walkDifficultyId` must reference existing records; otherwise the
/// request is rejected with one field error per bad reference and nothing is written.
#[utoipa::path(
    post,
    path = "/walks",
    security(("bearer_auth" = [])),
    request_body = WalkRequest,
    responses(
        (status = 201, description = "Created", body = WalkDto),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn add_walk(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<WalkRequest>,
) -> Result<Created<WalkDto>, ApiError> {
    validate_walk(
        &payload,
        state.regions.as_ref(),
        state.walk_difficulties.as_ref(),
    )
    .await?
    .into_result()?;

    let walk = state.walks.add(payload.into()).await?;
    tracing::info!(user_id = %user.id, walk_id = %walk.id, "walk created");

    Ok(created(format!("/walks/{}", walk.id), walk.into()))
}

/// update_walk
///
/// [Writer Route] Replaces every mutable field of an existing walk, with the same
/// reference checks as `add_walk`. Validation runs before the existence check, so an
/// invalid body for an unknown id is reported as 400.
#[utoipa::path(
    put,
    path = "/walks/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk ID")),
    request_body = WalkRequest,
    responses(
        (status = 200, description = "Updated", body = WalkDto),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_walk(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<WalkRequest>,
) -> Result<Json<WalkDto>, ApiError> {
    validate_walk(
        &payload,
        state.regions.as_ref(),
        state.walk_difficulties.as_ref(),
    )
    .await?
    .into_result()?;

    match state.walks.update(id, payload.into()).await? {
        Some(walk) => {
            tracing::info!(user_id = %user.id, walk_id = %id, "walk updated");
            Ok(Json(walk.into()))
        }
        None => Err(ApiError::NotFound),
    }
}

/// delete_walk
///
/// [Writer Route] Deletes a walk and echoes its last state back.
#[utoipa::path(
    delete,
    path = "/walks/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk ID")),
    responses(
        (status = 200, description = "Deleted", body = WalkDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_walk(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalkDto>, ApiError> {
    match state.walks.delete(id).await? {
        Some(walk) => {
            tracing::info!(user_id = %user.id, walk_id = %id, "walk deleted");
            Ok(Json(walk.into()))
        }
        None => Err(ApiError::NotFound),
    }
}
