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
    models::{WalkDifficultyDto, WalkDifficultyRequest},
    validation::Validate,
};

#[utoipa::path(
    get,
    path = "/walkdifficulties",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All walk difficulties", body = [WalkDifficultyDto]))
)]
pub async fn get_all_walk_difficulties(
    State(state): State<AppState>,
) -> Result<Json<Vec<WalkDifficultyDto>>, ApiError> {
    let difficulties = state.walk_difficulties.get_all().await?;
    Ok(Json(
        difficulties
            .into_iter()
            .map(WalkDifficultyDto::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/walkdifficulties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk difficulty ID")),
    responses(
        (status = 200, description = "Found", body = WalkDifficultyDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_walk_difficulty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalkDifficultyDto>, ApiError> {
    state
        .walk_difficulties
        .get(id)
        .await?
        .map(|difficulty| Json(difficulty.into()))
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    post,
    path = "/walkdifficulties",
    security(("bearer_auth" = [])),
    request_body = WalkDifficultyRequest,
    responses(
        (status = 201, description = "Created", body = WalkDifficultyDto),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn add_walk_difficulty(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<WalkDifficultyRequest>,
) -> Result<Created<WalkDifficultyDto>, ApiError> {
    payload.validate().into_result()?;

    let difficulty = state.walk_difficulties.add(payload.into()).await?;
    tracing::info!(user_id = %user.id, walk_difficulty_id = %difficulty.id, "walk difficulty created");

    Ok(created(
        format!("/walkdifficulties/{}", difficulty.id),
        difficulty.into(),
    ))
}

#[utoipa::path(
    put,
    path = "/walkdifficulties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk difficulty ID")),
    request_body = WalkDifficultyRequest,
    responses(
        (status = 200, description = "Updated", body = WalkDifficultyDto),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_walk_difficulty(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<WalkDifficultyRequest>,
) -> Result<Json<WalkDifficultyDto>, ApiError> {
    payload.validate().into_result()?;

    let difficulty = state
        .walk_difficulties
        .update(id, payload.into())
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(user_id = %user.id, walk_difficulty_id = %id, "walk difficulty updated");

    Ok(Json(difficulty.into()))
}

#[utoipa::path(
    delete,
    path = "/walkdifficulties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Walk difficulty ID")),
    responses(
        (status = 200, description = "Deleted", body = WalkDifficultyDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_walk_difficulty(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalkDifficultyDto>, ApiError> {
    let difficulty = state
        .walk_difficulties
        .delete(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(user_id = %user.id, walk_difficulty_id = %id, "walk difficulty deleted");

    Ok(Json(difficulty.into()))
}
