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
    models::{RegionDto, RegionRequest},
    validation::Validate,
};

/// get_all_regions
///
/// [Reader Route] Lists every region.
#[utoipa::path(
    get,
    path = "/regions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All regions", body = [RegionDto]))
)]
pub async fn get_all_regions(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegionDto>>, ApiError> {
    let regions = state.regions.get_all().await?;
    Ok(Json(regions.into_iter().map(RegionDto::from).collect()))
}

/// get_region
///
/// [Reader Route] Retrieves a single region, 404 when the id is unknown.
#[utoipa::path(
    get,
    path = "/regions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Found", body = RegionDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_region(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegionDto>, ApiError> {
    match state.regions.get(id).await? {
        Some(region) => Ok(Json(region.into())),
        None => Err(ApiError::NotFound),
    }
}

/// add_region
///
/// [Writer Route] Creates a region with a server-assigned id.
#[utoipa::path(
    post,
    path = "/regions",
    security(("bearer_auth" = [])),
    request_body = RegionRequest,
    responses(
        (status = 201, description = "Created", body = RegionDto),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn add_region(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegionRequest>,
) -> Result<Created<RegionDto>, ApiError> {
    payload.validate().into_result()?;

    let region = state.regions.add(payload.into()).await?;
    tracing::info!(user_id = %user.id, region_id = %region.id, "region created");

    Ok(created(format!("/regions/{}", region.id), region.into()))
}

/// update_region
///
/// [Writer Route] Replaces every mutable field of an existing region.
#[utoipa::path(
    put,
    path = "/regions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Region ID")),
    request_body = RegionRequest,
    responses(
        (status = 200, description = "Updated", body = RegionDto),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_region(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<RegionRequest>,
) -> Result<Json<RegionDto>, ApiError> {
    payload.validate().into_result()?;

    match state.regions.update(id, payload.into()).await? {
        Some(region) => {
            tracing::info!(user_id = %user.id, region_id = %id, "region updated");
            Ok(Json(region.into()))
        }
        None => Err(ApiError::NotFound),
    }
}

/// delete_region
///
/// [Writer Route] Deletes a region and echoes its last state back.
#[utoipa::path(
    delete,
    path = "/regions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Deleted", body = RegionDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_region(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegionDto>, ApiError> {
    match state.regions.delete(id).await? {
        Some(region) => {
            tracing::info!(user_id = %user.id, region_id = %id, "region deleted");
            Ok(Json(region.into()))
        }
        None => Err(ApiError::NotFound),
    }
}
