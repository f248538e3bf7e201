use axum::{Json, extract::State};

use crate::{
    AppState,
    credentials::AuthError,
    error::{ApiError, ErrorResponse},
    extract::ValidJson,
    models::{LoginRequest, LoginResponse},
    validation::Validate,
};

/// login
///
/// [Public Route] Exchanges a username/password pair for a 15-minute bearer token.
///
/// Bad credentials get one generic 400 whether the username or the password was wrong.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials or missing fields", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate().into_result()?;

    let user = match state
        .users
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("login rejected: invalid credentials");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.tokens.issue_token(&user)?;
    tracing::info!(user_id = %user.id, roles = ?user.roles, "token issued");

    Ok(Json(LoginResponse { token }))
}
