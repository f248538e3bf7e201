use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::{collections::BTreeSet, fmt};
use uuid::Uuid;

use crate::{
    error::ApiError,
    token::{Claims, TokenIssuer},
};

/// Role
///
/// The permission buckets recognised by the authorization gate. Role claims in a
/// token are compared against `as_str()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Grants every read operation.
    Reader,
    /// Grants every mutating operation.
    Writer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request, built from verified token
/// claims. The gate stores it in the request extensions; handlers receive it as an
/// extractor argument.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub roles: BTreeSet<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.as_str())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.role.into_iter().collect(),
        }
    }
}

/// Extracts the raw token from an `Authorization: Bearer <token>` header. The scheme
/// name matches in any case.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

fn authenticate_headers(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::Unauthorized
    })?;
    Ok(AuthUser::from(claims))
}

/// AuthUser Extractor Implementation
///
/// Reuses the identity placed in the extensions by the gate when present; otherwise
/// verifies the bearer token itself. Rejects with 401 when neither works.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenIssuer: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let tokens = TokenIssuer::from_ref(state);
        authenticate_headers(&tokens, &parts.headers)
    }
}

/// authorize
///
/// The shared authorization gate. Runs before the handler (and before any body is
/// read): a missing or invalid token yields 401, a valid token lacking `required`
/// yields 403. On success the `AuthUser` is attached to the request.
pub async fn authorize(
    tokens: &TokenIssuer,
    required: Role,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_headers(tokens, request.headers())?;

    if !user.has_role(required) {
        tracing::warn!(
            user_id = %user.id,
            required = %required,
            uri = %request.uri(),
            "request rejected: missing role claim"
        );
        return Err(ApiError::Forbidden(required));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Route-layer gate for every read operation.
pub async fn require_reader(
    State(tokens): State<TokenIssuer>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&tokens, Role::Reader, request, next).await
}

/// Route-layer gate for every mutating operation.
pub async fn require_writer(
    State(tokens): State<TokenIssuer>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&tokens, Role::Writer, request, next).await
}
