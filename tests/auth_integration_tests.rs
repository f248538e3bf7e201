use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use nz_walks_api::{
    AppState,
    auth::{AuthUser, Role, bearer_token},
    config::JwtConfig,
    credentials::{CredentialStore, RoleResolver},
    error::{ApiError, RepositoryError},
    extract::ValidJson,
    handlers,
    models::{LoginRequest, NewUser, Region, User, Walk, WalkDifficulty},
    repository::{InMemoryRepository, InMemoryUserStore},
    token::TokenIssuer,
};
use std::{collections::BTreeSet, sync::Arc};
use uuid::Uuid;

// --- Mock Credential Store ---

/// A store whose backend is always down.
struct FailingCredentialStore;

#[async_trait]
impl RoleResolver for FailingCredentialStore {
    async fn roles_for(&self, _user_id: Uuid) -> Result<BTreeSet<String>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn find_credentials(&self, _username: &str) -> Result<Option<User>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn insert_user(&self, _user: NewUser) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}

// --- Helper Functions ---

const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_app_state() -> AppState {
    let tokens = TokenIssuer::new(&JwtConfig::default()).unwrap();
    AppState::in_memory(Arc::new(InMemoryUserStore::new()), tokens)
}

fn create_token(state: &AppState, roles: &[&str], issued_at: chrono::DateTime<Utc>) -> String {
    let user = User {
        id: TEST_USER_ID,
        username: "test@example.com".to_string(),
        email: "test@example.com".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        password_hash: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
    };
    state.tokens.issue_token_at(&user, issued_at).unwrap()
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri, token: Option<&str>) -> Parts {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let app_state = create_app_state();
    let token = create_token(&app_state, &["reader", "writer"], Utc::now());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some(&token));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.email, "test@example.com");
    assert!(user.has_role(Role::Reader));
    assert!(user.has_role(Role::Writer));
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state();

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), None);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let err = auth_user.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let app_state = create_app_state();
    // Issued 15 minutes and 1 second ago: expired one second ago, no leeway.
    let token = create_token(
        &app_state,
        &["reader"],
        Utc::now() - Duration::seconds(901),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some(&token));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_tampered_jwt() {
    let app_state = create_app_state();
    let token = create_token(&app_state, &["reader"], Utc::now());
    let tampered = format!("{}x", token);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some(&tampered));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_extractor_prefers_identity_from_gate() {
    let app_state = create_app_state();
    let gate_user = AuthUser {
        id: Uuid::new_v4(),
        email: "gate@example.com".to_string(),
        roles: BTreeSet::from(["reader".to_string()]),
    };

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), None);
    parts.extensions.insert(gate_user.clone());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap(), gate_user);
}

#[tokio::test]
async fn test_bearer_token_parsing() {
    let parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some("abc.def.ghi"));
    assert_eq!(bearer_token(&parts.headers), Some("abc.def.ghi"));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), None);
    parts
        .headers
        .insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
    assert_eq!(bearer_token(&parts.headers), None);

    parts
        .headers
        .insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
    assert_eq!(bearer_token(&parts.headers), None);

    // The scheme name is case-insensitive.
    parts
        .headers
        .insert(header::AUTHORIZATION, "bearer abc.def.ghi".parse().unwrap());
    assert_eq!(bearer_token(&parts.headers), Some("abc.def.ghi"));

    parts
        .headers
        .insert(header::AUTHORIZATION, "BEARER abc.def.ghi".parse().unwrap());
    assert_eq!(bearer_token(&parts.headers), Some("abc.def.ghi"));

    parts
        .headers
        .insert(header::AUTHORIZATION, "Bearerabc.def.ghi".parse().unwrap());
    assert_eq!(bearer_token(&parts.headers), None);
}

#[tokio::test]
async fn test_login_with_store_outage_is_internal_error() {
    let tokens = TokenIssuer::new(&JwtConfig::default()).unwrap();
    let app_state = AppState {
        regions: Arc::new(InMemoryRepository::<Region>::new()),
        walks: Arc::new(InMemoryRepository::<Walk>::new()),
        walk_difficulties: Arc::new(InMemoryRepository::<WalkDifficulty>::new()),
        users: Arc::new(FailingCredentialStore),
        tokens,
    };

    let result = handlers::login(
        State(app_state),
        ValidJson(LoginRequest {
            username: "readonly@user.com".to_string(),
            password: "Readonly@user".to_string(),
        }),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::Internal));
    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_forbidden_names_the_missing_role() {
    let response = ApiError::Forbidden(Role::Writer).into_response();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "The `writer` role is required for this operation.");
}
