use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;
use models::{Region, Walk, WalkDifficulty};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;
pub mod token;
pub mod validation;

// Routing segregated by required role (public, reader, writer).
pub mod routes;
use routes::{public, reader, writer};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use credentials::{CredentialStore, CredentialStoreState};
pub use error::ApiError;
pub use repository::{
    InMemoryRepository, InMemoryUserStore, PostgresRepository, RegionRepositoryState, Repository,
    WalkDifficultyRepositoryState, WalkRepositoryState,
};
pub use token::TokenIssuer;

/// ApiDoc
///
/// The OpenAPI document for every route, served at `/api-docs/openapi.json` and
/// rendered by the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::regions::get_all_regions, handlers::regions::get_region,
        handlers::regions::add_region, handlers::regions::update_region,
        handlers::regions::delete_region,
        handlers::walk_difficulties::get_all_walk_difficulties,
        handlers::walk_difficulties::get_walk_difficulty,
        handlers::walk_difficulties::add_walk_difficulty,
        handlers::walk_difficulties::update_walk_difficulty,
        handlers::walk_difficulties::delete_walk_difficulty,
        handlers::walks::get_all_walks, handlers::walks::get_walk,
        handlers::walks::add_walk, handlers::walks::update_walk,
        handlers::walks::delete_walk,
    ),
    components(
        schemas(
            models::LoginRequest, models::LoginResponse,
            models::RegionRequest, models::RegionDto,
            models::WalkDifficultyRequest, models::WalkDifficultyDto,
            models::WalkRequest, models::WalkDto,
            error::ErrorResponse, error::FieldError,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "nz-walks", description = "NZ Walks API")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the gated paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single immutable container of every service a request may need. Cloning is
/// cheap: repositories sit behind `Arc<dyn …>` and the issuer holds only key material.
#[derive(Clone)]
pub struct AppState {
    pub regions: RegionRepositoryState,
    pub walks: WalkRepositoryState,
    pub walk_difficulties: WalkDifficultyRepositoryState,
    /// Credential store and role resolver.
    pub users: CredentialStoreState,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Wires every repository handle to one shared Postgres pool.
    pub fn postgres(repo: PostgresRepository, tokens: TokenIssuer) -> Self {
        let repo = Arc::new(repo);
        Self {
            regions: repo.clone(),
            walks: repo.clone(),
            walk_difficulties: repo.clone(),
            users: repo,
            tokens,
        }
    }

    /// Fresh, empty in-memory repositories around the given user store.
    pub fn in_memory(users: Arc<InMemoryUserStore>, tokens: TokenIssuer) -> Self {
        Self {
            regions: Arc::new(InMemoryRepository::<Region>::new()),
            walks: Arc::new(InMemoryRepository::<Walk>::new()),
            walk_difficulties: Arc::new(InMemoryRepository::<WalkDifficulty>::new()),
            users,
            tokens,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(app_state: &AppState) -> TokenIssuer {
        app_state.tokens.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, attaches the role gates, and applies the
/// request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // `route_layer` only runs for matched routes, so unknown paths still 404.
        .merge(
            reader::reader_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_reader,
            )),
        )
        .merge(
            writer::writer_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_writer,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` assigned above so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
