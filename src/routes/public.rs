use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers. Touches no state.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Exchanges credentials for a signed 15-minute access token.
        .route("/login", post(handlers::login))
}
