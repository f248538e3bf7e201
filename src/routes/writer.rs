use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Writer Router Module
///
/// All mutating operations, gated by `auth::require_writer`. The paths overlap with
/// the reader router; axum merges the method routers per path, and each method keeps
/// the gate of the router it was declared in.
pub fn writer_routes() -> Router<AppState> {
    Router::new()
        // --- Regions ---
        .route("/regions", post(handlers::add_region))
        .route(
            "/regions/{id}",
            put(handlers::update_region).delete(handlers::delete_region),
        )
        // --- Walk Difficulties ---
        .route("/walkdifficulties", post(handlers::add_walk_difficulty))
        .route(
            "/walkdifficulties/{id}",
            put(handlers::update_walk_difficulty).delete(handlers::delete_walk_difficulty),
        )
        // --- Walks ---
        // POST/PUT validate `regionId` and `walkDifficultyId` against their repositories.
        .route("/walks", post(handlers::add_walk))
        .route(
            "/walks/{id}",
            put(handlers::update_walk).delete(handlers::delete_walk),
        )
}
