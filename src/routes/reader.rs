use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Reader Router Module
///
/// All read operations. `create_router` layers `auth::require_reader` over this
/// router, so every request here has already presented a valid token carrying the
/// "reader" role before the handler (or its path extraction) runs.
pub fn reader_routes() -> Router<AppState> {
    Router::new()
        .route("/regions", get(handlers::get_all_regions))
        .route("/regions/{id}", get(handlers::get_region))
        .route("/walkdifficulties", get(handlers::get_all_walk_difficulties))
        .route("/walkdifficulties/{id}", get(handlers::get_walk_difficulty))
        .route("/walks", get(handlers::get_all_walks))
        .route("/walks/{id}", get(handlers::get_walk))
}
