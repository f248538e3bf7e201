use axum::{
    Json,
    http::{HeaderName, StatusCode, header},
};

pub mod auth;
pub mod regions;
pub mod walk_difficulties;
pub mod walks;

pub use auth::login;
pub use regions::{add_region, delete_region, get_all_regions, get_region, update_region};
pub use walk_difficulties::{
    add_walk_difficulty, delete_walk_difficulty, get_all_walk_difficulties, get_walk_difficulty,
    update_walk_difficulty,
};
pub use walks::{add_walk, delete_walk, get_all_walks, get_walk, update_walk};

/// Response of every `POST` on a resource collection: 201, a `Location` header
/// naming the new resource, and the stored DTO.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn created<T>(location: String, body: T) -> Created<T> {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(body))
}
