/// Router Module Index
///
/// Routes are grouped by the role they require rather than by resource. Each group
/// is wrapped in its own gate layer in `create_router`, so a handler can never be
/// mounted without the role check that belongs to it.

/// Routes open to anonymous callers: health check and login.
pub mod public;

/// Every read operation. Gated on the "reader" role claim.
pub mod reader;

/// Every mutating operation. Gated on the "writer" role claim.
pub mod writer;
