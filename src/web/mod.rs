//! Web server module
//!
//! Serves the REST endpoints and the GraphQL endpoint over one axum router.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::ListResponse;
pub use routes::create_router;
pub use state::AppState;
