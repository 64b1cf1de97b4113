//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let compression = state.settings.server.compression;

    let router = Router::new()
        // Search
        .route("/search", get(handlers::search))
        .route("/graphql", get(handlers::graphiql).post(handlers::graphql))
        // Catalog
        .route("/courses", get(handlers::list_courses))
        .route("/courses/:id", get(handlers::get_course))
        .route("/instructors", get(handlers::list_instructors))
        .route("/instructors/:ucinetid", get(handlers::get_instructor))
        .route("/degrees", get(handlers::list_degrees))
        .route("/degrees/:id", get(handlers::get_degree))
        .route("/majors", get(handlers::list_majors))
        .route("/majors/:id", get(handlers::get_major))
        .route("/minors", get(handlers::list_minors))
        .route("/minors/:id", get(handlers::get_minor))
        // Operational
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    if compression {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}
