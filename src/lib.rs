//! Catalog API: course, instructor and degree-program data over REST and GraphQL
//!
//! A single search endpoint fans a text query out to the course and instructor
//! repositories concurrently and merges the hits into one ranked, paginated
//! list.

pub mod cache;
pub mod config;
pub mod error;
pub mod graphql;
pub mod metrics;
pub mod models;
pub mod query;
pub mod repository;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::{RepositoryError, SearchError};
pub use results::{ResultContainer, SearchResponse, SearchResultItem};
pub use search::{Search, SearchQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
