//! Search orchestration module
//!
//! Validates queries, fans them out to the entity repositories, and merges
//! the hits into one ranked page.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
