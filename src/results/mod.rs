//! Search result types and aggregation
//!
//! Defines the tagged result union and the container that merges and
//! paginates hits from several repositories.

mod container;
mod types;

pub use container::ResultContainer;
pub use types::*;
