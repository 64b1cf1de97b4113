//! Entity repositories
//!
//! Defines the repository traits consumed by the search aggregator and the
//! transports, plus two stores implementing them: SQLite and in-memory.

mod loader;
mod memory;
mod sqlite;
mod traits;

pub use loader::CatalogLoader;
pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;
pub use traits::*;

use std::sync::Arc;

/// Handles to every repository, injected into the aggregator and transports
#[derive(Clone)]
pub struct Repositories {
    pub courses: Arc<dyn CourseRepository>,
    pub instructors: Arc<dyn InstructorRepository>,
    pub programs: Arc<dyn ProgramRepository>,
}

impl Repositories {
    /// Use one store for every entity type
    pub fn from_catalog<C>(catalog: C) -> Self
    where
        C: CourseRepository + InstructorRepository + ProgramRepository + 'static,
    {
        let catalog = Arc::new(catalog);
        Self {
            courses: catalog.clone(),
            instructors: catalog.clone(),
            programs: catalog,
        }
    }
}
