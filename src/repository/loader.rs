//! Loader for opening the configured catalog store

use super::{MemoryCatalog, Repositories, SqliteCatalog};
use crate::config::{Backend, Settings};
use crate::models::CatalogSnapshot;
use anyhow::Result;
use tracing::{info, warn};

/// Opens the catalog store named in settings and applies the seed file
pub struct CatalogLoader;

impl CatalogLoader {
    /// Open the configured store once for the whole process
    pub fn load(settings: &Settings) -> Result<Repositories> {
        let db = &settings.database;
        let min_similarity = settings.search.min_similarity;

        let seed = match &db.seed_path {
            Some(path) => {
                info!("Loading catalog seed from {}", path.display());
                Some(CatalogSnapshot::from_file(path)?)
            }
            None => None,
        };

        let repositories = match db.backend {
            Backend::Sqlite => {
                let catalog = SqliteCatalog::open(&db.path)?.with_min_similarity(min_similarity);
                if let Some(snapshot) = &seed {
                    catalog.import(snapshot)?;
                }
                Repositories::from_catalog(catalog)
            }
            Backend::Memory => {
                let snapshot = seed.unwrap_or_else(|| {
                    warn!("Memory backend without a seed file; catalog is empty");
                    CatalogSnapshot::default()
                });
                info!(
                    "Loaded in-memory catalog: {} courses, {} instructors",
                    snapshot.courses.len(),
                    snapshot.instructors.len()
                );
                Repositories::from_catalog(
                    MemoryCatalog::new(snapshot).with_min_similarity(min_similarity),
                )
            }
        };

        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CourseRepository, InstructorRepository, ProgramRepository};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_load_seeded_sqlite() {
        let mut settings = Settings::default();
        settings.database.path = ":memory:".to_string();
        settings.database.seed_path = Some(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/catalog.json"
        )));

        let repos = CatalogLoader::load(&settings).unwrap();
        let course = repos.courses.get("COMPSCI161").await.unwrap();
        assert!(course.is_some());
        assert!(!repos.programs.list_degrees().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_backend_without_seed_is_empty() {
        let mut settings = Settings::default();
        settings.database.backend = Backend::Memory;

        let repos = CatalogLoader::load(&settings).unwrap();
        let page = repos.instructors.list(10, 0).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
