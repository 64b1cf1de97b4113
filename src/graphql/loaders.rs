use crate::error::RepositoryError;
use crate::models::{Course, Instructor};
use crate::repository::{CourseRepository, InstructorRepository};
use async_graphql::dataloader::{DataLoader, Loader};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// DataLoader for batching course lookups
pub struct CourseLoader {
    courses: Arc<dyn CourseRepository>,
}

impl CourseLoader {
    pub fn new(courses: Arc<dyn CourseRepository>) -> DataLoader<Self> {
        DataLoader::new(Self { courses }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<String> for CourseLoader {
    type Value = Course;
    type Error = RepositoryError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let courses = self.courses.get_many(keys).await?;
        Ok(courses.into_iter().map(|c| (c.id.clone(), c)).collect())
    }
}

/// DataLoader for batching instructor lookups
pub struct InstructorLoader {
    instructors: Arc<dyn InstructorRepository>,
}

impl InstructorLoader {
    pub fn new(instructors: Arc<dyn InstructorRepository>) -> DataLoader<Self> {
        DataLoader::new(Self { instructors }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<String> for InstructorLoader {
    type Value = Instructor;
    type Error = RepositoryError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let instructors = self.instructors.get_many(keys).await?;
        Ok(instructors
            .into_iter()
            .map(|i| (i.ucinetid.clone(), i))
            .collect())
    }
}

/// Load records for `ids`, keeping the order of `ids` and skipping unknown ones
pub async fn load_ordered<L>(
    loader: &DataLoader<L>,
    ids: &[String],
) -> Result<Vec<L::Value>, L::Error>
where
    L: Loader<String>,
{
    let mut found = loader.load_many(ids.iter().cloned()).await?;
    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}
