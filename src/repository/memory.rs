//! In-memory catalog store

use super::traits::*;
use crate::error::RepositoryResult;
use crate::models::{course_codes, CatalogSnapshot, Course, Degree, Instructor, Major, Minor};
use crate::query::{TextMatcher, DEFAULT_MIN_SIMILARITY};
use async_trait::async_trait;

/// Catalog held entirely in memory, sorted by id.
///
/// Immutable after construction, so it needs no locking and can be shared
/// freely behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    courses: Vec<Course>,
    instructors: Vec<Instructor>,
    /// Instructor search fields with taught courses resolved to display codes
    instructor_index: Vec<SearchEntry>,
    degrees: Vec<Degree>,
    majors: Vec<Major>,
    minors: Vec<Minor>,
    min_similarity: f64,
}

impl MemoryCatalog {
    /// Build a catalog from a snapshot
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let CatalogSnapshot {
            mut courses,
            mut instructors,
            mut degrees,
            mut majors,
            mut minors,
        } = snapshot;

        courses.sort_by(|a, b| a.id.cmp(&b.id));
        instructors.sort_by(|a, b| a.ucinetid.cmp(&b.ucinetid));
        degrees.sort_by(|a, b| a.id.cmp(&b.id));
        majors.sort_by(|a, b| a.id.cmp(&b.id));
        minors.sort_by(|a, b| a.id.cmp(&b.id));

        let codes = course_codes(&courses);
        let instructor_index = instructors
            .iter()
            .map(|instructor| SearchEntry {
                id: instructor.ucinetid.clone(),
                fields: instructor.search_fields(&codes),
            })
            .collect();

        Self {
            courses,
            instructors,
            instructor_index,
            degrees,
            majors,
            minors,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    /// Set the minimum trigram similarity for fuzzy matches
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    fn matcher(&self, text: &str) -> TextMatcher {
        TextMatcher::new(text, self.min_similarity)
    }

    fn instructor(&self, ucinetid: &str) -> Option<&Instructor> {
        self.instructors
            .binary_search_by(|i| i.ucinetid.as_str().cmp(ucinetid))
            .ok()
            .map(|idx| &self.instructors[idx])
    }
}

fn page_of<T: Clone>(records: &[T], limit: usize, offset: usize) -> Page<T> {
    Page {
        items: records.iter().skip(offset).take(limit).cloned().collect(),
        total: records.len(),
    }
}

#[async_trait]
impl CourseRepository for MemoryCatalog {
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Course>> {
        let ranked = rank(&self.matcher(text), self.courses.iter().cloned());
        Ok(paginate(ranked, limit, offset))
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Course>> {
        Ok(self.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn get_many(&self, ids: &[String]) -> RepositoryResult<Vec<Course>> {
        Ok(self
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Course>> {
        Ok(page_of(&self.courses, limit, offset))
    }
}

#[async_trait]
impl InstructorRepository for MemoryCatalog {
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Instructor>> {
        let ranked = rank(&self.matcher(text), self.instructor_index.iter().cloned());
        let page = paginate(ranked, limit, offset);
        let items = page
            .items
            .into_iter()
            .filter_map(|scored| {
                self.instructor(&scored.record.id).map(|instructor| Scored {
                    record: instructor.clone(),
                    score: scored.score,
                })
            })
            .collect();
        Ok(Matches {
            items,
            total: page.total,
        })
    }

    async fn get(&self, ucinetid: &str) -> RepositoryResult<Option<Instructor>> {
        Ok(self.instructor(ucinetid).cloned())
    }

    async fn get_many(&self, ucinetids: &[String]) -> RepositoryResult<Vec<Instructor>> {
        Ok(self
            .instructors
            .iter()
            .filter(|i| ucinetids.contains(&i.ucinetid))
            .cloned()
            .collect())
    }

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Instructor>> {
        Ok(page_of(&self.instructors, limit, offset))
    }
}

#[async_trait]
impl ProgramRepository for MemoryCatalog {
    async fn list_degrees(&self) -> RepositoryResult<Vec<Degree>> {
        Ok(self.degrees.clone())
    }

    async fn get_degree(&self, id: &str) -> RepositoryResult<Option<Degree>> {
        Ok(self.degrees.iter().find(|d| d.id == id).cloned())
    }

    async fn list_majors(&self, degree_id: Option<&str>) -> RepositoryResult<Vec<Major>> {
        Ok(self
            .majors
            .iter()
            .filter(|m| degree_id.map_or(true, |d| m.degree_id == d))
            .cloned()
            .collect())
    }

    async fn get_major(&self, id: &str) -> RepositoryResult<Option<Major>> {
        Ok(self.majors.iter().find(|m| m.id == id).cloned())
    }

    async fn list_minors(&self) -> RepositoryResult<Vec<Minor>> {
        Ok(self.minors.clone())
    }

    async fn get_minor(&self, id: &str) -> RepositoryResult<Option<Minor>> {
        Ok(self.minors.iter().find(|m| m.id == id).cloned())
    }
}
