//! Repository traits and result types

use crate::error::RepositoryResult;
use crate::models::{Course, Degree, Instructor, Major, Minor, Searchable};
use crate::query::TextMatcher;
use async_trait::async_trait;
use std::cmp::Ordering;

/// A record together with its relevance to the query text
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub record: T,
    pub score: f64,
}

/// One page of text-search matches
#[derive(Debug, Clone, PartialEq)]
pub struct Matches<T> {
    /// Matches ordered by score descending, then id ascending
    pub items: Vec<Scored<T>>,
    /// Number of matches before pagination
    pub total: usize,
}

impl<T> Matches<T> {
    pub fn empty() -> Self {
        Self {
            items: vec![],
            total: 0,
        }
    }
}

impl<T> Default for Matches<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// One page of records in id order
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of records before pagination
    pub total: usize,
}

/// Id and searchable fields of a record, ranked in place of the full record
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    pub id: String,
    pub fields: Vec<String>,
}

impl Searchable for SearchEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<String> {
        self.fields.clone()
    }
}

/// Read access to courses
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Text search over course codes and titles
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Course>>;

    async fn get(&self, id: &str) -> RepositoryResult<Option<Course>>;

    /// Fetch several courses at once; unknown ids are skipped
    async fn get_many(&self, ids: &[String]) -> RepositoryResult<Vec<Course>>;

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Course>>;
}

/// Read access to instructors
#[async_trait]
pub trait InstructorRepository: Send + Sync {
    /// Text search over instructor names, ucinetids and taught courses
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Instructor>>;

    async fn get(&self, ucinetid: &str) -> RepositoryResult<Option<Instructor>>;

    /// Fetch several instructors at once; unknown ids are skipped
    async fn get_many(&self, ucinetids: &[String]) -> RepositoryResult<Vec<Instructor>>;

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Instructor>>;
}

/// Read access to degrees, majors and minors
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    async fn list_degrees(&self) -> RepositoryResult<Vec<Degree>>;

    async fn get_degree(&self, id: &str) -> RepositoryResult<Option<Degree>>;

    /// All majors, or only those leading to `degree_id`
    async fn list_majors(&self, degree_id: Option<&str>) -> RepositoryResult<Vec<Major>>;

    async fn get_major(&self, id: &str) -> RepositoryResult<Option<Major>>;

    async fn list_minors(&self) -> RepositoryResult<Vec<Minor>>;

    async fn get_minor(&self, id: &str) -> RepositoryResult<Option<Minor>>;
}

/// Order two scored records: higher score first, then lower id
pub fn compare_scored<T: Searchable>(a: &Scored<T>, b: &Scored<T>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.record.id().cmp(b.record.id()))
}

/// Score records against the matcher and return the matching ones in rank order
pub fn rank<T, I>(matcher: &TextMatcher, records: I) -> Vec<Scored<T>>
where
    T: Searchable,
    I: IntoIterator<Item = T>,
{
    let mut ranked: Vec<Scored<T>> = records
        .into_iter()
        .filter_map(|record| {
            matcher
                .score(record.search_fields())
                .map(|score| Scored { record, score })
        })
        .collect();
    ranked.sort_by(compare_scored);
    ranked
}

/// Cut one page out of a full ranking
pub fn paginate<T>(ranked: Vec<Scored<T>>, limit: usize, offset: usize) -> Matches<T> {
    let total = ranked.len();
    let items = ranked.into_iter().skip(offset).take(limit).collect();
    Matches { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DEFAULT_MIN_SIMILARITY;

    #[test]
    fn test_rank_orders_by_score_then_id() {
        let matcher = TextMatcher::new("COMPSCI 161", DEFAULT_MIN_SIMILARITY);
        let courses = vec![
            Course::new("COMPSCI", "161L", "Algorithms Lab"),
            Course::new("COMPSCI", "161", "Design and Analysis of Algorithms"),
            Course::new("MATH", "2A", "Calculus"),
        ];

        let ranked = rank(&matcher, courses);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record.id, "COMPSCI161");
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].record.id, "COMPSCI161L");
    }

    #[test]
    fn test_paginate_keeps_total() {
        let matcher = TextMatcher::new("intro", DEFAULT_MIN_SIMILARITY);
        let courses = (1..=5)
            .map(|n| Course::new("DEPT", n.to_string(), "Intro"))
            .collect::<Vec<_>>();

        let page = paginate(rank(&matcher, courses), 2, 3);
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].record.id, "DEPT4");
    }
}
