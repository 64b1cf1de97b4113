//! Result container for merging and paginating hits from several repositories

use super::types::*;
use crate::models::{Course, Instructor};
use crate::repository::Matches;

/// Collects tagged hits from each repository, then ranks them as one list.
///
/// Filled only after every repository query has finished, so it is a plain
/// owned value with no interior locking.
#[derive(Debug, Clone, Default)]
pub struct ResultContainer {
    /// Tagged hits in arrival order
    items: Vec<SearchResultItem>,
    /// Sum of unpaginated match counts per source
    total_count: usize,
}

impl ResultContainer {
    /// Create a new empty result container
    pub fn new() -> Self {
        Self::default()
    }

    /// Add course matches, tagging each as a course hit
    pub fn add_courses(&mut self, matches: Matches<Course>) {
        self.total_count += matches.total;
        self.items.extend(matches.items.into_iter().map(|scored| {
            SearchResultItem::Course(CourseResult {
                score: scored.score,
                course: scored.record,
            })
        }));
    }

    /// Add instructor matches, tagging each as an instructor hit
    pub fn add_instructors(&mut self, matches: Matches<Instructor>) {
        self.total_count += matches.total;
        self.items.extend(matches.items.into_iter().map(|scored| {
            SearchResultItem::Instructor(InstructorResult {
                score: scored.score,
                instructor: scored.record,
            })
        }));
    }

    /// Get all hits in rank order
    pub fn get_ordered_results(&self) -> Vec<SearchResultItem> {
        let mut results = self.items.clone();
        results.sort_by(SearchResultItem::rank_cmp);
        results
    }

    /// Get the ranked hits in `[skip, skip + take)`
    pub fn get_results_page(&self, skip: usize, take: usize) -> Vec<SearchResultItem> {
        self.get_ordered_results()
            .into_iter()
            .skip(skip)
            .take(take)
            .collect()
    }

    /// Consume the container into one response page
    pub fn into_response(self, skip: usize, take: usize) -> SearchResponse {
        let items = self.get_results_page(skip, take);
        SearchResponse {
            items,
            total_count: self.total_count,
        }
    }

    /// Total matches across sources before pagination
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of hits held
    pub fn result_count(&self) -> usize {
        self.items.len()
    }
}
