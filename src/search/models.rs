//! Search query and related data models

use crate::error::SearchError;
use crate::results::ResultType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bounds applied to `take` when a query is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Page size used when the query gives none
    pub default_take: usize,
    /// Largest page size; bigger requests are clamped
    pub max_take: usize,
}

impl SearchLimits {
    /// Clamp requested paging into bounds, returning `(skip, take)`.
    ///
    /// Negative `skip` becomes 0; `take` defaults to `default_take` and is
    /// clamped to `[1, max_take]`.
    pub fn clamp_page(&self, skip: Option<i64>, take: Option<i64>) -> (usize, usize) {
        let max_take = self.max_take.max(1);
        let take = match take {
            Some(take) => take.clamp(1, max_take as i64) as usize,
            None => self.default_take.clamp(1, max_take),
        };
        (skip.unwrap_or(0).max(0) as usize, take)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_take: 10,
            max_take: 50,
        }
    }
}

/// Search request as received from a transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text matched against courses and instructors
    pub query_text: String,
    /// Entity types to search; empty means all
    pub result_types: Vec<ResultType>,
    /// Number of ranked hits to skip; negative values are clamped to 0
    pub skip: i64,
    /// Page size; `None` uses the default, out-of-range values are clamped
    pub take: Option<i64>,
}

impl SearchQuery {
    /// Create a query over every type with default paging
    pub fn simple(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            result_types: vec![],
            skip: 0,
            take: None,
        }
    }

    /// Restrict the query to the given types
    pub fn with_types(mut self, types: &[ResultType]) -> Self {
        self.result_types = types.to_vec();
        self
    }

    /// Set skip and take
    pub fn with_page(mut self, skip: i64, take: i64) -> Self {
        self.skip = skip;
        self.take = Some(take);
        self
    }

    /// Check the query text and clamp paging into bounds
    pub fn validate(&self, limits: &SearchLimits) -> Result<ValidatedQuery, SearchError> {
        let text = self.query_text.trim();
        if text.is_empty() {
            return Err(SearchError::validation("queryText must not be empty"));
        }

        let types: BTreeSet<ResultType> = if self.result_types.is_empty() {
            ResultType::ALL.into_iter().collect()
        } else {
            self.result_types.iter().copied().collect()
        };

        let (skip, take) = limits.clamp_page(Some(self.skip), self.take);

        Ok(ValidatedQuery {
            text: text.to_string(),
            types,
            skip,
            take,
        })
    }
}

/// Query with checked text and paging already clamped into bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// Trimmed, non-empty query text
    pub text: String,
    pub types: BTreeSet<ResultType>,
    pub skip: usize,
    pub take: usize,
}

impl ValidatedQuery {
    /// Check if a type was requested
    pub fn wants(&self, result_type: ResultType) -> bool {
        self.types.contains(&result_type)
    }

    /// Number of top hits each repository must return to fill the page
    pub fn window(&self) -> usize {
        self.skip.saturating_add(self.take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query_defaults() {
        let query = SearchQuery::simple("COMPSCI 161")
            .validate(&SearchLimits::default())
            .unwrap();
        assert_eq!(query.text, "COMPSCI 161");
        assert_eq!(query.skip, 0);
        assert_eq!(query.take, 10);
        assert!(query.wants(ResultType::Course));
        assert!(query.wants(ResultType::Instructor));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err = SearchQuery::simple("   \t")
            .validate(&SearchLimits::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }

    #[test]
    fn test_paging_is_clamped() {
        let limits = SearchLimits {
            default_take: 10,
            max_take: 50,
        };

        let query = SearchQuery::simple("x").with_page(-5, 500).validate(&limits).unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.take, 50);

        let query = SearchQuery::simple("x").with_page(3, 0).validate(&limits).unwrap();
        assert_eq!(query.skip, 3);
        assert_eq!(query.take, 1);
        assert_eq!(query.window(), 4);
    }

    #[test]
    fn test_type_restriction() {
        let query = SearchQuery::simple("x")
            .with_types(&[ResultType::Course, ResultType::Course])
            .validate(&SearchLimits::default())
            .unwrap();
        assert_eq!(query.types.len(), 1);
        assert!(!query.wants(ResultType::Instructor));
    }
}
