//! Result type definitions

use crate::models::{Course, Instructor};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Entity type a search can return.
///
/// Declaration order is the tie-break order between types: courses rank
/// ahead of instructors when scores are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Course,
    Instructor,
}

impl ResultType {
    pub const ALL: [ResultType; 2] = [ResultType::Course, ResultType::Instructor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Instructor => "instructor",
        }
    }

    /// Parse a type name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "course" | "courses" => Some(Self::Course),
            "instructor" | "instructors" => Some(Self::Instructor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A course hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResult {
    pub score: f64,
    #[serde(flatten)]
    pub course: Course,
}

/// An instructor hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorResult {
    pub score: f64,
    #[serde(flatten)]
    pub instructor: Instructor,
}

/// One search hit, tagged with its entity type.
///
/// Serializes with a `"type"` discriminant next to the entity's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResultItem {
    Course(CourseResult),
    Instructor(InstructorResult),
}

impl SearchResultItem {
    pub fn result_type(&self) -> ResultType {
        match self {
            Self::Course(_) => ResultType::Course,
            Self::Instructor(_) => ResultType::Instructor,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Self::Course(r) => r.score,
            Self::Instructor(r) => r.score,
        }
    }

    /// Identifier of the wrapped entity
    pub fn id(&self) -> &str {
        match self {
            Self::Course(r) => &r.course.id,
            Self::Instructor(r) => &r.instructor.ucinetid,
        }
    }

    /// Ranking order: score descending, then result type, then id ascending
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score()
            .total_cmp(&self.score())
            .then_with(|| self.result_type().cmp(&other.result_type()))
            .then_with(|| self.id().cmp(other.id()))
    }
}

/// A page of merged search hits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<SearchResultItem>,
    /// Matches across all requested types before pagination
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant_serialization() {
        let item = SearchResultItem::Instructor(InstructorResult {
            score: 0.75,
            instructor: Instructor::new("pattis", "Richard Pattis"),
        });

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "instructor");
        assert_eq!(json["ucinetid"], "pattis");
        assert_eq!(json["score"], 0.75);

        let back: SearchResultItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_rank_cmp_tie_breaks() {
        let course = SearchResultItem::Course(CourseResult {
            score: 1.0,
            course: Course::new("COMPSCI", "161", "Algorithms"),
        });
        let instructor = SearchResultItem::Instructor(InstructorResult {
            score: 1.0,
            instructor: Instructor::new("aaa", "A"),
        });
        let better = SearchResultItem::Instructor(InstructorResult {
            score: 1.0 + f64::EPSILON,
            instructor: Instructor::new("zzz", "Z"),
        });

        assert_eq!(course.rank_cmp(&instructor), Ordering::Less);
        assert_eq!(better.rank_cmp(&course), Ordering::Less);
    }

    #[test]
    fn test_parse_result_type() {
        assert_eq!(ResultType::parse("COURSE"), Some(ResultType::Course));
        assert_eq!(ResultType::parse("instructors"), Some(ResultType::Instructor));
        assert_eq!(ResultType::parse("degree"), None);
    }
}
