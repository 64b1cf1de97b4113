//! Query text normalization and relevance scoring
//!
//! Every repository scores its records through [`TextMatcher`], so relevance
//! scores from different entity types are directly comparable:
//! - Exact match on a normalized field: `1.0`
//! - Normalized field contains the query: `0.5 + 0.5 * similarity`, below `1.0`
//! - Otherwise: trigram similarity, kept only above the configured threshold

mod similarity;

pub use similarity::{similarity, trigrams};

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));
static LETTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})(\p{N})").expect("valid regex"));
static DIGIT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{N})(\p{L})").expect("valid regex"));

/// Default minimum trigram similarity for a fuzzy match
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;

/// Highest score a non-exact substring match can reach
const SUBSTRING_CEILING: f64 = 0.999;

/// Normalize text for matching.
///
/// Lowercases, turns punctuation into spaces, splits letter/digit runs
/// (`COMPSCI161` becomes `compsci 161`) and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let text = NON_ALNUM.replace_all(text, " ");
    let text = LETTER_DIGIT.replace_all(&text, "$1 $2");
    let text = DIGIT_LETTER.replace_all(&text, "$1 $2");
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scores record fields against one query
#[derive(Debug, Clone)]
pub struct TextMatcher {
    query: String,
    trigrams: HashSet<String>,
    min_similarity: f64,
}

impl TextMatcher {
    /// Create a matcher for the given raw query text
    pub fn new(text: &str, min_similarity: f64) -> Self {
        let query = normalize(text);
        let trigrams = trigrams(&query);
        Self {
            query,
            trigrams,
            min_similarity,
        }
    }

    /// The normalized query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Check if nothing is left to match after normalization
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Score a single field, `None` when it does not match
    pub fn score_field(&self, field: &str) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let field = normalize(field);
        if field == self.query {
            return Some(1.0);
        }

        let sim = similarity(&self.trigrams, &trigrams(&field));
        if field.contains(&self.query) {
            Some((0.5 + 0.5 * sim).min(SUBSTRING_CEILING))
        } else if sim >= self.min_similarity {
            Some(sim)
        } else {
            None
        }
    }

    /// Best score across a record's fields, `None` when no field matches
    pub fn score<I, S>(&self, fields: I) -> Option<f64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .filter_map(|f| self.score_field(f.as_ref()))
            .max_by(|a, b| a.total_cmp(b))
    }
}
