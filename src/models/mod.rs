//! Catalog entity models
//!
//! Plain records loaded from the catalog store. They carry no behavior beyond
//! identity and the list of fields exposed to text search.

mod course;
mod instructor;
mod program;

pub use course::Course;
pub use instructor::Instructor;
pub use program::{Degree, Division, Major, Minor};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entity that can be matched by free-text search
pub trait Searchable {
    /// Stable identifier, used as the final ranking tie-break
    fn id(&self) -> &str;

    /// Fields scored against the query text
    fn search_fields(&self) -> Vec<String>;
}

/// Map course ids to display codes, for scoring instructors by the courses they teach
pub fn course_codes<'a, I>(courses: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a Course>,
{
    courses
        .into_iter()
        .map(|course| (course.id.clone(), course.display_code()))
        .collect()
}

/// Full catalog snapshot, used for seeding a store from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub degrees: Vec<Degree>,
    pub majors: Vec<Major>,
    pub minors: Vec<Minor>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Load a snapshot from a JSON file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}
