use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An instructor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// Campus network id, unique per instructor
    pub ucinetid: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub schools: Vec<String>,
    /// Ids of courses this instructor has taught (e.g. `COMPSCI161`)
    #[serde(default)]
    pub course_ids: Vec<String>,
}

impl Instructor {
    pub fn new(ucinetid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ucinetid: ucinetid.into(),
            name: name.into(),
            title: String::new(),
            email: String::new(),
            department: String::new(),
            schools: vec![],
            course_ids: vec![],
        }
    }

    pub fn with_courses(mut self, ids: &[&str]) -> Self {
        self.course_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Fields scored against the query: name, ucinetid, then the display
    /// code of each taught course. Ids missing from `course_codes` are kept as-is.
    pub fn search_fields(&self, course_codes: &HashMap<String, String>) -> Vec<String> {
        let mut fields = vec![self.name.clone(), self.ucinetid.clone()];
        fields.extend(self.course_ids.iter().map(|id| {
            course_codes
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.clone())
        }));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taught_courses_searched_by_display_code() {
        let codes = HashMap::from([("BIOSCI93".to_string(), "BIO SCI 93".to_string())]);
        let instructor = Instructor::new("kwong", "Kim Wong").with_courses(&["BIOSCI93", "GONE1"]);

        assert_eq!(
            instructor.search_fields(&codes),
            vec!["Kim Wong", "kwong", "BIO SCI 93", "GONE1"]
        );
    }
}
