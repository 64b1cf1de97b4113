use super::Searchable;
use serde::{Deserialize, Serialize};

/// A catalog course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Course identifier, department and number without spaces (e.g. `COMPSCI161`)
    pub id: String,
    /// Department code (e.g. `COMPSCI`)
    pub department: String,
    /// Course number within the department (e.g. `161`)
    pub course_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub min_units: f64,
    #[serde(default)]
    pub max_units: f64,
    #[serde(default)]
    pub prerequisite_text: String,
    /// ucinetids of instructors who have taught this course
    #[serde(default)]
    pub instructor_ids: Vec<String>,
}

impl Course {
    pub fn new(
        department: impl Into<String>,
        course_number: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let department = department.into();
        let course_number = course_number.into();
        Self {
            id: format!("{}{}", department, course_number).replace(' ', ""),
            department,
            course_number,
            title: title.into(),
            description: String::new(),
            school: String::new(),
            min_units: 4.0,
            max_units: 4.0,
            prerequisite_text: String::new(),
            instructor_ids: vec![],
        }
    }

    pub fn with_instructors(mut self, ids: &[&str]) -> Self {
        self.instructor_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Human-readable code, e.g. `COMPSCI 161`
    pub fn display_code(&self) -> String {
        format!("{} {}", self.department, self.course_number)
    }
}

impl Searchable for Course {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.display_code(), self.id.clone(), self.title.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_identity() {
        let course = Course::new("I&C SCI", "46", "Data Structure Implementation and Analysis");
        assert_eq!(course.id, "I&CSCI46");
        assert_eq!(course.display_code(), "I&C SCI 46");
    }

    #[test]
    fn test_camel_case_serialization() {
        let course = Course::new("COMPSCI", "161", "Design and Analysis of Algorithms");
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["courseNumber"], "161");
        assert!(json.get("instructorIds").is_some());
    }
}
