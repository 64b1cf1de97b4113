//! Degree programs: degrees, majors and minors

use serde::{Deserialize, Serialize};

/// Degree division
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Division {
    #[default]
    Undergraduate,
    Graduate,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undergraduate => "Undergraduate",
            Self::Graduate => "Graduate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Undergraduate" => Some(Self::Undergraduate),
            "Graduate" => Some(Self::Graduate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degree {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub division: Division,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Major {
    pub id: String,
    pub degree_id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Minor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}
