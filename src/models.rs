use serde::{Deserialize, Serialize};

/// Citizen grievance as received. Absent text fields deserialize to empty
/// strings so validation reports them instead of the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintSubmission {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_location")]
    pub location_coords: String,
}

impl Default for ComplaintSubmission {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: default_category(),
            phone: String::new(),
            public_id: String::new(),
            email: String::new(),
            location_coords: default_location(),
        }
    }
}

fn default_category() -> String {
    "Other".to_string()
}

fn default_location() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub refined_category: String,
    pub priority_score: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub govt_id: Option<String>,
}
