use serde::{Deserialize, Serialize};

/// One student profile as the dashboard stores and displays it.
/// Field names are camelCase on the wire because the consumer is the
/// JS frontend, which also persists these snapshots to localStorage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub year: i64,
    pub gender: String,
    pub gpa: f64,
    pub attendance: f64,
    pub assignment_score: f64,
    pub tags: Vec<String>,
    /// Oldest first, at most the 5 most recent samples.
    pub performance_history: Vec<f64>,
    pub performance_score: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl StudentRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
