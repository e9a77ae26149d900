use serde::Deserialize;

use crate::activity::ActivityEntry;
use crate::model::StudentRecord;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// In-memory daemon state. The frontend owns persistence; it seeds the
/// snapshot with `records.load` and reads it back with
/// `records.snapshot` before writing localStorage.
#[derive(Default)]
pub struct AppState {
    pub records: Vec<StudentRecord>,
    pub activity: Vec<ActivityEntry>,
}
