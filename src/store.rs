//! Derived queries over the in-memory record snapshot.
//!
//! The frontend owns persistence (localStorage) and seeds the daemon
//! over IPC; everything here reads or rewrites the snapshot the caller
//! passes in. Policy constants are fixed, not configurable.

use crate::model::StudentRecord;

pub const AT_RISK_ATTENDANCE: f64 = 70.0;
pub const AT_RISK_GPA: f64 = 2.5;
pub const PLACEMENT_GPA: f64 = 3.5;
pub const PLACEMENT_ATTENDANCE: f64 = 85.0;

pub const TAG_NEEDS_ATTENTION: &str = "Needs Attention";
pub const TAG_PLACEMENT_READY: &str = "Placement Ready";

pub fn is_at_risk(r: &StudentRecord) -> bool {
    r.attendance < AT_RISK_ATTENDANCE || r.gpa < AT_RISK_GPA
}

pub fn is_placement_ready(r: &StudentRecord) -> bool {
    r.has_tag(TAG_PLACEMENT_READY)
        || (r.gpa >= PLACEMENT_GPA && r.attendance >= PLACEMENT_ATTENDANCE)
}

/// Recompute the derived tags after a save, keeping user-applied tags.
pub fn derive_tags(r: &mut StudentRecord) {
    r.tags.retain(|t| {
        !t.eq_ignore_ascii_case(TAG_NEEDS_ATTENTION) && !t.eq_ignore_ascii_case(TAG_PLACEMENT_READY)
    });
    if r.gpa >= PLACEMENT_GPA && r.attendance >= PLACEMENT_ATTENDANCE {
        r.tags.push(TAG_PLACEMENT_READY.to_string());
    }
    if is_at_risk(r) {
        r.tags.push(TAG_NEEDS_ATTENTION.to_string());
    }
}

pub fn at_risk(records: &[StudentRecord]) -> Vec<&StudentRecord> {
    records.iter().filter(|r| is_at_risk(r)).collect()
}

/// Every record tied at the maximum GPA. Empty input yields empty.
pub fn highest_gpa(records: &[StudentRecord]) -> Vec<&StudentRecord> {
    let Some(max) = records
        .iter()
        .map(|r| r.gpa)
        .fold(None::<f64>, |acc, g| match acc {
            Some(m) if m >= g => Some(m),
            _ => Some(g),
        })
    else {
        return Vec::new();
    };
    records.iter().filter(|r| r.gpa == max).collect()
}

pub fn low_attendance(records: &[StudentRecord], threshold: f64) -> Vec<&StudentRecord> {
    records.iter().filter(|r| r.attendance < threshold).collect()
}

pub fn placement_ready(records: &[StudentRecord]) -> Vec<&StudentRecord> {
    records.iter().filter(|r| is_placement_ready(r)).collect()
}

/// Case-insensitive substring match on first or last name, first hit
/// only.
pub fn find_by_name<'a>(records: &'a [StudentRecord], needle: &str) -> Option<&'a StudentRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    records.iter().find(|r| {
        r.first_name.to_lowercase().contains(&needle) || r.last_name.to_lowercase().contains(&needle)
    })
}

pub fn find_by_id<'a>(records: &'a [StudentRecord], id: &str) -> Option<&'a StudentRecord> {
    records.iter().find(|r| r.id == id)
}
