use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Most recent entries kept in memory; older ones fall off.
pub const ACTIVITY_CAP: usize = 200;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub action: String,
    pub detail: String,
    pub at: String,
}

/// Append an entry, clamping the log to [`ACTIVITY_CAP`].
pub fn record(log: &mut Vec<ActivityEntry>, action: &str, detail: impl Into<String>) {
    log.push(ActivityEntry {
        id: Uuid::new_v4().to_string(),
        action: action.to_string(),
        detail: detail.into(),
        at: Utc::now().to_rfc3339(),
    });
    if log.len() > ACTIVITY_CAP {
        let overflow = log.len() - ACTIVITY_CAP;
        log.drain(..overflow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded_and_drops_oldest() {
        let mut log = Vec::new();
        for i in 0..(ACTIVITY_CAP + 7) {
            record(&mut log, "student.created", format!("entry {}", i));
        }
        assert_eq!(log.len(), ACTIVITY_CAP);
        assert_eq!(log[0].detail, "entry 7");
        assert_eq!(log[log.len() - 1].detail, format!("entry {}", ACTIVITY_CAP + 6));
    }
}
