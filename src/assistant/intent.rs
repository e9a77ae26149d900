//! Free-text query recognition.
//!
//! Recognition is an ordered rule list evaluated in sequence, first
//! match wins. The order is a behavioral contract, not an accident:
//! several phrasings match more than one rule (the department rule
//! deliberately swallows "show … students" shapes ahead of the rules
//! after it), so reordering changes answers.

use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_DEPARTMENT: &str = "Engineering";
pub const DEFAULT_ATTENDANCE_THRESHOLD: i64 = 70;

/// Case-insensitive keyword → canonical department name. First hit
/// anywhere in the text wins, in table order ("computer science"
/// before "science" so the longer phrase takes precedence).
const DEPARTMENT_KEYWORDS: &[(&str, &str)] = &[
    ("engineering", "Engineering"),
    ("computer science", "Computer Science"),
    ("cs", "Computer Science"),
    ("business", "Business"),
    ("arts", "Arts"),
    ("science", "Science"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Summary,
    AtRisk,
    Department { department: String },
    HighestGpa,
    LowAttendance { threshold: i64 },
    PlacementReady,
    StudentTrend { name: String },
    DepartmentComparison,
    Alerts,
    Unknown,
}

impl Intent {
    /// The variant's parameter record, for the frontend's debug panel.
    pub fn params_json(&self) -> serde_json::Value {
        match self {
            Intent::Department { department } => {
                serde_json::json!({ "department": department })
            }
            Intent::LowAttendance { threshold } => {
                serde_json::json!({ "threshold": threshold })
            }
            Intent::StudentTrend { name } => serde_json::json!({ "name": name }),
            _ => serde_json::json!({}),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::Summary => "summary",
            Intent::AtRisk => "at_risk",
            Intent::Department { .. } => "department",
            Intent::HighestGpa => "highest_gpa",
            Intent::LowAttendance { .. } => "low_attendance",
            Intent::PlacementReady => "placement_ready",
            Intent::StudentTrend { .. } => "student_trend",
            Intent::DepartmentComparison => "department_comparison",
            Intent::Alerts => "alerts",
            Intent::Unknown => "unknown",
        }
    }
}

struct Patterns {
    at_risk: Regex,
    department: Regex,
    highest_gpa: Regex,
    attendance: Regex,
    digits: Regex,
    placement: Regex,
    student_trend: Regex,
    comparison: Regex,
    alerts: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        at_risk: Regex::new(r"at[\s-]?risk|\bstruggling\b|needs attention|in danger|\bfailing\b")
            .expect("at-risk pattern"),
        department: Regex::new(r"\b(?:show|list|display)\b.*\bstudents\b|\bstudents\s+(?:in|from)\b")
            .expect("department pattern"),
        highest_gpa: Regex::new(
            r"\b(?:highest|top|best)\b.*\bgpa\b|\bgpa\b.*\b(?:highest|top|best)\b|\btoppers?\b",
        )
        .expect("highest-gpa pattern"),
        attendance: Regex::new(
            r"\battendance\b.*\b(?:below|under|less than)\b|\b(?:low|poor)\b.*\battendance\b|\battendance\s+(?:issues?|problems?)\b",
        )
        .expect("attendance pattern"),
        digits: Regex::new(r"\d+").expect("digits pattern"),
        placement: Regex::new(r"\bplacements?\b|job[\s-]?ready|\bemployable\b|ready for (?:a )?job")
            .expect("placement pattern"),
        student_trend: Regex::new(
            r"(?:trend|progress|performance)\s+(?:of|for)\s+([a-z]+)|how\s+is\s+([a-z]+)\s+(?:doing|performing|progressing)|\b([a-z]+)'s\s+(?:trend|progress|performance)\b",
        )
        .expect("student-trend pattern"),
        comparison: Regex::new(
            r"\bcompare\b.*\bdepartments?\b|\bdepartments?\b.*\b(?:comparison|compared?|versus|vs)\b|\bwhich department\b",
        )
        .expect("comparison pattern"),
        alerts: Regex::new(r"\balerts?\b|\bwarnings?\b|\bnotifications?\b").expect("alerts pattern"),
    })
}

/// Keyword lookup with word boundaries, so "physics" never reads as
/// the "cs" shorthand.
fn department_keyword(text: &str) -> Option<String> {
    for (keyword, canonical) in DEPARTMENT_KEYWORDS {
        if has_phrase(text, keyword) {
            return Some((*canonical).to_string());
        }
    }
    None
}

fn has_phrase(text: &str, phrase: &str) -> bool {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(phrase) {
        let i = start + pos;
        let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let end = i + phrase.len();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        start = i + 1;
    }
    false
}

pub fn interpret(text: &str) -> Intent {
    let text = text.trim().to_lowercase();

    // Slash commands first: exact equality only.
    match text.as_str() {
        "/summary" => return Intent::Summary,
        "/risk" => return Intent::AtRisk,
        "/top" => return Intent::HighestGpa,
        "/alerts" => return Intent::Alerts,
        _ => {}
    }

    let p = patterns();
    if p.at_risk.is_match(&text) {
        return Intent::AtRisk;
    }
    if p.department.is_match(&text) {
        let department =
            department_keyword(&text).unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());
        return Intent::Department { department };
    }
    if p.highest_gpa.is_match(&text) {
        return Intent::HighestGpa;
    }
    if p.attendance.is_match(&text) {
        let threshold = p
            .digits
            .find(&text)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(DEFAULT_ATTENDANCE_THRESHOLD);
        return Intent::LowAttendance { threshold };
    }
    if p.placement.is_match(&text) {
        return Intent::PlacementReady;
    }
    if let Some(caps) = p.student_trend.captures(&text) {
        if let Some(name) = (1..=3).find_map(|i| caps.get(i)) {
            return Intent::StudentTrend {
                name: name.as_str().to_string(),
            };
        }
    }
    if p.comparison.is_match(&text) {
        return Intent::DepartmentComparison;
    }
    if p.alerts.is_match(&text) {
        return Intent::Alerts;
    }
    Intent::Unknown
}
