//! Per-intent response generation.
//!
//! `respond` is pure over the snapshot and stats the caller passes in:
//! identical inputs produce the identical reply, so the frontend's
//! simulated typing delay can wrap the call without affecting it.
//! Replies use a lightweight markup convention the frontend renders:
//! `**bold**` and newlines; everything else is escaped on that side.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::StudentRecord;
use crate::score;
use crate::stats::DashboardStats;
use crate::store;

use super::Intent;

/// At-risk lists show a few more rows than the other intents.
const AT_RISK_DISPLAY_LIMIT: usize = 10;
const DISPLAY_LIMIT: usize = 8;

const EMPTY_STORE_MESSAGE: &str =
    "There are no students in the system yet — register a student and ask me again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseAction {
    FilterDepartment { department: String },
    FilterAtRisk { tag: String },
    FilterTag { tag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ResponseAction>,
}

impl AssistantReply {
    fn text_only(text: impl Into<String>) -> Self {
        AssistantReply {
            text: text.into(),
            action: None,
        }
    }
}

pub fn respond(
    intent: &Intent,
    records: &[StudentRecord],
    stats: &DashboardStats,
) -> AssistantReply {
    match intent {
        Intent::Summary => summary(records, stats),
        Intent::AtRisk => at_risk(records),
        Intent::Department { department } => department_list(records, department),
        Intent::HighestGpa => highest_gpa(records),
        Intent::LowAttendance { threshold } => low_attendance(records, *threshold),
        Intent::PlacementReady => placement_ready(records),
        Intent::StudentTrend { name } => student_trend(records, name),
        Intent::DepartmentComparison => department_comparison(records),
        Intent::Alerts => alerts(records),
        Intent::Unknown => AssistantReply::text_only(help_text()),
    }
}

fn student_line(r: &StudentRecord) -> String {
    format!(
        "• {} — GPA {}, attendance {}%",
        r.display_name(),
        r.gpa,
        r.attendance
    )
}

/// Cap a list for display, appending the "… and N more" suffix when
/// rows were dropped.
fn bounded_lines(records: &[&StudentRecord], limit: usize) -> String {
    let mut lines: Vec<String> = records.iter().take(limit).map(|r| student_line(r)).collect();
    if records.len() > limit {
        lines.push(format!("… and {} more", records.len() - limit));
    }
    lines.join("\n")
}

fn summary(records: &[StudentRecord], stats: &DashboardStats) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    let mut text = format!(
        "**Dashboard summary**\nStudents: **{}** across {} departments.\nAverage GPA **{}**, average attendance **{}%**, average performance score **{}**.",
        stats.total_students,
        stats.department_count,
        stats.average_gpa,
        stats.average_attendance,
        stats.average_score
    );
    if let Some((name, count)) = stats.by_department.iter().max_by_key(|(_, c)| **c) {
        text.push_str(&format!("\nLargest department: **{}** ({}).", name, count));
    }
    AssistantReply::text_only(text)
}

fn at_risk(records: &[StudentRecord]) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    let risky = store::at_risk(records);
    if risky.is_empty() {
        return AssistantReply::text_only(
            "No students are currently at risk — attendance and GPA look healthy.",
        );
    }
    let text = format!(
        "**{} {} attention** (attendance below {}% or GPA below {}):\n{}",
        risky.len(),
        if risky.len() == 1 {
            "student needs"
        } else {
            "students need"
        },
        store::AT_RISK_ATTENDANCE,
        store::AT_RISK_GPA,
        bounded_lines(&risky, AT_RISK_DISPLAY_LIMIT)
    );
    AssistantReply {
        text,
        action: Some(ResponseAction::FilterAtRisk {
            tag: store::TAG_NEEDS_ATTENTION.to_string(),
        }),
    }
}

fn department_list(records: &[StudentRecord], department: &str) -> AssistantReply {
    let members: Vec<&StudentRecord> = records
        .iter()
        .filter(|r| r.department.eq_ignore_ascii_case(department))
        .collect();
    if members.is_empty() {
        return AssistantReply::text_only(format!(
            "No students found in the {} department.",
            department
        ));
    }
    let text = format!(
        "**{} — {} student{}:**\n{}",
        department,
        members.len(),
        if members.len() == 1 { "" } else { "s" },
        bounded_lines(&members, DISPLAY_LIMIT)
    );
    AssistantReply {
        text,
        action: Some(ResponseAction::FilterDepartment {
            department: department.to_string(),
        }),
    }
}

fn highest_gpa(records: &[StudentRecord]) -> AssistantReply {
    let top = store::highest_gpa(records);
    let Some(first) = top.first() else {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    };
    let text = format!(
        "**Top GPA: {}**\n{}",
        first.gpa,
        bounded_lines(&top, DISPLAY_LIMIT)
    );
    AssistantReply::text_only(text)
}

fn low_attendance(records: &[StudentRecord], threshold: i64) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    let low = store::low_attendance(records, threshold as f64);
    if low.is_empty() {
        return AssistantReply::text_only(format!(
            "No students with attendance below {}%.",
            threshold
        ));
    }
    let text = format!(
        "**{} student{} below {}% attendance:**\n{}",
        low.len(),
        if low.len() == 1 { "" } else { "s" },
        threshold,
        bounded_lines(&low, DISPLAY_LIMIT)
    );
    AssistantReply::text_only(text)
}

fn placement_ready(records: &[StudentRecord]) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    let ready = store::placement_ready(records);
    if ready.is_empty() {
        return AssistantReply::text_only(
            "No students are placement ready yet (GPA 3.5+ with 85%+ attendance).",
        );
    }
    let text = format!(
        "**{} student{} placement ready:**\n{}",
        ready.len(),
        if ready.len() == 1 { "" } else { "s" },
        bounded_lines(&ready, DISPLAY_LIMIT)
    );
    AssistantReply {
        text,
        action: Some(ResponseAction::FilterTag {
            tag: store::TAG_PLACEMENT_READY.to_string(),
        }),
    }
}

fn student_trend(records: &[StudentRecord], name: &str) -> AssistantReply {
    let Some(r) = store::find_by_name(records, name) else {
        return AssistantReply::text_only(format!("No students found matching \"{}\".", name));
    };
    let trend = score::classify_trend(&r.performance_history);
    let consistency = score::classify_consistency(&r.performance_history);
    let text = format!(
        "**{}** — performance score **{}** (GPA {}, attendance {}%).\n{} Consistency: {}.",
        r.display_name(),
        r.performance_score,
        r.gpa,
        r.attendance,
        score::describe_trend(trend, r.performance_history.len()),
        consistency.as_str()
    );
    AssistantReply::text_only(text)
}

fn department_comparison(records: &[StudentRecord]) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    // BTreeMap keeps the comparison order stable across calls.
    let mut groups: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
    for r in records {
        let key = if r.department.trim().is_empty() {
            "Unassigned".to_string()
        } else {
            r.department.trim().to_string()
        };
        let entry = groups.entry(key).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += r.gpa;
        entry.2 += r.attendance;
    }
    let mut lines = vec!["**Department comparison**".to_string()];
    let mut leader: Option<(&str, f64)> = None;
    for (name, (count, gpa_sum, att_sum)) in &groups {
        let avg_gpa = score::round_off_2_decimals(gpa_sum / *count as f64);
        let avg_att = score::round_off_2_decimals(att_sum / *count as f64);
        lines.push(format!(
            "• {}: {} student{}, avg GPA {}, avg attendance {}%",
            name,
            count,
            if *count == 1 { "" } else { "s" },
            avg_gpa,
            avg_att
        ));
        if leader.map(|(_, best)| avg_gpa > best).unwrap_or(true) {
            leader = Some((name.as_str(), avg_gpa));
        }
    }
    if let Some((name, _)) = leader {
        lines.push(format!("Leading on GPA: **{}**.", name));
    }
    AssistantReply::text_only(lines.join("\n"))
}

fn alerts(records: &[StudentRecord]) -> AssistantReply {
    if records.is_empty() {
        return AssistantReply::text_only(EMPTY_STORE_MESSAGE);
    }
    let mut lines = Vec::new();
    let risky = store::at_risk(records);
    if !risky.is_empty() {
        lines.push(format!(
            "• **{}** student{} at risk (attendance below {}% or GPA below {})",
            risky.len(),
            if risky.len() == 1 { "" } else { "s" },
            store::AT_RISK_ATTENDANCE,
            store::AT_RISK_GPA
        ));
    }
    let declining: Vec<&StudentRecord> = records
        .iter()
        .filter(|r| score::classify_trend(&r.performance_history) == score::Trend::Down)
        .collect();
    if !declining.is_empty() {
        let names: Vec<String> = declining
            .iter()
            .take(5)
            .map(|r| r.display_name())
            .collect();
        lines.push(format!(
            "• **{}** declining trend{}: {}{}",
            declining.len(),
            if declining.len() == 1 { "" } else { "s" },
            names.join(", "),
            if declining.len() > 5 { ", …" } else { "" }
        ));
    }
    if lines.is_empty() {
        return AssistantReply::text_only("All clear — no alerts right now.");
    }
    AssistantReply::text_only(format!("**Alerts**\n{}", lines.join("\n")))
}

fn help_text() -> String {
    [
        "I didn't catch that. Here is what you can ask me about:",
        "• **Summary** — \"/summary\" or \"give me an overview\"",
        "• **At-risk students** — \"/risk\" or \"who is at risk?\"",
        "• **Departments** — \"show engineering students\"",
        "• **Top GPA** — \"/top\" or \"who has the highest gpa?\"",
        "• **Attendance** — \"attendance below 70\"",
        "• **Placement** — \"who is ready for placement?\"",
        "• **Student trends** — \"how is Ava doing?\"",
        "• **Comparisons** — \"compare departments\"",
        "• **Alerts** — \"/alerts\" or \"any warnings?\"",
    ]
    .join("\n")
}
