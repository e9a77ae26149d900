//! Dashboard aggregates over the record snapshot.
//!
//! Distributions use `BTreeMap` so the serialized payload and the
//! assistant's comparisons come out in a stable order on every call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::StudentRecord;
use crate::score::round_off_2_decimals;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub department_count: usize,
    pub average_gpa: f64,
    pub average_attendance: f64,
    pub average_score: f64,
    pub by_department: BTreeMap<String, usize>,
    pub by_year: BTreeMap<String, usize>,
    pub by_gender: BTreeMap<String, usize>,
    pub by_gpa_band: BTreeMap<String, usize>,
    pub by_attendance_band: BTreeMap<String, usize>,
}

fn gpa_band(gpa: f64) -> &'static str {
    if gpa < 2.0 {
        "< 2.0"
    } else if gpa < 2.5 {
        "2.0 – 2.49"
    } else if gpa < 3.0 {
        "2.5 – 2.99"
    } else if gpa < 3.5 {
        "3.0 – 3.49"
    } else {
        "3.5 – 4.0"
    }
}

fn attendance_band(attendance: f64) -> &'static str {
    if attendance < 60.0 {
        "< 60%"
    } else if attendance < 75.0 {
        "60 – 74%"
    } else if attendance < 90.0 {
        "75 – 89%"
    } else {
        "90 – 100%"
    }
}

pub fn compute_stats(records: &[StudentRecord]) -> DashboardStats {
    let mut stats = DashboardStats::default();
    stats.total_students = records.len();
    if records.is_empty() {
        return stats;
    }

    let n = records.len() as f64;
    stats.average_gpa = round_off_2_decimals(records.iter().map(|r| r.gpa).sum::<f64>() / n);
    stats.average_attendance =
        round_off_2_decimals(records.iter().map(|r| r.attendance).sum::<f64>() / n);
    stats.average_score =
        round_off_2_decimals(records.iter().map(|r| r.performance_score).sum::<f64>() / n);

    for r in records {
        let department = if r.department.trim().is_empty() {
            "Unassigned".to_string()
        } else {
            r.department.trim().to_string()
        };
        *stats.by_department.entry(department).or_insert(0) += 1;

        let year = if r.year > 0 {
            format!("Year {}", r.year)
        } else {
            "Unknown".to_string()
        };
        *stats.by_year.entry(year).or_insert(0) += 1;

        let gender = if r.gender.trim().is_empty() {
            "Unspecified".to_string()
        } else {
            r.gender.trim().to_string()
        };
        *stats.by_gender.entry(gender).or_insert(0) += 1;

        *stats.by_gpa_band.entry(gpa_band(r.gpa).to_string()).or_insert(0) += 1;
        *stats
            .by_attendance_band
            .entry(attendance_band(r.attendance).to_string())
            .or_insert(0) += 1;
    }
    stats.department_count = stats.by_department.len();
    stats
}
