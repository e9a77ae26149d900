use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::activity;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentRecord;
use crate::score;
use crate::store;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "not_found",
            message: message.into(),
            details: None,
        }
    }

    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

fn record_json(r: &StudentRecord) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(r).map_err(|e| HandlerErr {
        code: "serialize_failed",
        message: e.to_string(),
        details: None,
    })
}

/// Merge the fields present in `raw` into `record`. Absent fields keep
/// their current value; numeric fields go through the lenient coercion
/// (numbers, numeric strings, else 0). `id`, timestamps, history, and
/// the derived score are never writable from the outside.
fn apply_fields(record: &mut StudentRecord, raw: &serde_json::Map<String, serde_json::Value>) {
    if let Some(v) = raw.get("firstName").and_then(|v| v.as_str()) {
        record.first_name = v.trim().to_string();
    }
    if let Some(v) = raw.get("lastName").and_then(|v| v.as_str()) {
        record.last_name = v.trim().to_string();
    }
    if let Some(v) = raw.get("email").and_then(|v| v.as_str()) {
        record.email = v.trim().to_string();
    }
    if let Some(v) = raw.get("department").and_then(|v| v.as_str()) {
        record.department = v.trim().to_string();
    }
    if let Some(v) = raw.get("gender").and_then(|v| v.as_str()) {
        record.gender = v.trim().to_string();
    }
    if raw.contains_key("year") {
        record.year = score::lenient_f64(raw.get("year")) as i64;
    }
    if raw.contains_key("gpa") {
        record.gpa = score::lenient_f64(raw.get("gpa"));
    }
    if raw.contains_key("attendance") {
        record.attendance = score::lenient_f64(raw.get("attendance"));
    }
    if raw.contains_key("assignmentScore") {
        record.assignment_score = score::lenient_f64(raw.get("assignmentScore"));
    }
    if let Some(tags) = raw.get("tags").and_then(|v| v.as_array()) {
        record.tags = tags
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
}

fn require_identity(record: &StudentRecord) -> Result<(), HandlerErr> {
    for (field, value) in [
        ("record.firstName", &record.first_name),
        ("record.lastName", &record.last_name),
        ("record.department", &record.department),
    ] {
        if value.trim().is_empty() {
            return Err(HandlerErr::bad_params(format!("missing {}", field)));
        }
    }
    Ok(())
}

fn record_object(params: &serde_json::Value) -> Result<&serde_json::Map<String, serde_json::Value>, HandlerErr> {
    params
        .get("record")
        .and_then(|v| v.as_object())
        .ok_or_else(|| HandlerErr::bad_params("missing record object"))
}

fn handle_load(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let Some(raw_records) = req.params.get("records").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing records array"));
    };

    let mut loaded: Vec<StudentRecord> = Vec::with_capacity(raw_records.len());
    let mut skipped = 0usize;
    for value in raw_records {
        let Some(obj) = value.as_object() else {
            skipped += 1;
            continue;
        };
        let mut record = StudentRecord::default();
        record.id = obj
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        apply_fields(&mut record, obj);

        // Stored histories may predate the window bound; clamp to the
        // trailing 5 without treating the load as a new sample.
        let mut history: Vec<f64> = obj
            .get("performanceHistory")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|v| score::lenient_f64(Some(v))).collect())
            .unwrap_or_default();
        if history.len() > score::HISTORY_WINDOW {
            history.drain(..history.len() - score::HISTORY_WINDOW);
        }
        let computed = score::compute_score(record.gpa, record.attendance, record.assignment_score);
        if history.is_empty() {
            history.push(computed);
        }
        record.performance_history = history;
        record.performance_score = computed;

        let now = Utc::now().to_rfc3339();
        record.created_at = obj
            .get("createdAt")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| now.clone());
        record.updated_at = obj
            .get("updatedAt")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or(now);

        store::derive_tags(&mut record);
        loaded.push(record);
    }

    let count = loaded.len();
    state.records = loaded;
    activity::record(
        &mut state.activity,
        "records.loaded",
        format!("Loaded {} records from the dashboard snapshot", count),
    );
    Ok(json!({ "count": count, "skipped": skipped }))
}

fn handle_snapshot(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let records: Result<Vec<serde_json::Value>, HandlerErr> =
        state.records.iter().map(record_json).collect();
    Ok(json!({ "records": records? }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let raw = record_object(&req.params)?;

    let mut record = StudentRecord::default();
    record.id = Uuid::new_v4().to_string();
    apply_fields(&mut record, raw);
    require_identity(&record)?;

    let now = Utc::now().to_rfc3339();
    record.created_at = now.clone();
    record.updated_at = now;
    record.performance_score =
        score::compute_score(record.gpa, record.attendance, record.assignment_score);
    record.performance_history = vec![record.performance_score];
    store::derive_tags(&mut record);

    activity::record(
        &mut state.activity,
        "student.created",
        format!("Registered {} ({})", record.display_name(), record.department),
    );
    let payload = record_json(&record)?;
    state.records.push(record);
    Ok(json!({ "record": payload }))
}

fn handle_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "id")?;
    let raw = record_object(&req.params)?;
    let Some(index) = state.records.iter().position(|r| r.id == id) else {
        return Err(HandlerErr::not_found("student not found"));
    };

    let record = &mut state.records[index];
    apply_fields(record, raw);
    require_identity(record)?;

    record.performance_score =
        score::compute_score(record.gpa, record.attendance, record.assignment_score);
    record.performance_history =
        score::append_sample(&record.performance_history, record.performance_score);
    record.updated_at = Utc::now().to_rfc3339();
    store::derive_tags(record);

    let detail = format!("Updated {}", record.display_name());
    let payload = record_json(record)?;
    activity::record(&mut state.activity, "student.updated", detail);
    Ok(json!({ "record": payload }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "id")?;
    let Some(index) = state.records.iter().position(|r| r.id == id) else {
        return Err(HandlerErr::not_found("student not found"));
    };
    let removed = state.records.remove(index);
    activity::record(
        &mut state.activity,
        "student.deleted",
        format!("Removed {}", removed.display_name()),
    );
    Ok(json!({ "deleted": true }))
}

fn handle_insights(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "id")?;
    let Some(record) = store::find_by_id(&state.records, &id) else {
        return Err(HandlerErr::not_found("student not found"));
    };
    let history = &record.performance_history;
    let trend = score::classify_trend(history);
    Ok(json!({
        "id": record.id,
        "displayName": record.display_name(),
        "score": record.performance_score,
        "history": history,
        "sampleCount": history.len(),
        "trend": trend.as_str(),
        "consistency": score::classify_consistency(history).as_str(),
        "trendDescription": score::describe_trend(trend, history.len()),
    }))
}

#[derive(Debug, Clone)]
struct ListQuery {
    search: Option<String>,
    department: Option<String>,
    tag: Option<String>,
    sort_by: String,
    sort_dir: String,
    page: usize,
    page_size: usize,
}

fn parse_opt_str(
    query: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<String>, String> {
    let Some(value) = query.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let Some(raw) = value.as_str() else {
        return Err(format!("query.{} must be string or null", key));
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

fn parse_sort_by(v: Option<&serde_json::Value>) -> Result<String, String> {
    const ALLOWED: &[&str] = &[
        "name",
        "gpa",
        "attendance",
        "performanceScore",
        "year",
        "department",
        "createdAt",
    ];
    let Some(value) = v else {
        return Ok("name".to_string());
    };
    let Some(raw) = value.as_str() else {
        return Err("query.sortBy must be a string".to_string());
    };
    if ALLOWED.iter().any(|a| *a == raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("query.sortBy must be one of: {}", ALLOWED.join(", ")))
    }
}

fn parse_sort_dir(v: Option<&serde_json::Value>) -> Result<String, String> {
    let Some(value) = v else {
        return Ok("asc".to_string());
    };
    let Some(raw) = value.as_str() else {
        return Err("query.sortDir must be a string".to_string());
    };
    if raw.eq_ignore_ascii_case("asc") {
        Ok("asc".to_string())
    } else if raw.eq_ignore_ascii_case("desc") {
        Ok("desc".to_string())
    } else {
        Err("query.sortDir must be one of: asc, desc".to_string())
    }
}

fn parse_page(v: Option<&serde_json::Value>) -> Result<usize, String> {
    let Some(value) = v else {
        return Ok(1);
    };
    let Some(page) = value.as_u64() else {
        return Err("query.page must be a positive integer".to_string());
    };
    if page == 0 {
        return Err("query.page must be >= 1".to_string());
    }
    Ok(page as usize)
}

fn parse_page_size(v: Option<&serde_json::Value>) -> Result<usize, String> {
    let Some(value) = v else {
        return Ok(50);
    };
    let Some(size) = value.as_u64() else {
        return Err("query.pageSize must be a positive integer".to_string());
    };
    if size == 0 || size > 100 {
        return Err("query.pageSize must be in range 1..=100".to_string());
    }
    Ok(size as usize)
}

fn parse_list_query(req: &Request) -> Result<ListQuery, HandlerErr> {
    let query = req
        .params
        .get("query")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let mapped = |msg: String| HandlerErr::bad_params(msg);
    Ok(ListQuery {
        search: parse_opt_str(&query, "search")
            .map(|v| v.map(|s| s.to_lowercase()))
            .map_err(mapped)?,
        department: parse_opt_str(&query, "department").map_err(mapped)?,
        tag: parse_opt_str(&query, "tag").map_err(mapped)?,
        sort_by: parse_sort_by(query.get("sortBy")).map_err(mapped)?,
        sort_dir: parse_sort_dir(query.get("sortDir")).map_err(mapped)?,
        page: parse_page(query.get("page")).map_err(mapped)?,
        page_size: parse_page_size(query.get("pageSize")).map_err(mapped)?,
    })
}

fn matches_query(r: &StudentRecord, q: &ListQuery) -> bool {
    if let Some(search) = &q.search {
        let haystack = format!(
            "{} {} {} {}",
            r.first_name.to_lowercase(),
            r.last_name.to_lowercase(),
            r.email.to_lowercase(),
            r.department.to_lowercase()
        );
        if !haystack.contains(search) {
            return false;
        }
    }
    if let Some(department) = &q.department {
        if !r.department.eq_ignore_ascii_case(department) {
            return false;
        }
    }
    if let Some(tag) = &q.tag {
        if !r.has_tag(tag) {
            return false;
        }
    }
    true
}

fn handle_list(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let q = parse_list_query(req)?;

    let mut rows: Vec<&StudentRecord> =
        state.records.iter().filter(|r| matches_query(r, &q)).collect();

    rows.sort_by(|a, b| {
        use std::cmp::Ordering;
        let ordering = match q.sort_by.as_str() {
            "gpa" => a.gpa.partial_cmp(&b.gpa).unwrap_or(Ordering::Equal),
            "attendance" => a
                .attendance
                .partial_cmp(&b.attendance)
                .unwrap_or(Ordering::Equal),
            "performanceScore" => a
                .performance_score
                .partial_cmp(&b.performance_score)
                .unwrap_or(Ordering::Equal),
            "year" => a.year.cmp(&b.year),
            "department" => a
                .department
                .to_lowercase()
                .cmp(&b.department.to_lowercase()),
            "createdAt" => a.created_at.cmp(&b.created_at),
            // "name"
            _ => (a.last_name.to_lowercase(), a.first_name.to_lowercase())
                .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase())),
        };
        if q.sort_dir == "desc" {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let total = rows.len();
    let start = (q.page - 1).saturating_mul(q.page_size);
    let page_rows: Result<Vec<serde_json::Value>, HandlerErr> = rows
        .into_iter()
        .skip(start)
        .take(q.page_size)
        .map(record_json)
        .collect();

    Ok(json!({
        "rows": page_rows?,
        "total": total,
        "page": q.page,
        "pageSize": q.page_size,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "records.load" => handle_load(state, req),
        "records.snapshot" => handle_snapshot(state),
        "records.list" => handle_list(state, req),
        "records.create" => handle_create(state, req),
        "records.update" => handle_update(state, req),
        "records.delete" => handle_delete(state, req),
        "records.insights" => handle_insights(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
