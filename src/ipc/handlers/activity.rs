use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

/// Newest first; `limit` trims the tail of history, not the head.
fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    let limit = match req.params.get("limit") {
        None => state.activity.len(),
        Some(v) if v.is_null() => state.activity.len(),
        Some(v) => match v.as_u64() {
            Some(n) => n as usize,
            None => return err(&req.id, "bad_params", "limit must be a positive integer", None),
        },
    };

    let entries: Vec<serde_json::Value> = state
        .activity
        .iter()
        .rev()
        .take(limit)
        .filter_map(|e| serde_json::to_value(e).ok())
        .collect();
    ok(&req.id, json!({ "entries": entries, "total": state.activity.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "activity.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
