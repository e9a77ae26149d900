use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;

fn handle_stats(state: &AppState, req: &Request) -> serde_json::Value {
    let computed = stats::compute_stats(&state.records);
    match serde_json::to_value(&computed) {
        Ok(value) => ok(&req.id, value),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_stats(state, req)),
        _ => None,
    }
}
