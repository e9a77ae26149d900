use serde_json::json;

use crate::assistant::{interpret, respond};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;

/// The frontend wraps this call in a simulated typing delay; the delay
/// is presentation only and never reaches the interpreter.
fn handle_query(state: &AppState, req: &Request) -> serde_json::Value {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };

    let intent = interpret(text);
    let computed = stats::compute_stats(&state.records);
    let reply = respond(&intent, &state.records, &computed);

    let mut result = json!({
        "intent": intent.name(),
        "params": intent.params_json(),
        "text": reply.text,
    });
    if let Some(action) = reply.action {
        match serde_json::to_value(&action) {
            Ok(value) => {
                result["action"] = value;
            }
            Err(e) => return err(&req.id, "serialize_failed", e.to_string(), None),
        }
    }
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assistant.query" => Some(handle_query(state, req)),
        _ => None,
    }
}
