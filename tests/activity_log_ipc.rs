mod test_support;

use serde_json::json;
use test_support::{request_ok, sample_record, spawn_sidecar};

#[test]
fn mutations_are_logged_newest_first() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": sample_record("Ava", "Chen", "Engineering", 3.8, 92.0, 85.0) }),
    );
    let id = created
        .get("record")
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.update",
        json!({ "id": id, "record": { "gpa": 3.9 } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "records.delete",
        json!({ "id": id }),
    );

    let listed = request_ok(&mut stdin, &mut reader, "4", "activity.list", json!({}));
    let actions: Vec<&str> = listed
        .get("entries")
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("action").and_then(|v| v.as_str()))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(
        actions,
        vec!["student.deleted", "student.updated", "student.created"]
    );

    let detail = listed
        .get("entries")
        .and_then(|v| v.as_array())
        .and_then(|entries| entries.first())
        .and_then(|e| e.get("detail"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    assert!(detail.contains("Ava Chen"));

    let limited = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "activity.list",
        json!({ "limit": 1 }),
    );
    let entries = limited.get("entries").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].get("action").and_then(|v| v.as_str()),
        Some("student.deleted")
    );
    assert_eq!(limited.get("total").and_then(|v| v.as_u64()), Some(3));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn log_is_bounded_to_the_most_recent_entries() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    // 105 creates plus 100 deletes log 205 entries; only the trailing
    // 200 survive, so the five oldest creates fall off.
    let mut ids = Vec::new();
    for i in 0..105 {
        let created = request_ok(
            &mut stdin,
            &mut reader,
            &format!("c{}", i),
            "records.create",
            json!({ "record": sample_record(&format!("Kid{}", i), "Test", "Science", 3.0, 80.0, 70.0) }),
        );
        let id = created
            .get("record")
            .and_then(|v| v.get("id"))
            .and_then(|v| v.as_str())
            .expect("id")
            .to_string();
        ids.push(id);
    }
    for (i, id) in ids.iter().take(100).enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("d{}", i),
            "records.delete",
            json!({ "id": id }),
        );
    }

    let listed = request_ok(&mut stdin, &mut reader, "list", "activity.list", json!({}));
    assert_eq!(listed.get("total").and_then(|v| v.as_u64()), Some(200));
    let entries = listed.get("entries").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    assert_eq!(entries.len(), 200);
    // Newest entry is the last delete; the oldest creates fell off.
    assert_eq!(
        entries[0].get("action").and_then(|v| v.as_str()),
        Some("student.deleted")
    );
    assert_eq!(
        entries[entries.len() - 1].get("detail").and_then(|v| v.as_str()),
        Some("Registered Kid5 Test (Science)")
    );

    drop(stdin);
    let _ = child.wait();
}
