mod test_support;

use serde_json::json;
use test_support::{request, request_ok, sample_record, spawn_sidecar};

#[test]
fn create_computes_score_seeds_history_and_derives_tags() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": sample_record("Ava", "Chen", "Engineering", 3.8, 92.0, 85.0) }),
    );
    let record = created.get("record").expect("record");
    assert_eq!(record.get("performanceScore").and_then(|v| v.as_f64()), Some(63.6));
    assert_eq!(
        record.get("performanceHistory").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );
    let tags: Vec<&str> = record
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|t| t.as_str()).collect())
        .unwrap_or_default();
    assert!(tags.contains(&"Placement Ready"));
    assert!(!tags.contains(&"Needs Attention"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn numeric_strings_and_garbage_coerce_leniently() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": {
            "firstName": "Noah",
            "lastName": "Kim",
            "department": "Science",
            "gpa": "3.8",
            "attendance": "92",
            "assignmentScore": "eighty five",
        }}),
    );
    let record = created.get("record").expect("record");
    // 3.8*5 + 92*0.3 + 0*0.2: the unparseable assignment score reads as 0.
    assert_eq!(record.get("performanceScore").and_then(|v| v.as_f64()), Some(46.6));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn update_appends_history_and_noop_updates_leave_it_alone() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": sample_record("Liam", "Patel", "Business", 3.0, 80.0, 70.0) }),
    );
    let id = created
        .get("record")
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();

    // A material change appends a second sample.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.update",
        json!({ "id": id, "record": { "gpa": 3.4 } }),
    );
    let history_len = updated
        .get("record")
        .and_then(|v| v.get("performanceHistory"))
        .and_then(|v| v.as_array())
        .map(|a| a.len());
    assert_eq!(history_len, Some(2));

    // Saving again with identical inputs must not add a sample.
    let unchanged = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "records.update",
        json!({ "id": id, "record": { "gpa": 3.4 } }),
    );
    let history_len = unchanged
        .get("record")
        .and_then(|v| v.get("performanceHistory"))
        .and_then(|v| v.as_array())
        .map(|a| a.len());
    assert_eq!(history_len, Some(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn history_stays_bounded_and_trend_surfaces_in_insights() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": sample_record("Mia", "Lopez", "Arts", 2.0, 50.0, 40.0) }),
    );
    let id = created
        .get("record")
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();

    // Seven improving saves; the window must hold only the last five.
    for (i, gpa) in [2.2, 2.4, 2.6, 2.8, 3.0, 3.2, 3.4].iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("u{}", i),
            "records.update",
            json!({ "id": id, "record": { "gpa": gpa, "attendance": 50.0 + 5.0 * i as f64 } }),
        );
    }

    let insights = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "records.insights",
        json!({ "id": id }),
    );
    assert_eq!(insights.get("sampleCount").and_then(|v| v.as_u64()), Some(5));
    assert_eq!(insights.get("trend").and_then(|v| v.as_str()), Some("up"));
    assert_eq!(
        insights.get("trendDescription").and_then(|v| v.as_str()),
        Some("Improving across the last 3 updates.")
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn tags_track_risk_across_updates() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.create",
        json!({ "record": sample_record("Zoe", "Ward", "Business", 2.0, 60.0, 50.0) }),
    );
    let record = created.get("record").expect("record");
    let id = record.get("id").and_then(|v| v.as_str()).expect("id").to_string();
    assert!(record
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().any(|t| t.as_str() == Some("Needs Attention")))
        .unwrap_or(false));

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.update",
        json!({ "id": id, "record": { "gpa": 3.7, "attendance": 90.0 } }),
    );
    let tags: Vec<&str> = updated
        .get("record")
        .and_then(|v| v.get("tags"))
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|t| t.as_str()).collect())
        .unwrap_or_default();
    assert!(!tags.contains(&"Needs Attention"));
    assert!(tags.contains(&"Placement Ready"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn delete_removes_and_missing_ids_are_not_found() {
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

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.delete",
        json!({ "id": id }),
    );
    assert_eq!(deleted.get("deleted").and_then(|v| v.as_bool()), Some(true));

    let missing = request(
        &mut stdin,
        &mut reader,
        "3",
        "records.delete",
        json!({ "id": id }),
    );
    assert_eq!(
        missing
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_found")
    );

    let incomplete = request(
        &mut stdin,
        &mut reader,
        "4",
        "records.create",
        json!({ "record": { "firstName": "Solo" } }),
    );
    assert_eq!(
        incomplete
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("bad_params")
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn snapshot_round_trips_after_load() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "records.load",
        json!({ "records": [
            sample_record("Ava", "Chen", "Engineering", 3.8, 92.0, 85.0),
            sample_record("Liam", "Patel", "Business", 2.0, 60.0, 55.0),
            "not-a-record",
        ]}),
    );

    let snapshot = request_ok(&mut stdin, &mut reader, "2", "records.snapshot", json!({}));
    let records = snapshot
        .get("records")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("snapshot records");
    assert_eq!(records.len(), 2);
    for r in &records {
        assert!(r.get("id").and_then(|v| v.as_str()).is_some());
        assert!(r.get("performanceScore").and_then(|v| v.as_f64()).is_some());
        assert_eq!(
            r.get("performanceHistory").and_then(|v| v.as_array()).map(|a| a.len()),
            Some(1)
        );
    }

    drop(stdin);
    let _ = child.wait();
}
