use crate::command::assert_cmd_snapshot;

fn check() -> crate::command::Command {
    crate::cadence(["check"])
}

#[test]
fn valid_weekly_order_from_stdin() {
    let order = r#"{
        "topic": "Standup",
        "start_date": "2025-01-01",
        "recurrence": "weekly",
        "weekly_days": ["monday", "wednesday"],
        "end_date": "2025-01-15"
    }"#;
    assert_cmd_snapshot!(
        check().stdin(order),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ok: 5 occurrences from 2025-01-01 to 2025-01-15

    ----- stderr -----
    ",
    );
}

#[test]
fn valid_monthly_order_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.json");
    std::fs::write(
        &path,
        r#"{
            "start_date": "2025-01-10",
            "recurrence": "monthly",
            "monthly_day": 10,
            "occurrences": 3
        }"#,
    )
    .unwrap();
    assert_cmd_snapshot!(
        check().arg(&path),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ok: 3 occurrences from 2025-01-10 to 2025-03-10

    ----- stderr -----
    ",
    );
}

#[test]
fn invalid_order_reports_first_rule() {
    assert_cmd_snapshot!(
        check().stdin(r#"{"start_date": "2025-01-01"}"#),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    meeting order has no recurrence type
    ",
    );
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-order.json");
    let snap = check().arg(&path).snapshot();
    let snapshot = snap.snapshot();
    assert!(snapshot.contains("success: false"), "{snapshot}");
    assert!(
        snapshot.contains("failed to read meeting order from"),
        "{snapshot}",
    );
}
