use serde_json::json;

use twisterlang::lint::{EnvelopeLint, Schema};

#[test]
fn lint_file_reports_only_invalid_entries() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        json!([
            {"version": "1.0", "correlationId": "a", "payload": {}},
            {"correlationId": "b", "payload": {}},
            {"version": "1.0", "correlationId": "c", "payload": null}
        ])
        .to_string(),
    )
    .unwrap();

    let lint = EnvelopeLint::new(None);
    let errors = lint.lint_file(file.path()).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].index, 1);
    assert!(errors[0].reason.contains("version"));
}

#[test]
fn schema_tightens_field_checks() {
    let schema: Schema = serde_json::from_value(json!({
        "required": ["version", "correlationId", "payload"],
        "types": {"version": "string", "payload": "object"}
    }))
    .unwrap();
    let lint = EnvelopeLint::new(Some(schema));

    assert!(lint
        .check(&json!({"version": "1.0", "correlationId": "a", "payload": {}}))
        .is_none());

    let reason = lint
        .check(&json!({"version": "1.0", "correlationId": "a", "payload": [1]}))
        .unwrap();
    assert!(reason.contains("payload"));
    assert!(reason.contains("object"));
}

#[test]
fn schema_loads_from_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        json!({"required": ["payload"], "types": {"version": "string"}}).to_string(),
    )
    .unwrap();

    let schema = Schema::from_file(file.path()).unwrap();
    assert_eq!(schema.required, vec!["payload".to_string()]);

    let lint = EnvelopeLint::new(Some(schema));
    let reason = lint
        .check(&json!({"version": 2, "correlationId": "a", "payload": {}}))
        .unwrap();
    assert!(reason.contains("version"));
}

#[test]
fn lint_dir_maps_filenames_to_errors() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("good.json"),
        json!([{"version": "1.0", "correlationId": "a", "payload": {}}]).to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("bad.json"),
        json!([{"payload": {}}]).to_string(),
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let lint = EnvelopeLint::new(None);
    let failures = lint.lint_dir(dir.path()).unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures.contains_key("bad.json"));
    assert_eq!(failures["bad.json"].len(), 1);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{not a json array").unwrap();

    let lint = EnvelopeLint::new(None);
    let err = lint.lint_file(file.path()).unwrap_err();
    assert!(matches!(err, twisterlang::TwisterLangError::Parse(_)));
}
