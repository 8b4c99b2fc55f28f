use migration_dashboard::{
    report::{ConsistencyNote, SheetStatus},
    MigrationReport, ReportError, SheetReport, select_sheet,
};

const EXAMPLE: &str = r#"{ "sheets": { "Location": {
    "success_count": 80, "upload_errors": 5, "validation_errors": 10,
    "mapping_errors": 5, "success_rate": 80 } } }"#;

#[test]
fn selects_present_sheet() {
    let report = MigrationReport::from_json_str(EXAMPLE).unwrap();
    let sheet = select_sheet(&report, "Location").unwrap();
    assert_eq!(
        *sheet,
        SheetReport {
            success_count: 80,
            upload_errors: 5,
            validation_errors: 10,
            mapping_errors: 5,
            success_rate: 80.0,
            total_rows: None,
        }
    );
}

#[test]
fn returns_the_stored_object() {
    let report = MigrationReport::from_json_str(EXAMPLE).unwrap();
    let a = select_sheet(&report, "Location").unwrap();
    let b = report.select_sheet("Location").unwrap();
    assert!(std::ptr::eq(a, b));
}

#[test]
fn absent_sheet_is_not_found() {
    let report = MigrationReport::from_json_str(EXAMPLE).unwrap();
    let err = select_sheet(&report, "Product").unwrap_err();
    assert!(matches!(err, ReportError::NotFound { ref name } if name == "Product"));
}

#[test]
fn sheet_names_are_case_sensitive() {
    let report = MigrationReport::from_json_str(EXAMPLE).unwrap();
    assert!(select_sheet(&report, "location").unwrap_err().is_not_found());
}

#[test]
fn malformed_sheet_does_not_poison_the_report() {
    let raw = include_str!("fixtures/migration_report.json");
    let report = MigrationReport::from_json_str(raw).unwrap();

    assert!(select_sheet(&report, "Location").is_ok());
    assert!(select_sheet(&report, "Ground Accom").is_ok());
    assert!(!report.is_fully_valid());

    match select_sheet(&report, "Journeys").unwrap_err() {
        ReportError::Malformed { sheet, field, .. } => {
            assert_eq!(sheet.as_deref(), Some("Journeys"));
            assert_eq!(field.as_deref(), Some("upload_errors"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        report.sheet_names(),
        vec!["Ground Accom", "Journeys", "Location"]
    );
    assert_eq!(report.status("Location"), Some(SheetStatus::Ok));
    assert!(matches!(
        report.status("Journeys"),
        Some(SheetStatus::Malformed { .. })
    ));
    assert_eq!(report.status("Product"), None);
}

#[test]
fn missing_field_is_malformed_not_zero() {
    let raw = r#"{ "sheets": { "Location": {
        "success_count": 80, "validation_errors": 10,
        "mapping_errors": 5, "success_rate": 80 } } }"#;
    let report = MigrationReport::from_json_str(raw).unwrap();
    let err = select_sheet(&report, "Location").unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("upload_errors"));
}

#[test]
fn rejects_negative_and_fractional_counts() {
    for bad in ["-1", "2.5", "null", "true"] {
        let raw = format!(
            r#"{{ "sheets": {{ "S": {{ "success_count": {bad}, "upload_errors": 0,
            "validation_errors": 0, "mapping_errors": 0, "success_rate": 0 }} }} }}"#
        );
        let report = MigrationReport::from_json_str(&raw).unwrap();
        assert!(select_sheet(&report, "S").unwrap_err().is_malformed(), "{bad}");
    }
}

#[test]
fn integral_float_counts_are_accepted() {
    let raw = r#"{ "sheets": { "S": { "success_count": 80.0, "upload_errors": 0,
        "validation_errors": 0, "mapping_errors": 0, "success_rate": 80 } } }"#;
    let report = MigrationReport::from_json_str(raw).unwrap();
    assert_eq!(select_sheet(&report, "S").unwrap().success_count, 80);
}

#[test]
fn string_success_rate_is_malformed() {
    let raw = r#"{ "sheets": { "S": { "success_count": 80, "upload_errors": 0,
        "validation_errors": 0, "mapping_errors": 0, "success_rate": "80" } } }"#;
    let report = MigrationReport::from_json_str(raw).unwrap();
    let err = select_sheet(&report, "S").unwrap_err();
    assert!(err.to_string().contains("success_rate"));
}

#[test]
fn broken_top_level_fails_the_whole_report() {
    for raw in ["[]", "{}", r#"{"sheets": []}"#, "{not json"] {
        let err = MigrationReport::from_json_str(raw).unwrap_err();
        assert!(err.is_malformed(), "{raw}");
    }
}

#[test]
fn load_reports_missing_file() {
    let err = MigrationReport::load(std::path::Path::new("does/not/exist.json")).unwrap_err();
    assert!(matches!(err, ReportError::Read { .. }));
}

#[test]
fn consistency_notes_flag_but_do_not_fix() {
    let sheet = SheetReport {
        success_count: 80,
        upload_errors: 5,
        validation_errors: 10,
        mapping_errors: 5,
        success_rate: 90.0,
        total_rows: Some(110),
    };
    let notes = sheet.consistency();
    assert_eq!(notes.len(), 2);
    assert!(matches!(
        notes[0],
        ConsistencyNote::TotalMismatch { total_rows: 110, counted: 100 }
    ));
    assert!(matches!(notes[1], ConsistencyNote::RateMismatch { .. }));
    assert_eq!(sheet.success_rate, 90.0);
}

#[test]
fn consistent_sheet_has_no_notes() {
    let raw = include_str!("fixtures/migration_report.json");
    let report = MigrationReport::from_json_str(raw).unwrap();
    for (_, sheet) in report.sheets() {
        assert!(sheet.consistency().is_empty());
    }
}

#[test]
fn overflowing_counts_are_noted_not_panicked() {
    let raw = r#"{ "sheets": { "S": { "success_count": 18446744073709551615,
        "upload_errors": 1, "validation_errors": 0, "mapping_errors": 0,
        "success_rate": 100, "total_rows": 5 } } }"#;
    let report = MigrationReport::from_json_str(raw).unwrap();
    let sheet = select_sheet(&report, "S").unwrap();

    assert_eq!(sheet.counted_rows(), None);
    let notes = sheet.consistency();
    assert_eq!(notes[0], ConsistencyNote::CountOverflow);
    assert!(!notes.iter().any(|n| matches!(n, ConsistencyNote::TotalMismatch { .. })));
}
