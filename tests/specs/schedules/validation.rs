//! Document-level validation: raw JSON in, precise errors out.

use rota_core::schedule::{ScheduleConfig, SchedulesConfig};
use rota_core::SchemaError;

fn parse_config(json: &str) -> Result<ScheduleConfig, String> {
    serde_json::from_str::<ScheduleConfig>(json).map_err(|e| e.to_string())
}

#[test]
fn literal_false_disables_scheduling() {
    let doc: SchedulesConfig = serde_json::from_str("false").unwrap();
    assert_eq!(doc, SchedulesConfig::Disabled);
}

#[test]
fn literal_true_is_rejected_with_guidance() {
    let err = serde_json::from_str::<SchedulesConfig>("true").unwrap_err();
    assert!(err.to_string().contains("use false to disable"));
}

#[test]
fn document_must_be_a_list_or_false() {
    assert!(serde_json::from_str::<SchedulesConfig>("{}").is_err());
    assert!(serde_json::from_str::<SchedulesConfig>("\"hourly\"").is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = parse_config(r#"{"tasks": "movies", "interval": {"hours": 1}, "color": "red"}"#)
        .unwrap_err();
    assert!(err.contains("color"));
}

#[test]
fn unknown_interval_units_are_rejected() {
    let err =
        parse_config(r#"{"tasks": "movies", "interval": {"fortnights": 1}}"#).unwrap_err();
    assert!(err.contains("fortnights"));
}

#[test]
fn both_triggers_conflict() {
    let config = parse_config(
        r#"{"tasks": "movies", "interval": {"hours": 1}, "schedule": {"hour": 3}}"#,
    )
    .unwrap();
    assert!(matches!(
        config.validate(),
        Err(SchemaError::TriggerConflict)
    ));
}

#[test]
fn a_trigger_is_required() {
    let config = parse_config(r#"{"tasks": "movies"}"#).unwrap();
    assert!(matches!(
        config.validate(),
        Err(SchemaError::TriggerRequired)
    ));
}

#[test]
fn cron_field_errors_name_the_offending_key() {
    let config =
        parse_config(r#"{"tasks": "movies", "schedule": {"month": 13, "hour": 3}}"#).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("month"));

    let config =
        parse_config(r#"{"tasks": "movies", "schedule": {"week": 54}}"#).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("week"));
}

#[test]
fn interval_must_set_exactly_one_unit() {
    let config =
        parse_config(r#"{"tasks": "movies", "interval": {"hours": 1, "days": 1}}"#).unwrap();
    assert!(matches!(config.validate(), Err(SchemaError::IntervalUnit)));

    let config = parse_config(r#"{"tasks": "movies", "interval": {"hours": 0}}"#).unwrap();
    assert!(matches!(
        config.validate(),
        Err(SchemaError::IntervalAmount { .. })
    ));
}
