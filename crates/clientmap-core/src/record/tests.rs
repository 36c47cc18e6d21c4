//! Tests for client records

use super::*;
use chrono::TimeZone;

fn draft() -> RecordDraft {
    RecordDraft {
        name: "Acme Corp".to_string(),
        description: "HQ in Springfield".to_string(),
        salesperson: "jane@example.com".to_string(),
        stage: Stage::InProposal,
        coordinate: Coordinate::new(39.78, -89.65),
    }
}

#[test]
fn test_stage_labels_round_trip_through_serde() {
    for stage in Stage::ALL {
        let json = serde_json::to_string(&stage).unwrap();
        assert_eq!(json, format!("\"{}\"", stage.label()));
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stage);
    }
}

#[test]
fn test_stage_rejects_unknown_label() {
    assert!(serde_json::from_str::<Stage>("\"Lost\"").is_err());
    assert!("Lost".parse::<Stage>().is_err());
}

#[test]
fn test_stage_from_str_is_case_insensitive() {
    assert_eq!("poc stage".parse::<Stage>().unwrap(), Stage::PocStage);
    assert_eq!(" Current Client ".parse::<Stage>().unwrap(), Stage::CurrentClient);
}

#[test]
fn test_draft_validation_trims_name() {
    let mut d = draft();
    d.name = "  Acme Corp  ".to_string();
    d.validate().unwrap();
    assert_eq!(d.name, "Acme Corp");
}

#[test]
fn test_draft_validation_rejects_blank_name() {
    let mut d = draft();
    d.name = "   ".to_string();
    assert!(matches!(d.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_draft_validation_rejects_bad_coordinate() {
    let mut d = draft();
    d.coordinate = Coordinate::new(120.0, 0.0);
    assert!(matches!(d.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_overwrite_keeps_identity_and_timestamp() {
    let created = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();
    let id = RecordId::from_string("rec-1");
    let mut record = ClientRecord::from_draft(id.clone(), draft(), created);

    let mut edit = draft();
    edit.name = "Acme Holdings".to_string();
    edit.stage = Stage::CurrentClient;
    record.overwrite(edit.clone());

    assert_eq!(record.id, id);
    assert_eq!(record.created_at, created);
    assert_eq!(record.to_draft(), edit);
}

#[test]
fn test_generated_ids_are_unique() {
    assert_ne!(RecordId::generate(), RecordId::generate());
}

#[test]
fn test_draft_defaults_stage_and_description() {
    let json = serde_json::json!({
        "name": "Globex",
        "salesperson": "hank@example.com",
        "coordinate": {"lat": 1.0, "lng": 2.0}
    });
    let d: RecordDraft = serde_json::from_value(json).unwrap();
    assert_eq!(d.stage, Stage::Pipeline);
    assert!(d.description.is_empty());
}
