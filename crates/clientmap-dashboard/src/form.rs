//! The create/edit form

use clientmap_core::{ClientRecord, Coordinate, RecordDraft, RecordId, Stage};

/// An open record form.
///
/// `editing` names the record an edit will overwrite; without it the form
/// creates a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordForm {
    pub draft: RecordDraft,
    pub editing: Option<RecordId>,
}

impl RecordForm {
    /// Blank form for a new record at `coordinate`, owned by `salesperson`
    pub fn create_at(coordinate: Coordinate, salesperson: impl Into<String>) -> Self {
        Self {
            draft: RecordDraft {
                name: String::new(),
                description: String::new(),
                salesperson: salesperson.into(),
                stage: Stage::default(),
                coordinate,
            },
            editing: None,
        }
    }

    /// Form pre-filled with an existing record
    pub fn edit(record: &ClientRecord) -> Self {
        Self {
            draft: record.to_draft(),
            editing: Some(record.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_create_form_prefills_coordinate_and_owner() {
        let form = RecordForm::create_at(Coordinate::new(1.5, 2.5), "jane@example.com");
        assert!(!form.is_editing());
        assert_eq!(form.draft.coordinate, Coordinate::new(1.5, 2.5));
        assert_eq!(form.draft.salesperson, "jane@example.com");
        assert_eq!(form.draft.stage, Stage::Pipeline);
        assert!(form.draft.name.is_empty());
    }

    #[test]
    fn test_edit_form_prefills_every_field() {
        let record = ClientRecord {
            id: RecordId::from_string("r9"),
            name: "Hooli".to_string(),
            description: "Palo Alto".to_string(),
            salesperson: "gavin@example.com".to_string(),
            stage: Stage::PocStage,
            coordinate: Coordinate::new(37.44, -122.14),
            created_at: Utc::now(),
        };
        let form = RecordForm::edit(&record);
        assert_eq!(form.editing, Some(record.id.clone()));
        assert_eq!(form.draft, record.to_draft());
    }
}
