//! Marker projection
//!
//! Maps each client record to the pin the map renders. Projection is pure and
//! recomputed on every snapshot; markers are positionally independent, so
//! their order carries no meaning.

use serde::{Deserialize, Serialize};

use crate::{ClientRecord, Coordinate, RecordId, Stage};

/// Date format used in marker popups, e.g. "Mar 4, 2025"
pub const POPUP_DATE_FORMAT: &str = "%b %-d, %Y";

/// Pin color for a pipeline stage
pub fn stage_color(stage: Stage) -> &'static str {
    match stage {
        Stage::Pipeline => "#3b82f6",
        Stage::InProposal => "#f59e0b",
        Stage::PocStage => "#8b5cf6",
        Stage::CurrentClient => "#10b981",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub stage: Stage,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupContent {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub stage: String,
    pub date: String,
}

/// A map-visible pin for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub record_id: RecordId,
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
}

pub fn project(record: &ClientRecord) -> Marker {
    Marker {
        record_id: record.id.clone(),
        position: record.coordinate,
        icon: MarkerIcon {
            stage: record.stage,
            color: stage_color(record.stage).to_string(),
        },
        popup: PopupContent {
            name: record.name.clone(),
            description: record.description.clone(),
            owner: record.salesperson.clone(),
            stage: record.stage.label().to_string(),
            date: record.created_at.format(POPUP_DATE_FORMAT).to_string(),
        },
    }
}

pub fn project_all(records: &[ClientRecord]) -> Vec<Marker> {
    records.iter().map(project).collect()
}
