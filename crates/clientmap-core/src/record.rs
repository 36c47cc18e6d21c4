//! Client records and pipeline stages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Coordinate, Error, Result};

/// Store-assigned record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sales pipeline stage of a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    #[serde(rename = "Pipeline")]
    Pipeline,
    #[serde(rename = "In Proposal")]
    InProposal,
    #[serde(rename = "POC Stage")]
    PocStage,
    #[serde(rename = "Current Client")]
    CurrentClient,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Pipeline,
        Stage::InProposal,
        Stage::PocStage,
        Stage::CurrentClient,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pipeline => "Pipeline",
            Stage::InProposal => "In Proposal",
            Stage::PocStage => "POC Stage",
            Stage::CurrentClient => "Current Client",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown stage '{}'", s)))
    }
}

/// The user-writable fields of a client record.
///
/// Both create and edit submit a full draft; an edit overwrites every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub salesperson: String,
    #[serde(default)]
    pub stage: Stage,
    pub coordinate: Coordinate,
}

impl RecordDraft {
    /// Validate the draft, trimming the name in place
    pub fn validate(&mut self) -> Result<()> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("client name is required".to_string()));
        }
        if trimmed.len() != self.name.len() {
            self.name = trimmed.to_string();
        }
        if self.salesperson.trim().is_empty() {
            return Err(Error::Validation("salesperson is required".to_string()));
        }
        self.coordinate.validate()
    }
}

/// A persisted client record as delivered by a live snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub salesperson: String,
    pub stage: Stage,
    pub coordinate: Coordinate,
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    /// Materialize a draft under a store-assigned id and timestamp
    pub fn from_draft(id: RecordId, draft: RecordDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            salesperson: draft.salesperson,
            stage: draft.stage,
            coordinate: draft.coordinate,
            created_at,
        }
    }

    /// Full overwrite of the writable fields; id and timestamp survive
    pub fn overwrite(&mut self, draft: RecordDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.salesperson = draft.salesperson;
        self.stage = draft.stage;
        self.coordinate = draft.coordinate;
    }

    /// The draft an edit form starts from
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            salesperson: self.salesperson.clone(),
            stage: self.stage,
            coordinate: self.coordinate,
        }
    }
}

#[cfg(test)]
mod tests;
