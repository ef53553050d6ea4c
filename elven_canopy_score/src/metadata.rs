// Section metadata: the JSON file one section leaves for the next.
//
// Written when section N finishes and read when section N+1 starts. Carries
// the measure range, the line breaks the edition build needs for its layout
// passes, and the persistent indicators (context name → mementos) that seed
// reconciliation in the next section.

use crate::error::ScoreError;
use crate::memento::PersistentIndicators;
use elven_canopy_tags::LineBreaks;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMetadata {
    pub name: String,
    pub first_measure_number: u32,
    pub final_measure_number: u32,
    #[serde(default)]
    pub line_breaks: LineBreaks,
    #[serde(default)]
    pub persistent_indicators: PersistentIndicators,
}

impl SectionMetadata {
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, ScoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn write(&self, path: &Path) -> Result<(), ScoreError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
