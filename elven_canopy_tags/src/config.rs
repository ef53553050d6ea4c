// Data-driven build configuration.
//
// `BuildConfig` says which edition is being built and how the engraved lines
// fell, loaded from JSON like every other tunable input in this workspace:
//
// ```json
// {
//   "edition": { "edition": "PARTS", "identifier": "PARTS_CELLO" },
//   "line_breaks": { "bol_measure_numbers": [1, 6], "final_measure_number": 10 },
//   "color_persistent_indicators": false,
//   "suppress_redundant": true
// }
// ```
//
// `EditionTarget` is the audience: an edition name (`SCORE`, `SECTION`,
// `PARTS`, ...) plus an optional build identifier naming one concrete build
// (`PARTS_CELLO`). It owns the four edition words the filtering pass
// compares against.
//
// `LineBreaks` records the measure numbers that begin a system line after
// layout. End-of-line measures are derived from it: every beginning-of-line
// measure except the first, minus one, plus the final measure.
//
// See also: `pipeline.rs`, which consumes all of this, and
// `elven_canopy_score::metadata` where line breaks are stored per section.

use crate::error::{BuildError, TagError};
use crate::tag::validate_word;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Edition target
// ---------------------------------------------------------------------------

/// The audience of one build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionTarget {
    /// Edition name without sign, e.g. `SCORE`.
    pub edition: String,
    /// Optional build identifier without sign, e.g. `PARTS_CELLO`.
    #[serde(default)]
    pub identifier: Option<String>,
}

impl EditionTarget {
    pub fn new(edition: &str) -> Result<Self, TagError> {
        let target = Self {
            edition: edition.to_string(),
            identifier: None,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_identifier(edition: &str, identifier: &str) -> Result<Self, TagError> {
        let target = Self {
            edition: edition.to_string(),
            identifier: Some(identifier.to_string()),
        };
        target.validate()?;
        Ok(target)
    }

    /// Names must be valid tag words and must not carry their own sign.
    pub fn validate(&self) -> Result<(), TagError> {
        for name in std::iter::once(&self.edition).chain(self.identifier.iter()) {
            validate_word(name).map_err(|e| TagError::InvalidEdition {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            if name.starts_with('+') || name.starts_with('-') {
                return Err(TagError::InvalidEdition {
                    name: name.clone(),
                    reason: "edition names are written without a sign".into(),
                });
            }
        }
        Ok(())
    }

    /// True when an edition word (`+X` / `-X`) names this build's audience.
    pub fn is_mine(&self, edition_word: &str) -> bool {
        let Some(name) = edition_word.get(1..) else {
            return false;
        };
        self.names().any(|n| n == name)
    }

    fn names(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.edition).chain(self.identifier.iter())
    }
}

// ---------------------------------------------------------------------------
// Line breaks
// ---------------------------------------------------------------------------

/// Where system lines start, as recorded after layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreaks {
    /// Measure numbers that begin a line, ascending. The first entry is the
    /// first measure of the section.
    #[serde(default)]
    pub bol_measure_numbers: Vec<u32>,
    /// Last measure of the section; always ends a line.
    #[serde(default)]
    pub final_measure_number: Option<u32>,
}

impl LineBreaks {
    pub fn new(bol_measure_numbers: Vec<u32>, final_measure_number: Option<u32>) -> Self {
        Self {
            bol_measure_numbers,
            final_measure_number,
        }
    }

    /// Measure numbers that end a line.
    pub fn eol_measure_numbers(&self) -> Vec<u32> {
        let mut eol: Vec<u32> = self
            .bol_measure_numbers
            .iter()
            .skip(1)
            .filter_map(|n| n.checked_sub(1))
            .collect();
        if let Some(last) = self.final_measure_number.filter(|n| !eol.contains(n)) {
            eol.push(last);
        }
        eol
    }

    pub fn is_bol(&self, measure: u32) -> bool {
        self.bol_measure_numbers.contains(&measure)
    }
}

// ---------------------------------------------------------------------------
// Build configuration
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Everything the edition pipeline needs besides the text itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub edition: EditionTarget,
    #[serde(default)]
    pub line_breaks: LineBreaks,
    /// Show status colors on persistent indicators. Section proofs want
    /// them; final scores and parts don't.
    #[serde(default = "default_true")]
    pub color_persistent_indicators: bool,
    /// Disable `REDUNDANT_<STEM>` regions.
    #[serde(default = "default_true")]
    pub suppress_redundant: bool,
}

impl BuildConfig {
    pub fn new(edition: EditionTarget) -> Self {
        Self {
            edition,
            line_breaks: LineBreaks::default(),
            color_persistent_indicators: true,
            suppress_redundant: true,
        }
    }

    pub fn with_line_breaks(mut self, line_breaks: LineBreaks) -> Self {
        self.line_breaks = line_breaks;
        self
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.edition.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
