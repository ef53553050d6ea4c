// Error type for the section side of a build.
//
// Every failure here ends the section: a manifest key that doesn't resolve,
// a prototype value that doesn't decode, an indicator reapplied zero or
// several times, or unreadable metadata. Tag failures from the text side are
// wrapped so one `?` chain covers both crates.

use crate::manifest::ManifestName;
use crate::prototype::Prototype;
use elven_canopy_tags::TagError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("{manifest} manifest has no entry {key:?}")]
    ManifestMiss { manifest: ManifestName, key: String },

    #[error("cannot build {prototype} from {value}: {reason}")]
    BadPrototypeValue {
        prototype: Prototype,
        value: serde_json::Value,
        reason: String,
    },

    #[error("indicator text {text:?} {reason}")]
    UnsafeText { text: String, reason: &'static str },

    /// After reapplying a memento, the node must carry exactly one reapplied
    /// indicator of its kind.
    #[error(
        "expected one reapplied {kind} in context {context:?}, found {}: [{}]",
        .candidates.len(),
        .candidates.join(", ")
    )]
    ReappliedMultiplicity {
        context: String,
        kind: String,
        candidates: Vec<String>,
    },

    /// Two mementos of one section resolved to the same annotation.
    #[error(
        "conflicting {kind} mementos for context {context:?}: [{}]",
        .candidates.join(", ")
    )]
    ConflictingMementos {
        context: String,
        kind: String,
        candidates: Vec<String>,
    },

    #[error("bad offset {text:?}: {reason}")]
    BadOffset { text: String, reason: &'static str },

    #[error("context {0:?} already exists")]
    DuplicateContext(String),

    /// Only context nodes can have children.
    #[error("node {0} is a leaf, not a context")]
    NotAContext(u32),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_lists_candidates() {
        let err = ScoreError::ReappliedMultiplicity {
            context: "Cello_Staff".to_string(),
            kind: "clef".to_string(),
            candidates: vec!["\\clef \"bass\"".to_string(), "\\clef \"tenor\"".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("found 2"));
        assert!(text.contains("\\clef \"bass\", \\clef \"tenor\""));
    }

    #[test]
    fn test_manifest_miss_names_key() {
        let err = ScoreError::ManifestMiss {
            manifest: ManifestName::Instruments,
            key: "Oboe".to_string(),
        };
        assert_eq!(err.to_string(), "instruments manifest has no entry \"Oboe\"");
    }
}
