// Error types for tag validation and edition builds.
//
// `TagError` covers the word-level invariants of `Tag` (no empty words, no
// separator inside a word, no whitespace). `BuildError` wraps everything that
// can go wrong while toggling regions of generated text or loading a build
// configuration: a malformed tag comment on some line, bad JSON, or file I/O.
//
// None of these are recoverable inside a build. Callers propagate them with
// `?` and report once at the top level.

use thiserror::Error;

/// A tag word failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("tag word is empty")]
    EmptyWord,

    #[error("tag word {word:?} contains the reserved separator {separator:?}")]
    ContainsSeparator { word: String, separator: char },

    #[error("tag word {word:?} contains whitespace")]
    ContainsWhitespace { word: String },

    /// An edition target name that can't form a `+NAME` / `-NAME` word.
    #[error("invalid edition name {name:?}: {reason}")]
    InvalidEdition { name: String, reason: String },
}

/// Failure while running activation passes or loading build inputs.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A region's tag comment didn't parse. Line numbers are 1-based.
    #[error("malformed tag on line {line}: {source}")]
    MalformedRegion {
        line: usize,
        #[source]
        source: TagError,
    },

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
