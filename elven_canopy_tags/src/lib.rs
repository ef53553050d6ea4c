// Elven Canopy score editions: tagged-region activation.
//
// Sections of a score are rendered once to LilyPond text with every
// edition's material present. Each line that only some builds want carries a
// tag comment (`%! +SCORE:EXPLICIT_CLEF:MEASURE_3`). Building an edition
// flips those lines on and off in place, without re-rendering anything.
//
// Architecture:
// - tag.rs: The `Tag` value type (validated, ordered words joined by `:`)
// - library.rs: Reserved tag words and word families (`MEASURE_<n>`,
//   `EXPLICIT_<STEM>`, ...)
// - predicates.rs: Pure selectors over a tag, including the edition and
//   line-break predicates that capture build state
// - activation.rs: The engine: `activate` / `deactivate` with exact
//   matched/skipped counts, region scanning, tag stripping
// - config.rs: `BuildConfig` (edition target, line breaks, options) from JSON
// - pipeline.rs: The ordered edition build passes
// - error.rs: `TagError` and `BuildError`
//
// The companion crate `elven_canopy_score` produces the tagged text and the
// per-section metadata (line breaks, persistent indicators) this crate reads.

pub mod activation;
pub mod config;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod predicates;
pub mod tag;

pub use activation::{
    Activation, Direction, RegionState, activate, deactivate, deactivate_with_placeholder,
};
pub use config::{BuildConfig, EditionTarget, LineBreaks};
pub use error::{BuildError, TagError};
pub use pipeline::{Pass, Pipeline, PipelineRun, Step, export_untagged};
pub use tag::{SEPARATOR, Tag};
