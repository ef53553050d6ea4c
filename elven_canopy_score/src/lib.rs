// Elven Canopy score editions: persistent indicators across sections.
//
// A score is built one section at a time, and each section has to start in
// the state the previous one left: same clefs, same dynamic level, same
// instruments and tempo. This crate keeps that bookkeeping. A section's
// indicators are classified as explicit, reapplied or redundant against the
// mementos the previous section persisted, and the section is written out as
// LilyPond text whose every indicator is a tagged region that
// `elven_canopy_tags` can switch per edition.
//
// Architecture:
// - offset.rs: `Offset`, exact rational score time
// - indicator.rs: The closed `Indicator` union, kinds, scopes, persistence
//   equality, LilyPond markup
// - prototype.rs: Prototype key → indicator constructor registry
// - manifest.rs: Named instrument / tempo / short-name tables from JSON
// - document.rs: Arena document (contexts, leaves, annotations)
// - dedup.rs: Which indicator of a kind is in effect at a point
// - memento.rs: `Memento` and end-of-section collection
// - metadata.rs: `SectionMetadata` JSON read/write
// - status.rs: `Status` and its colors and tag words
// - reconcile.rs: Memento classification, reapplication, occurrence
//   classification
// - section.rs: Per-section entry points tying the above together
// - lilypond.rs: Tagged LilyPond output
// - error.rs: `ScoreError`
//
// See also: `elven_canopy_tags` for the edition build that consumes the
// output of `lilypond.rs` and the line breaks in `metadata.rs`.

pub mod dedup;
pub mod document;
pub mod error;
pub mod indicator;
pub mod lilypond;
pub mod manifest;
pub mod memento;
pub mod metadata;
pub mod offset;
pub mod prototype;
pub mod reconcile;
pub mod section;
pub mod status;

pub use document::{Annotation, AnnotationId, Document, NodeId};
pub use error::ScoreError;
pub use indicator::{Indicator, IndicatorKind, Scope};
pub use manifest::{ManifestName, Manifests};
pub use memento::{Memento, Origin, PersistentIndicators};
pub use metadata::SectionMetadata;
pub use offset::Offset;
pub use prototype::{Prototype, PrototypeRegistry};
pub use reconcile::{Classification, classify};
pub use section::{SectionReport, finish_section, reconcile_section};
pub use status::{Status, Treatment};
