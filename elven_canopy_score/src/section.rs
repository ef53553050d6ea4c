// Section lifecycle: seed from the previous section, classify, persist.
//
// `reconcile_section` runs once a section's content has been built: every
// memento in the previous section's metadata is classified against the new
// document, then every remaining persistent indicator is classified in
// place. `finish_section` collects the mementos for the next section and
// wraps them with the section's measure range and line breaks.
//
// Sections must run in order: section N+1 starts only from the metadata
// section N wrote.

use crate::document::Document;
use crate::error::ScoreError;
use crate::manifest::Manifests;
use crate::memento::collect_mementos;
use crate::metadata::SectionMetadata;
use crate::prototype::PrototypeRegistry;
use crate::reconcile::{Classification, classify, classify_occurrences};
use crate::status::Status;
use elven_canopy_tags::LineBreaks;
use log::info;

/// Everything classification decided for one section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionReport {
    /// One per memento of the previous section, in metadata order.
    pub mementos: Vec<Classification>,
    /// One per remaining persistent indicator, in attachment order.
    pub occurrences: Vec<Classification>,
}

impl SectionReport {
    pub fn count(&self, status: Status) -> usize {
        self.mementos
            .iter()
            .chain(&self.occurrences)
            .filter(|c| c.status == status)
            .count()
    }
}

/// Classify `doc`'s persistent indicators, seeded by `previous` (none for the
/// first section of a score).
pub fn reconcile_section(
    doc: &mut Document,
    previous: Option<&SectionMetadata>,
    manifests: &Manifests,
    prototypes: &PrototypeRegistry,
) -> Result<SectionReport, ScoreError> {
    let mut report = SectionReport::default();
    if let Some(previous) = previous {
        for memento in previous.persistent_indicators.values().flatten() {
            report
                .mementos
                .push(classify(doc, memento, manifests, prototypes)?);
        }
        info!(
            "reconciled {} memento(s) from section {:?}: {} reapplied, {} explicit, {} redundant, {} dropped",
            report.mementos.len(),
            previous.name,
            report.mementos.iter().filter(|c| c.status == Status::Reapplied).count(),
            report.mementos.iter().filter(|c| c.status == Status::Explicit).count(),
            report.mementos.iter().filter(|c| c.status == Status::Redundant).count(),
            report.mementos.iter().filter(|c| c.status == Status::None).count(),
        );
    }
    report.occurrences = classify_occurrences(doc)?;
    info!(
        "classified {} persistent indicator(s) in section",
        report.occurrences.len()
    );
    Ok(report)
}

/// Metadata for the next section: measure range, line breaks and the
/// indicators still in effect at the end of `doc`.
pub fn finish_section(
    doc: &Document,
    name: &str,
    first_measure_number: u32,
    line_breaks: LineBreaks,
    manifests: &Manifests,
) -> SectionMetadata {
    let final_measure_number = line_breaks
        .final_measure_number
        .unwrap_or(first_measure_number);
    let persistent_indicators = collect_mementos(doc, manifests);
    info!(
        "section {name:?}: persisting indicators for {} context(s)",
        persistent_indicators.len()
    );
    SectionMetadata {
        name: name.to_string(),
        first_measure_number,
        final_measure_number,
        line_breaks,
        persistent_indicators,
    }
}
