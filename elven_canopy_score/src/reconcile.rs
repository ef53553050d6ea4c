// Reconciliation: classify every persistent indicator of a section.
//
// Two passes run at the start of a section, after its content exists:
//
// 1. Each memento from the previous section is compared with what is in
//    effect at the first node of its context. Nothing there: the indicator
//    is reapplied at synthetic offset -1 (tracked, never printed). Something
//    different: the section states its own value (explicit). Something
//    equal: redundant, except that an equal time signature counts as
//    reapplied. A memento whose context is gone is dropped.
// 2. Every other persistent indicator in the section is compared with the
//    indicator in effect just before it: nothing or something different is
//    explicit, something equal is redundant.
//
// Classification marks the annotation with its `Treatment` and adds the
// `<STATUS>_<STEM>` word to its tag. After a reapplication the node must
// carry exactly one reapplied indicator of that kind for that context, and
// no annotation is classified by two mementos.

use crate::dedup::{effective_at, effective_before};
use crate::document::{AnnotationId, Document, NodeId};
use crate::error::ScoreError;
use crate::indicator::{Indicator, IndicatorKind};
use crate::manifest::Manifests;
use crate::memento::Memento;
use crate::offset::Offset;
use crate::prototype::PrototypeRegistry;
use crate::status::{Status, Treatment};
use log::debug;

/// Where a reapplied indicator sits: before anything written in the section.
pub const REAPPLIED_OFFSET: Offset = Offset::whole(-1);

/// The outcome for one memento or one in-section occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub context: String,
    pub kind: IndicatorKind,
    pub status: Status,
    /// The classified annotation; `None` for `Status::None`.
    pub annotation: Option<AnnotationId>,
}

/// Mark `id` with `status`: set its treatment and add the status word to
/// its tag.
pub fn apply_treatment(doc: &mut Document, id: AnnotationId, status: Status) -> Result<(), ScoreError> {
    let annotation = doc.annotation_mut(id);
    let Some(treatment) = Treatment::new(status, &annotation.indicator) else {
        return Ok(());
    };
    if !annotation.tag.contains(&treatment.status_word) {
        annotation.tag = annotation.tag.append(&treatment.status_word)?;
    }
    annotation.treatment = Some(treatment);
    Ok(())
}

fn reapplied_at(doc: &Document, node: NodeId, context: &str, kind: IndicatorKind) -> Vec<AnnotationId> {
    doc.annotations_at(node)
        .iter()
        .copied()
        .filter(|&id| {
            let annotation = doc.annotation(id);
            annotation.context == context
                && annotation.indicator.kind() == kind
                && annotation
                    .treatment
                    .as_ref()
                    .is_some_and(|t| t.status == Status::Reapplied)
        })
        .collect()
}

fn reapply(
    doc: &mut Document,
    memento: &Memento,
    indicator: Indicator,
    node: NodeId,
) -> Result<AnnotationId, ScoreError> {
    let kind = indicator.kind();
    let tag = memento.edition.clone().unwrap_or_default();
    let id = doc.attach_to_context(indicator, node, &memento.context, tag);
    doc.annotation_mut(id).synthetic_offset = Some(REAPPLIED_OFFSET);
    apply_treatment(doc, id, Status::Reapplied)?;

    let reapplied = reapplied_at(doc, node, &memento.context, kind);
    if reapplied.len() != 1 {
        return Err(ScoreError::ReappliedMultiplicity {
            context: memento.context.clone(),
            kind: kind.to_string(),
            candidates: reapplied
                .iter()
                .map(|&r| doc.annotation(r).indicator.to_string())
                .collect(),
        });
    }
    Ok(id)
}

/// Classify one memento against `doc`, reapplying it if nothing is in
/// effect at the start of its context.
pub fn classify(
    doc: &mut Document,
    memento: &Memento,
    manifests: &Manifests,
    prototypes: &PrototypeRegistry,
) -> Result<Classification, ScoreError> {
    let indicator = memento.indicator(manifests, prototypes)?;
    let kind = indicator.kind();
    let context = memento.context.clone();

    let Some(context_id) = doc.context(&context) else {
        debug!("dropping {kind} memento for missing context {context:?}");
        return Ok(Classification {
            context,
            kind,
            status: Status::None,
            annotation: None,
        });
    };
    let node = doc.first_node(context_id);
    let at = doc.node(node).start;

    let (status, id) = match effective_at(doc, &context, kind, at) {
        None => (Status::Reapplied, reapply(doc, memento, indicator, node)?),
        Some(id) => {
            let current = doc.annotation(id);
            // Treated already: an earlier memento for this context and kind
            // got here first, so the snapshot holds two values for one slot.
            if let Some(treatment) = &current.treatment {
                let candidates = vec![current.indicator.to_string(), indicator.to_string()];
                return Err(if treatment.status == Status::Reapplied {
                    ScoreError::ReappliedMultiplicity {
                        context,
                        kind: kind.to_string(),
                        candidates,
                    }
                } else {
                    ScoreError::ConflictingMementos {
                        context,
                        kind: kind.to_string(),
                        candidates,
                    }
                });
            }
            let current = &current.indicator;
            let status = if !current.persistent_eq(&indicator) {
                Status::Explicit
            } else if kind == IndicatorKind::TimeSignature {
                Status::Reapplied
            } else {
                Status::Redundant
            };
            apply_treatment(doc, id, status)?;
            (status, id)
        }
    };
    debug!("{context}: {kind} {} is {status}", doc.annotation(id).indicator);
    Ok(Classification {
        context,
        kind,
        status,
        annotation: Some(id),
    })
}

/// Classify every annotation that has no treatment yet against the
/// indicator in effect just before it.
pub fn classify_occurrences(doc: &mut Document) -> Result<Vec<Classification>, ScoreError> {
    let mut classifications = Vec::new();
    for id in doc.annotation_ids() {
        let annotation = doc.annotation(id);
        if annotation.treatment.is_some() || annotation.is_bookkeeping_only() {
            continue;
        }
        let status = match effective_before(doc, id) {
            Some(previous)
                if doc
                    .annotation(previous)
                    .indicator
                    .persistent_eq(&annotation.indicator) =>
            {
                Status::Redundant
            }
            _ => Status::Explicit,
        };
        let classification = Classification {
            context: annotation.context.clone(),
            kind: annotation.indicator.kind(),
            status,
            annotation: Some(id),
        };
        debug!(
            "{}: {} {} is {status}",
            classification.context, classification.kind, annotation.indicator
        );
        apply_treatment(doc, id, status)?;
        classifications.push(classification);
    }
    Ok(classifications)
}
