// Effective-indicator selection.
//
// Several indicators of one kind can govern the same context at the same
// point: a reapplied clef at -1 and an explicit clef on the first note, or a
// dynamic and a hairpin start on one note. Exactly one of them is "in
// effect". The rule, applied everywhere the question comes up:
//
// 1. the latest site offset wins (synthetic offset if set, else node start);
// 2. on an exact tie, a dynamic sharing its site with a hairpin start beats
//    a span marker, which beats a plain value;
// 3. remaining ties go to the later attachment.
//
// The rule is a total order on annotations (`SelectionKey`), so "effective
// at an offset" and "effective just before this annotation" are both a `max`
// over the right candidates.

use crate::document::{AnnotationId, Document};
use crate::indicator::{Indicator, IndicatorKind};
use crate::offset::Offset;

/// Orders candidate annotations; the greatest key is in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionKey {
    pub site: Offset,
    pub rank: u8,
    pub id: AnnotationId,
}

fn shares_site_with_hairpin_start(doc: &Document, id: AnnotationId) -> bool {
    let annotation = doc.annotation(id);
    let site = doc.site_offset(id);
    doc.annotations_at(annotation.node).iter().any(|&other| {
        let candidate = doc.annotation(other);
        other != id
            && matches!(candidate.indicator, Indicator::StartHairpin { .. })
            && candidate.context == annotation.context
            && doc.site_offset(other) == site
    })
}

fn tie_rank(doc: &Document, id: AnnotationId) -> u8 {
    let indicator = &doc.annotation(id).indicator;
    if matches!(indicator, Indicator::Dynamic { .. }) && shares_site_with_hairpin_start(doc, id) {
        2
    } else if indicator.is_span_marker() {
        1
    } else {
        0
    }
}

pub fn selection_key(doc: &Document, id: AnnotationId) -> SelectionKey {
    SelectionKey {
        site: doc.site_offset(id),
        rank: tie_rank(doc, id),
        id,
    }
}

fn candidates<'a>(
    doc: &'a Document,
    context: &'a str,
    kind: IndicatorKind,
) -> impl Iterator<Item = SelectionKey> + 'a {
    doc.annotation_ids()
        .filter(move |&id| {
            let annotation = doc.annotation(id);
            annotation.context == context && annotation.indicator.kind() == kind
        })
        .map(move |id| selection_key(doc, id))
}

/// The indicator of `kind` in effect for `context` at offset `at`.
pub fn effective_at(
    doc: &Document,
    context: &str,
    kind: IndicatorKind,
    at: Offset,
) -> Option<AnnotationId> {
    candidates(doc, context, kind)
        .filter(|key| key.site <= at)
        .max()
        .map(|key| key.id)
}

/// The indicator of `kind` in effect for `context` once the section is over.
pub fn effective_at_end(doc: &Document, context: &str, kind: IndicatorKind) -> Option<AnnotationId> {
    candidates(doc, context, kind).max().map(|key| key.id)
}

/// The indicator in effect immediately before `id` took over, in `id`'s own
/// context and kind.
pub fn effective_before(doc: &Document, id: AnnotationId) -> Option<AnnotationId> {
    let annotation = doc.annotation(id);
    let own = selection_key(doc, id);
    candidates(doc, &annotation.context, annotation.indicator.kind())
        .filter(|key| *key < own)
        .max()
        .map(|key| key.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeId;
    use elven_canopy_tags::Tag;

    fn voice_doc() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new("Score", "Score");
        let staff = doc.add_context(doc.root(), "Staff", "Staff").unwrap();
        let voice = doc.add_context(staff, "Voice", "Voice").unwrap();
        for _ in 0..4 {
            doc.add_leaf(voice, Offset::new(1, 4), Some("c4")).unwrap();
        }
        let leaves = doc.leaves(voice);
        (doc, leaves)
    }

    fn dynamic(name: &str) -> Indicator {
        Indicator::Dynamic {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_hairpin_start_and_dynamic_dedup_to_dynamic() {
        let (mut doc, leaves) = voice_doc();
        let f = doc.attach(dynamic("f"), leaves[1], Tag::empty());
        let hairpin = doc.attach(
            Indicator::StartHairpin {
                shape: "<".to_string(),
            },
            leaves[1],
            Tag::empty(),
        );
        let at = doc.node(leaves[1]).start;
        assert_eq!(effective_at(&doc, "Voice", IndicatorKind::Dynamic, at), Some(f));
        // The hairpin took over from nothing; the dynamic from the hairpin.
        assert_eq!(effective_before(&doc, hairpin), None);
        assert_eq!(effective_before(&doc, f), Some(hairpin));
    }

    #[test]
    fn test_later_site_wins() {
        let (mut doc, leaves) = voice_doc();
        let p = doc.attach(dynamic("p"), leaves[0], Tag::empty());
        let f = doc.attach(dynamic("f"), leaves[2], Tag::empty());
        let kind = IndicatorKind::Dynamic;
        assert_eq!(effective_at(&doc, "Voice", kind, Offset::new(1, 4)), Some(p));
        assert_eq!(effective_at(&doc, "Voice", kind, Offset::new(1, 2)), Some(f));
        assert_eq!(effective_at_end(&doc, "Voice", kind), Some(f));
        assert_eq!(effective_before(&doc, f), Some(p));
        assert_eq!(effective_at(&doc, "Staff", kind, Offset::new(1, 2)), None);
    }

    #[test]
    fn test_synthetic_offset_loses_to_real_start() {
        let (mut doc, leaves) = voice_doc();
        let explicit = doc.attach(
            Indicator::Clef {
                name: "bass".to_string(),
            },
            leaves[0],
            Tag::empty(),
        );
        let reapplied = doc.attach(
            Indicator::Clef {
                name: "treble".to_string(),
            },
            leaves[0],
            Tag::empty(),
        );
        doc.annotation_mut(reapplied).synthetic_offset = Some(Offset::whole(-1));
        let kind = IndicatorKind::Clef;
        assert_eq!(effective_at(&doc, "Staff", kind, Offset::ZERO), Some(explicit));
        assert_eq!(effective_before(&doc, explicit), Some(reapplied));
    }

    #[test]
    fn test_later_attachment_breaks_remaining_ties() {
        let (mut doc, leaves) = voice_doc();
        doc.attach(dynamic("p"), leaves[0], Tag::empty());
        let second = doc.attach(dynamic("mp"), leaves[0], Tag::empty());
        let kind = IndicatorKind::Dynamic;
        assert_eq!(effective_at(&doc, "Voice", kind, Offset::ZERO), Some(second));
    }

    #[test]
    fn test_span_marker_beats_plain_value_at_tie() {
        let (mut doc, leaves) = voice_doc();
        let stop = doc.attach(Indicator::StopHairpin, leaves[3], Tag::empty());
        doc.attach(dynamic("p"), leaves[3], Tag::empty());
        let kind = IndicatorKind::Dynamic;
        assert_eq!(effective_at_end(&doc, "Voice", kind), Some(stop));
    }
}
