// LilyPond output for section documents.
//
// Walks the document tree and writes nested `\context` blocks: contexts
// holding other contexts become simultaneous `<< >>` blocks, contexts
// holding leaves become sequential `{ }` blocks. Leaves print their body, or
// a spacer skip when they have none.
//
// Every annotation becomes one or more tagged regions (see
// `elven_canopy_tags::activation`) so edition builds can switch them later:
//
//     \once \override Staff.Clef.color = #(x11-color 'blue) %! EXPLICIT_CLEF_COLOR
//     \clef "bass" %! EXPLICIT_CLEF
//     c4
//     \f %! -PARTS:EXPLICIT_DYNAMIC
//
// Color overrides and prefix commands go before the leaf, dynamics and
// hairpins after it. Deactivated annotations are written disabled, and
// bookkeeping-only annotations (negative synthetic offset) contribute their
// color lines but no indicator markup.

use crate::document::{AnnotationId, Document, NodeId, NodeKind};
use crate::error::ScoreError;
use crate::offset::Offset;
use elven_canopy_tags::activation::{RegionState, format_region};
use elven_canopy_tags::Tag;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Durations a spacer skip can spell directly, as (numerator, denominator,
/// LilyPond duration).
const SKIP_TABLE: [(i64, i64, &str); 7] = [
    (1, 1, "1"),
    (3, 4, "2."),
    (1, 2, "2"),
    (3, 8, "4."),
    (1, 4, "4"),
    (1, 8, "8"),
    (1, 16, "16"),
];

/// A spacer skip lasting `duration` (`s4`, `s2.`, or `s1 * 5/8`).
pub fn skip(duration: Offset) -> String {
    for &(num, den, text) in &SKIP_TABLE {
        if duration == Offset::new(num, den) {
            return format!("s{text}");
        }
    }
    format!("s1 * {duration}")
}

fn region_line(indent: &str, content: &str, tag: &Tag, deactivated: bool) -> String {
    if tag.is_empty() && !deactivated {
        return format!("{indent}{content}");
    }
    let state = if deactivated {
        RegionState::Disabled
    } else {
        RegionState::Enabled
    };
    format_region(indent, content, tag, state)
}

/// Region lines for one annotation: (lines before its leaf, lines after).
pub fn annotation_lines(
    doc: &Document,
    id: AnnotationId,
    indent: &str,
) -> Result<(Vec<String>, Vec<String>), ScoreError> {
    let annotation = doc.annotation(id);
    let kind = annotation.indicator.kind();
    let scope = kind.default_scope().lilypond_type();
    let editions = annotation.tag.editions();
    let mut before = Vec::new();
    let mut after = Vec::new();

    if let Some(treatment) = &annotation.treatment {
        if let Some((color, word)) = &treatment.color {
            let content = format!(
                "\\once \\override {scope}.{}.color = #(x11-color '{color})",
                kind.grob()
            );
            let tag = editions.append(word)?;
            before.push(region_line(indent, &content, &tag, annotation.deactivated));
        }
        if let Some((color, word)) = &treatment.redraw_color {
            let content = format!(
                "\\override {scope}.{}.color = #(x11-color '{color})",
                kind.grob()
            );
            let tag = editions.append(word)?;
            before.push(region_line(indent, &content, &tag, annotation.deactivated));
        }
    }

    if !annotation.is_bookkeeping_only() {
        let line = region_line(
            indent,
            &annotation.indicator.lilypond(),
            &annotation.tag,
            annotation.deactivated,
        );
        if annotation.indicator.is_post_event() {
            after.push(line);
        } else {
            before.push(line);
        }
    }
    Ok((before, after))
}

fn render_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) -> Result<(), ScoreError> {
    let indent = INDENT.repeat(depth);
    let node = doc.node(id);
    match &node.kind {
        NodeKind::Leaf { duration, body } => {
            let mut before = Vec::new();
            let mut after = Vec::new();
            for &annotation in doc.annotations_at(id) {
                let (b, a) = annotation_lines(doc, annotation, &indent)?;
                before.extend(b);
                after.extend(a);
            }
            for line in &before {
                let _ = writeln!(out, "{line}");
            }
            match body {
                Some(body) => {
                    let _ = writeln!(out, "{indent}{body}");
                }
                None => {
                    let _ = writeln!(out, "{indent}{}", skip(*duration));
                }
            }
            for line in &after {
                let _ = writeln!(out, "{line}");
            }
        }
        NodeKind::Context {
            name,
            lilypond_type,
        } => {
            let sequential = node.children.iter().any(|&c| doc.node(c).is_leaf());
            let (open, close) = if sequential { ("{", "}") } else { ("<<", ">>") };
            let _ = writeln!(out, "{indent}\\context {lilypond_type} = \"{name}\"");
            let _ = writeln!(out, "{indent}{open}");
            // A context's own annotations are written in its body so they
            // are indented like the music they govern.
            let inner = INDENT.repeat(depth + 1);
            for &annotation in doc.annotations_at(id) {
                let (b, a) = annotation_lines(doc, annotation, &inner)?;
                for line in b.iter().chain(&a) {
                    let _ = writeln!(out, "{line}");
                }
            }
            for &child in &node.children {
                render_node(doc, child, depth + 1, out)?;
            }
            let _ = writeln!(out, "{indent}{close}");
        }
    }
    Ok(())
}

/// The whole document as LilyPond text.
pub fn document_to_lilypond(doc: &Document) -> Result<String, ScoreError> {
    let mut ly = String::new();
    render_node(doc, doc.root(), 0, &mut ly)?;
    Ok(ly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::Indicator;
    use crate::reconcile::{REAPPLIED_OFFSET, apply_treatment};
    use crate::status::Status;

    #[test]
    fn test_skip() {
        assert_eq!(skip(Offset::new(1, 4)), "s4");
        assert_eq!(skip(Offset::new(3, 4)), "s2.");
        assert_eq!(skip(Offset::new(5, 8)), "s1 * 5/8");
        assert_eq!(skip(Offset::whole(2)), "s1 * 2");
    }

    #[test]
    fn test_document_structure() {
        let mut doc = Document::new("Score", "Score");
        let staff = doc.add_context(doc.root(), "Cello_Staff", "Staff").unwrap();
        let voice = doc.add_context(staff, "Cello_Voice", "Voice").unwrap();
        let note = doc.add_leaf(voice, Offset::new(1, 4), Some("c4")).unwrap();
        doc.add_leaf(voice, Offset::new(1, 4), None).unwrap();
        let clef = doc.attach(
            Indicator::Clef {
                name: "bass".to_string(),
            },
            note,
            Tag::empty(),
        );
        apply_treatment(&mut doc, clef, Status::Explicit).unwrap();
        let forte = doc.attach(
            Indicator::Dynamic {
                name: "f".to_string(),
            },
            note,
            Tag::parse("-PARTS").unwrap(),
        );
        doc.annotation_mut(forte).deactivated = true;

        let expected = "\
\\context Score = \"Score\"
<<
    \\context Staff = \"Cello_Staff\"
    <<
        \\context Voice = \"Cello_Voice\"
        {
            \\once \\override Staff.Clef.color = #(x11-color 'blue) %! EXPLICIT_CLEF_COLOR
            \\clef \"bass\" %! EXPLICIT_CLEF
            c4
            %@% \\f %! -PARTS
            s4
        }
    >>
>>
";
        assert_eq!(document_to_lilypond(&doc).unwrap(), expected);
    }

    #[test]
    fn test_bookkeeping_only_emits_color_but_no_markup() {
        let mut doc = Document::new("Staff", "Staff");
        let note = doc.add_leaf(doc.root(), Offset::new(1, 2), Some("c2")).unwrap();
        let clef = doc.attach(
            Indicator::Clef {
                name: "treble".to_string(),
            },
            note,
            Tag::empty(),
        );
        doc.annotation_mut(clef).synthetic_offset = Some(REAPPLIED_OFFSET);
        apply_treatment(&mut doc, clef, Status::Reapplied).unwrap();

        let (before, after) = annotation_lines(&doc, clef, "").unwrap();
        assert_eq!(
            before,
            vec!["\\once \\override Staff.Clef.color = #(x11-color 'green4) %! REAPPLIED_CLEF_COLOR"]
        );
        assert!(after.is_empty());
    }
}
