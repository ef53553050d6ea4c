// Property tests for the activation engine.
//
// Generates small LilyPond-ish documents mixing untagged lines with tagged
// regions in every state, then checks the algebra the edition builds rely
// on: activation is idempotent, disabling then enabling restores the text
// exactly (with and without placeholders), and every selected region is
// counted exactly once as either matched or skipped.

use elven_canopy_tags::activation::{
    DISABLED_MARKER, RegionState, activate, deactivate, deactivate_with_placeholder, scan,
};
use elven_canopy_tags::predicates::has_word;
use proptest::prelude::*;

const BODIES: [&str; 5] = [
    "c'4",
    "\\clef \"bass\"",
    "\\f",
    "- \\tweak color #red",
    "\\once \\override Staff.Clef.X-extent = ##f",
];
const WORDS: [&str; 5] = ["A", "B", "+SCORE", "-PARTS", "MEASURE_3"];
const INDENTS: [&str; 3] = ["", "    ", "\t\t"];

#[derive(Clone, Debug)]
struct Line {
    indent: usize,
    body: usize,
    words: Vec<usize>,
    tagged: bool,
    disabled: bool,
}

fn line_strategy() -> impl Strategy<Value = Line> {
    (
        0..INDENTS.len(),
        0..BODIES.len(),
        proptest::collection::vec(0..WORDS.len(), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(indent, body, words, tagged, disabled)| Line {
            indent,
            body,
            words,
            tagged,
            disabled,
        })
}

/// Render lines. `force` overrides the disabled flag of lines carrying `A`.
fn render(lines: &[Line], force: Option<bool>) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(INDENTS[line.indent]);
        if line.tagged {
            let words: Vec<&str> = line.words.iter().map(|&i| WORDS[i]).collect();
            let disabled = match force {
                Some(state) if words.contains(&"A") => state,
                _ => line.disabled,
            };
            if disabled {
                text.push_str(DISABLED_MARKER);
            }
            text.push_str(BODIES[line.body]);
            text.push_str(" %! ");
            text.push_str(&words.join(":"));
        } else {
            text.push_str(BODIES[line.body]);
        }
        text.push('\n');
    }
    text
}

proptest! {
    #[test]
    fn activation_is_idempotent(lines in proptest::collection::vec(line_strategy(), 0..12)) {
        let text = render(&lines, None);
        let first = activate(&text, has_word("A")).unwrap();
        let second = activate(&first.text, has_word("A")).unwrap();
        prop_assert_eq!(&second.text, &first.text);
        prop_assert_eq!(second.matched, 0);
        prop_assert_eq!(second.skipped, first.matched + first.skipped);
    }

    #[test]
    fn deactivation_is_idempotent(lines in proptest::collection::vec(line_strategy(), 0..12)) {
        let text = render(&lines, None);
        let first = deactivate(&text, has_word("B")).unwrap();
        let second = deactivate(&first.text, has_word("B")).unwrap();
        prop_assert_eq!(&second.text, &first.text);
        prop_assert_eq!(second.matched, 0);
    }

    #[test]
    fn enable_then_disable_restores_disabled_regions(
        lines in proptest::collection::vec(line_strategy(), 0..12)
    ) {
        let text = render(&lines, Some(true));
        let on = activate(&text, has_word("A")).unwrap();
        let off = deactivate(&on.text, has_word("A")).unwrap();
        prop_assert_eq!(off.text, text);
        prop_assert_eq!(off.matched, on.matched);
    }

    #[test]
    fn disable_then_enable_restores_enabled_regions(
        lines in proptest::collection::vec(line_strategy(), 0..12)
    ) {
        let text = render(&lines, Some(false));
        let off = deactivate(&text, has_word("A")).unwrap();
        let on = activate(&off.text, has_word("A")).unwrap();
        prop_assert_eq!(on.text, text.clone());

        let off = deactivate_with_placeholder(&text, has_word("A")).unwrap();
        let on = activate(&off.text, has_word("A")).unwrap();
        prop_assert_eq!(on.text, text);
    }

    #[test]
    fn every_selected_region_is_counted_once(
        lines in proptest::collection::vec(line_strategy(), 0..12)
    ) {
        let text = render(&lines, None);
        let selected = scan(&text)
            .unwrap()
            .iter()
            .filter(|r| r.tag.contains("A"))
            .count();
        let result = activate(&text, has_word("A")).unwrap();
        prop_assert_eq!(result.matched + result.skipped, selected);

        let enabled_after = scan(&result.text)
            .unwrap()
            .iter()
            .filter(|r| r.tag.contains("A"))
            .all(|r| r.state == RegionState::Enabled);
        prop_assert!(enabled_after);
    }
}
