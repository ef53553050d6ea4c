// Predicate library: pure selectors over a region's tag.
//
// Every activation pass is "flip the regions this predicate picks", so the
// interesting logic of a pass is its predicate. Plain predicates are `fn`s
// over `&Tag`; predicates that depend on the build (edition target, line
// breaks) are constructors returning closures that capture what they need.
// Everything here is side-effect free and can be passed straight to
// `activation::activate` / `deactivate`.
//
// Measure-based predicates read the region's `MEASURE_<n>` word. A region
// without one is never selected for deactivation by them: without a measure
// there is no way to know where on the line it falls.

use crate::config::{EditionTarget, LineBreaks};
use crate::library::{
    FERMATA_MEASURE_EMPTY_BAR_EXTENT, FERMATA_MEASURE_NEXT_BAR_EXTENT,
    HIDE_TO_JOIN_BROKEN_SPANNERS, NOT_MOL, ONLY_MOL, REDUNDANT_PREFIX, SHIFTED_CLEF,
    SHOW_TO_JOIN_BROKEN_SPANNERS, is_status_color_word,
};
use crate::tag::{Tag, is_edition_word};

/// Selects regions carrying `word`.
pub fn has_word(word: &str) -> impl Fn(&Tag) -> bool + '_ {
    move |tag| tag.contains(word)
}

// ---------------------------------------------------------------------------
// Editions
// ---------------------------------------------------------------------------

/// Regions to switch off for `target`: tagged against my edition or build
/// identifier, or tagged for some other audience.
pub fn excluded_from(target: &EditionTarget) -> impl Fn(&Tag) -> bool + '_ {
    move |tag| {
        tag.words().iter().filter(|w| is_edition_word(w)).any(|w| {
            if w.starts_with('-') {
                target.is_mine(w)
            } else {
                !target.is_mine(w)
            }
        })
    }
}

/// Regions to switch on for `target`: explicitly tagged for me, or tagged
/// only against other audiences.
///
/// A region carrying `+OTHER` stays off even if it also carries `-ANOTHER`;
/// the inclusion tag names its audience precisely.
pub fn included_in(target: &EditionTarget) -> impl Fn(&Tag) -> bool + '_ {
    move |tag| {
        let mut excludes_me = false;
        let mut excludes_other = false;
        let mut includes_other = false;
        for word in tag.words().iter().filter(|w| is_edition_word(w)) {
            let mine = target.is_mine(word);
            match (word.starts_with('+'), mine) {
                (true, true) => return true,
                (true, false) => includes_other = true,
                (false, true) => excludes_me = true,
                (false, false) => excludes_other = true,
            }
        }
        excludes_other && !excludes_me && !includes_other
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub fn is_fermata_bar_line(tag: &Tag) -> bool {
    tag.contains(FERMATA_MEASURE_EMPTY_BAR_EXTENT) || tag.contains(FERMATA_MEASURE_NEXT_BAR_EXTENT)
}

/// Fermata bar-line adjustments on measures that don't end a line.
pub fn fermata_bar_line_off_line_end(breaks: &LineBreaks) -> impl Fn(&Tag) -> bool {
    let eol = breaks.eol_measure_numbers();
    move |tag| {
        is_fermata_bar_line(tag) && tag.measure_number().is_some_and(|n| !eol.contains(&n))
    }
}

pub fn is_shifted_clef(tag: &Tag) -> bool {
    tag.contains(SHIFTED_CLEF)
}

/// Shifted clefs that land at the start of a line, where the shift would
/// push them away from the staff's left edge.
pub fn shifted_clef_at_line_start(breaks: &LineBreaks) -> impl Fn(&Tag) -> bool + '_ {
    move |tag| is_shifted_clef(tag) && tag.measure_number().is_some_and(|n| breaks.is_bol(n))
}

/// `NOT_MOL` or `ONLY_MOL`.
pub fn is_mol_sensitive(tag: &Tag) -> bool {
    tag.contains(NOT_MOL) || tag.contains(ONLY_MOL)
}

/// `NOT_MOL` regions at a line start and `ONLY_MOL` regions anywhere else.
pub fn mol_misplaced(breaks: &LineBreaks) -> impl Fn(&Tag) -> bool + '_ {
    move |tag| {
        let Some(measure) = tag.measure_number() else {
            return false;
        };
        if tag.contains(NOT_MOL) {
            breaks.is_bol(measure)
        } else if tag.contains(ONLY_MOL) {
            !breaks.is_bol(measure)
        } else {
            false
        }
    }
}

pub fn is_show_to_join(tag: &Tag) -> bool {
    tag.contains(SHOW_TO_JOIN_BROKEN_SPANNERS)
}

pub fn is_hide_to_join(tag: &Tag) -> bool {
    tag.contains(HIDE_TO_JOIN_BROKEN_SPANNERS)
}

// ---------------------------------------------------------------------------
// Persistent indicator status
// ---------------------------------------------------------------------------

/// Status color overrides (`EXPLICIT_CLEF_COLOR`, `..._REDRAW_COLOR`).
pub fn is_persistent_indicator_color(tag: &Tag) -> bool {
    tag.words().iter().any(|w| is_status_color_word(w))
}

/// Anything in the `REDUNDANT_<STEM>` family, colors included.
pub fn is_redundant(tag: &Tag) -> bool {
    tag.words()
        .iter()
        .any(|w| w.starts_with(REDUNDANT_PREFIX) && w.len() > REDUNDANT_PREFIX.len())
}
