// Reserved tag words.
//
// Every word the build passes look for lives here, so the section builder
// (which writes tags) and the edition builder (which reads them) agree on
// spelling. Three kinds of vocabulary:
//
// - Layout words attached by section construction: fermata bar-line
//   adjustments, shifted clefs, middle-of-line markers, broken-spanner joins.
// - Word families: `MEASURE_<n>` and the status families
//   `EXPLICIT_<STEM>`, `REAPPLIED_<STEM>`, `REDUNDANT_<STEM>` with their
//   `_COLOR` and `_REDRAW_COLOR` suffixes.
// - Edition words (`+NAME` / `-NAME`), built from `EditionTarget` in
//   `config.rs` rather than listed here.

// ---------------------------------------------------------------------------
// Layout words
// ---------------------------------------------------------------------------

/// Bar-line extent override on an (empty) fermata measure.
pub const FERMATA_MEASURE_EMPTY_BAR_EXTENT: &str = "FERMATA_MEASURE_EMPTY_BAR_EXTENT";
/// Bar-line extent override on the measure following a fermata measure.
pub const FERMATA_MEASURE_NEXT_BAR_EXTENT: &str = "FERMATA_MEASURE_NEXT_BAR_EXTENT";
/// Clef nudged right to make room at a section seam.
pub const SHIFTED_CLEF: &str = "SHIFTED_CLEF";
/// Markup that must not appear in the middle of a line.
pub const NOT_MOL: &str = "NOT_MOL";
/// Markup that may only appear in the middle of a line.
pub const ONLY_MOL: &str = "ONLY_MOL";
pub const SHOW_TO_JOIN_BROKEN_SPANNERS: &str = "SHOW_TO_JOIN_BROKEN_SPANNERS";
pub const HIDE_TO_JOIN_BROKEN_SPANNERS: &str = "HIDE_TO_JOIN_BROKEN_SPANNERS";

// ---------------------------------------------------------------------------
// Word families
// ---------------------------------------------------------------------------

pub const MEASURE_PREFIX: &str = "MEASURE_";

pub const EXPLICIT_PREFIX: &str = "EXPLICIT_";
pub const REAPPLIED_PREFIX: &str = "REAPPLIED_";
pub const REDUNDANT_PREFIX: &str = "REDUNDANT_";

/// All three status prefixes, in the order statuses are usually listed.
pub const STATUS_PREFIXES: [&str; 3] = [EXPLICIT_PREFIX, REAPPLIED_PREFIX, REDUNDANT_PREFIX];

pub const COLOR_SUFFIX: &str = "_COLOR";
pub const REDRAW_COLOR_SUFFIX: &str = "_REDRAW_COLOR";

/// `EXPLICIT_CLEF`, `REDUNDANT_DYNAMIC`, ...
pub fn status_word(prefix: &str, stem: &str) -> String {
    format!("{prefix}{stem}")
}

/// `EXPLICIT_CLEF_COLOR`, ...
pub fn color_word(prefix: &str, stem: &str) -> String {
    format!("{prefix}{stem}{COLOR_SUFFIX}")
}

/// `EXPLICIT_INSTRUMENT_REDRAW_COLOR`, ...
pub fn redraw_color_word(prefix: &str, stem: &str) -> String {
    format!("{prefix}{stem}{REDRAW_COLOR_SUFFIX}")
}

/// True for any word in a status family, colored or not.
pub fn is_status_word(word: &str) -> bool {
    STATUS_PREFIXES.iter().any(|p| word.starts_with(p) && word.len() > p.len())
}

/// True for `<STATUS>_<STEM>_COLOR` and `<STATUS>_<STEM>_REDRAW_COLOR`.
pub fn is_status_color_word(word: &str) -> bool {
    is_status_word(word) && word.ends_with(COLOR_SUFFIX)
}
