// Activation engine: flips tagged regions of generated text on and off.
//
// A region is one line of LilyPond text that ends in a tag comment:
//
//     \clef "bass" %! +SCORE:EXPLICIT_CLEF:MEASURE_1
//
// Disabling a region comments it out by inserting `%@% ` right after its
// indentation; enabling removes that marker again. A region disabled "with
// placeholder" gets `<> %@% ` instead, leaving an empty chord behind so that
// the post-events on the following lines still have something to attach to.
// In a run of consecutive lines disabled by one call only the first line
// receives the placeholder. Enabling recognizes both markers.
//
// Nothing else on the line is touched, so disabling and then enabling the
// same regions reproduces the input byte for byte (line endings included).
// Lines without a tag comment are copied through untouched.
//
// Every call reports two counts: `matched` regions whose state was flipped,
// and `skipped` regions the predicate selected that were already in the
// target state. Callers print the difference ("found no X tags" versus
// "activating 3 X tags"), so the counts are kept exact.
//
// See also: `predicates.rs` for the selectors, `pipeline.rs` for the ordered
// passes built from these two operations.

use crate::error::BuildError;
use crate::tag::Tag;

/// Starts the tag comment at the end of a region line.
pub const TAG_MARKER: &str = "%! ";
/// Marks a disabled region.
pub const DISABLED_MARKER: &str = "%@% ";
/// Marks a disabled region that keeps an empty-chord placeholder.
pub const PLACEHOLDER_MARKER: &str = "<> %@% ";

/// Whether a region is currently live text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionState {
    Enabled,
    Disabled,
    DisabledWithPlaceholder,
}

impl RegionState {
    pub fn is_enabled(self) -> bool {
        self == RegionState::Enabled
    }

    fn marker(self) -> &'static str {
        match self {
            RegionState::Enabled => "",
            RegionState::Disabled => DISABLED_MARKER,
            RegionState::DisabledWithPlaceholder => PLACEHOLDER_MARKER,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Activate,
    Deactivate,
}

/// Outcome of one activation or deactivation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    pub text: String,
    /// Regions flipped to the target state.
    pub matched: usize,
    /// Selected regions that were already in the target state.
    pub skipped: usize,
}

impl Activation {
    /// `(text, matched, skipped)`.
    pub fn into_parts(self) -> (String, usize, usize) {
        (self.text, self.matched, self.skipped)
    }

    /// Human-readable summary, e.g. `activating 2 SHIFTED_CLEF tags`.
    pub fn message(&self, name: &str, direction: Direction) -> String {
        let (verb, state) = match direction {
            Direction::Activate => ("activating", "active"),
            Direction::Deactivate => ("deactivating", "inactive"),
        };
        let mut message = if self.matched == 0 {
            format!("found no {name} tags")
        } else {
            format!("{verb} {} {name} {}", self.matched, tags_noun(self.matched))
        };
        if self.skipped > 0 {
            message.push_str(&format!(
                " (skipping {} {state} {})",
                self.skipped,
                tags_noun(self.skipped)
            ));
        }
        message
    }
}

fn tags_noun(count: usize) -> &'static str {
    if count == 1 { "tag" } else { "tags" }
}

/// One region found by `scan`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedRegion {
    /// 1-based line number.
    pub line: usize,
    pub tag: Tag,
    pub state: RegionState,
}

// ---------------------------------------------------------------------------
// Region parsing
// ---------------------------------------------------------------------------

/// A region line split into its parts. `rest` starts after the marker and
/// runs through the line ending.
struct Region<'a> {
    indent: &'a str,
    state: RegionState,
    rest: &'a str,
    tag: Tag,
}

/// The line without its `\n` / `\r\n` ending.
fn line_body(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn parse_region(line: &str, number: usize) -> Result<Option<Region<'_>>, BuildError> {
    let body = line_body(line);
    let Some((_, tag_text)) = body.rsplit_once(TAG_MARKER) else {
        return Ok(None);
    };
    let tag = Tag::parse(tag_text.trim_end())
        .map_err(|source| BuildError::MalformedRegion { line: number, source })?;

    let indent_len = body.len() - body.trim_start_matches([' ', '\t']).len();
    let (indent, after) = line.split_at(indent_len);
    let state = if after.starts_with(PLACEHOLDER_MARKER) {
        RegionState::DisabledWithPlaceholder
    } else if after.starts_with(DISABLED_MARKER) {
        RegionState::Disabled
    } else {
        RegionState::Enabled
    };
    Ok(Some(Region {
        indent,
        state,
        rest: &after[state.marker().len()..],
        tag,
    }))
}

// ---------------------------------------------------------------------------
// Toggling
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Toggle {
    Enable,
    Disable { placeholder: bool },
}

fn toggle<P>(text: &str, predicate: P, how: Toggle) -> Result<Activation, BuildError>
where
    P: Fn(&Tag) -> bool,
{
    let mut out = String::with_capacity(text.len() + 64);
    let mut matched = 0;
    let mut skipped = 0;
    let mut treated_last_line = false;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let region = match parse_region(line, index + 1)? {
            Some(region) if predicate(&region.tag) => region,
            _ => {
                out.push_str(line);
                treated_last_line = false;
                continue;
            }
        };

        match (how, region.state.is_enabled()) {
            (Toggle::Enable, false) => {
                out.push_str(region.indent);
                out.push_str(region.rest);
                matched += 1;
                treated_last_line = true;
            }
            (Toggle::Disable { placeholder }, true) => {
                let state = if placeholder && !treated_last_line {
                    RegionState::DisabledWithPlaceholder
                } else {
                    RegionState::Disabled
                };
                out.push_str(region.indent);
                out.push_str(state.marker());
                out.push_str(region.rest);
                matched += 1;
                treated_last_line = true;
            }
            _ => {
                out.push_str(line);
                skipped += 1;
                treated_last_line = false;
            }
        }
    }

    Ok(Activation {
        text: out,
        matched,
        skipped,
    })
}

/// Enable every region whose tag satisfies `predicate`.
pub fn activate<P>(text: &str, predicate: P) -> Result<Activation, BuildError>
where
    P: Fn(&Tag) -> bool,
{
    toggle(text, predicate, Toggle::Enable)
}

/// Disable every region whose tag satisfies `predicate`.
pub fn deactivate<P>(text: &str, predicate: P) -> Result<Activation, BuildError>
where
    P: Fn(&Tag) -> bool,
{
    toggle(text, predicate, Toggle::Disable { placeholder: false })
}

/// Like `deactivate`, but the first line of each disabled run keeps an
/// empty-chord placeholder.
pub fn deactivate_with_placeholder<P>(text: &str, predicate: P) -> Result<Activation, BuildError>
where
    P: Fn(&Tag) -> bool,
{
    toggle(text, predicate, Toggle::Disable { placeholder: true })
}

// ---------------------------------------------------------------------------
// Inspection and export
// ---------------------------------------------------------------------------

/// Every region in `text`, in order.
pub fn scan(text: &str) -> Result<Vec<ScannedRegion>, BuildError> {
    let mut regions = Vec::new();
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if let Some(region) = parse_region(line, index + 1)? {
            regions.push(ScannedRegion {
                line: index + 1,
                tag: region.tag,
                state: region.state,
            });
        }
    }
    Ok(regions)
}

/// Format one region line (without line ending).
pub fn format_region(indent: &str, content: &str, tag: &Tag, state: RegionState) -> String {
    format!("{indent}{}{content} {TAG_MARKER}{tag}", state.marker())
}

/// Remove every tag comment, leaving region state markers in place.
pub fn strip_tags(text: &str) -> Result<String, BuildError> {
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let body = line_body(line);
        match body.rfind(TAG_MARKER) {
            Some(position) => {
                let tag_text = &body[position + TAG_MARKER.len()..];
                Tag::parse(tag_text.trim_end()).map_err(|source| BuildError::MalformedRegion {
                    line: index + 1,
                    source,
                })?;
                out.push_str(body[..position].trim_end());
                out.push_str(&line[body.len()..]);
            }
            None => out.push_str(line),
        }
    }
    Ok(out)
}
