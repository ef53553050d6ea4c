// Status of a persistent indicator occurrence, and how each status looks.
//
// Every persistent indicator in a section is explicit (states something new),
// reapplied (carried over silently from the previous section) or redundant
// (restates what is already in effect). The status is shown three ways: a
// tag word `<STATUS>_<STEM>` on the indicator's own region, a one-shot color
// override tagged `<STATUS>_<STEM>_COLOR`, and, for indicators reprinted on
// every system, a lasting redraw color tagged `<STATUS>_<STEM>_REDRAW_COLOR`.
// Edition builds switch the color and redundant regions on or off.

use crate::indicator::Indicator;
use elven_canopy_tags::library::{
    EXPLICIT_PREFIX, REAPPLIED_PREFIX, REDUNDANT_PREFIX, color_word, redraw_color_word,
    status_word,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Explicit,
    Reapplied,
    Redundant,
    /// The memento's context no longer exists; nothing was attached.
    None,
}

impl Status {
    /// Tag word prefix, or `None` for `Status::None`.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Status::Explicit => Some(EXPLICIT_PREFIX),
            Status::Reapplied => Some(REAPPLIED_PREFIX),
            Status::Redundant => Some(REDUNDANT_PREFIX),
            Status::None => None,
        }
    }

    pub fn color(self) -> Option<&'static str> {
        match self {
            Status::Explicit => Some("blue"),
            Status::Reapplied => Some("green4"),
            Status::Redundant => Some("DeepPink1"),
            Status::None => None,
        }
    }

    pub fn redraw_color(self) -> Option<&'static str> {
        match self {
            Status::Explicit => Some("DeepSkyBlue2"),
            Status::Reapplied => Some("OliveDrab"),
            Status::Redundant => Some("DeepPink4"),
            Status::None => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Explicit => "explicit",
            Status::Reapplied => "reapplied",
            Status::Redundant => "redundant",
            Status::None => "none",
        })
    }
}

/// The visible treatment of one classified indicator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Treatment {
    pub status: Status,
    /// `<STATUS>_<STEM>`, added to the indicator's own tag.
    pub status_word: String,
    /// Color and its tag word; span markers have no value to color.
    pub color: Option<(&'static str, String)>,
    /// Redraw color and its tag word, for indicators reprinted on each system.
    pub redraw_color: Option<(&'static str, String)>,
}

impl Treatment {
    /// `None` for `Status::None`.
    pub fn new(status: Status, indicator: &Indicator) -> Option<Self> {
        let prefix = status.prefix()?;
        let stem = indicator.kind().stem();
        let color = if indicator.is_span_marker() {
            None
        } else {
            status.color().map(|c| (c, color_word(prefix, stem)))
        };
        let redraw_color = if indicator.needs_redraw() {
            status
                .redraw_color()
                .map(|c| (c, redraw_color_word(prefix, stem)))
        } else {
            None
        };
        Some(Self {
            status,
            status_word: status_word(prefix, stem),
            color,
            redraw_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treatment_words_and_colors() {
        let clef = Indicator::Clef {
            name: "bass".to_string(),
        };
        let t = Treatment::new(Status::Reapplied, &clef).unwrap();
        assert_eq!(t.status_word, "REAPPLIED_CLEF");
        assert_eq!(t.color, Some(("green4", "REAPPLIED_CLEF_COLOR".to_string())));
        assert_eq!(t.redraw_color, None);
    }

    #[test]
    fn test_redraw_for_instruments() {
        let instrument = Indicator::Instrument {
            name: "Cello".to_string(),
            short_name: "Vc.".to_string(),
        };
        let t = Treatment::new(Status::Explicit, &instrument).unwrap();
        assert_eq!(t.color.as_ref().map(|c| c.0), Some("blue"));
        assert_eq!(
            t.redraw_color,
            Some(("DeepSkyBlue2", "EXPLICIT_INSTRUMENT_REDRAW_COLOR".to_string()))
        );
    }

    #[test]
    fn test_span_markers_get_no_color() {
        let hairpin = Indicator::StartHairpin {
            shape: "<".to_string(),
        };
        let t = Treatment::new(Status::Redundant, &hairpin).unwrap();
        assert_eq!(t.status_word, "REDUNDANT_DYNAMIC");
        assert!(t.color.is_none());
    }

    #[test]
    fn test_none_has_no_treatment() {
        assert!(Treatment::new(Status::None, &Indicator::StopHairpin).is_none());
    }
}
