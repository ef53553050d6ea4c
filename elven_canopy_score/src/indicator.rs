// Persistent indicators: the closed set of attributes that stay in effect
// until something overrides them.
//
// `Indicator` is a tagged union matched exhaustively everywhere; adding a
// variant means the compiler walks you through kinds, scopes, equality and
// LilyPond formatting. Each indicator belongs to one `IndicatorKind`, the
// unit at which "what is currently in effect" is tracked. Hairpins share the
// dynamic kind: a hairpin start is what's in effect after `\f \<`.
//
// Each kind has a default `Scope`, the LilyPond context type it governs:
// clefs, instruments, staff lines, time signatures and margin markup govern
// a staff, dynamics a voice, metronome marks the whole score.
//
// Equality for persistence purposes (`persistent_eq`) is structural equality
// with one exception: two sforzando-family dynamics are never equal, since
// each is an accent on its own note rather than a level that carries on.
//
// Indicator text ends up inside a single tagged region line, so it may not
// contain line breaks or region markers (`validate`).

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamics that attack a single note rather than set a level.
pub const SFORZANDO_FAMILY: [&str; 13] = [
    "fp", "sf", "sff", "sfp", "sfpp", "sffp", "sffpp", "sfz", "sffz", "sfffz", "rf", "rfz", "fz",
];

pub fn is_sforzando(name: &str) -> bool {
    SFORZANDO_FAMILY.contains(&name)
}

/// The LilyPond context type an indicator governs by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Voice,
    Staff,
    Score,
}

impl Scope {
    pub fn lilypond_type(self) -> &'static str {
        match self {
            Scope::Voice => "Voice",
            Scope::Staff => "Staff",
            Scope::Score => "Score",
        }
    }
}

/// The attribute an indicator sets. At most one indicator of each kind is in
/// effect per context at any moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorKind {
    Clef,
    Dynamic,
    Instrument,
    MetronomeMark,
    StaffLines,
    TimeSignature,
    MarginMarkup,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::Clef,
        IndicatorKind::Dynamic,
        IndicatorKind::Instrument,
        IndicatorKind::MetronomeMark,
        IndicatorKind::StaffLines,
        IndicatorKind::TimeSignature,
        IndicatorKind::MarginMarkup,
    ];

    /// Stem used in status tag words, e.g. `REAPPLIED_<STEM>`.
    pub fn stem(self) -> &'static str {
        match self {
            IndicatorKind::Clef => "CLEF",
            IndicatorKind::Dynamic => "DYNAMIC",
            IndicatorKind::Instrument => "INSTRUMENT",
            IndicatorKind::MetronomeMark => "METRONOME_MARK",
            IndicatorKind::StaffLines => "STAFF_LINES",
            IndicatorKind::TimeSignature => "TIME_SIGNATURE",
            IndicatorKind::MarginMarkup => "MARGIN_MARKUP",
        }
    }

    pub fn default_scope(self) -> Scope {
        match self {
            IndicatorKind::Dynamic => Scope::Voice,
            IndicatorKind::MetronomeMark => Scope::Score,
            IndicatorKind::Clef
            | IndicatorKind::Instrument
            | IndicatorKind::StaffLines
            | IndicatorKind::TimeSignature
            | IndicatorKind::MarginMarkup => Scope::Staff,
        }
    }

    /// Layout object colored to show an indicator's status.
    pub fn grob(self) -> &'static str {
        match self {
            IndicatorKind::Clef => "Clef",
            IndicatorKind::Dynamic => "DynamicText",
            IndicatorKind::Instrument | IndicatorKind::MarginMarkup => "InstrumentName",
            IndicatorKind::MetronomeMark => "MetronomeMark",
            IndicatorKind::StaffLines => "StaffSymbol",
            IndicatorKind::TimeSignature => "TimeSignature",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorKind::Clef => "clef",
            IndicatorKind::Dynamic => "dynamic",
            IndicatorKind::Instrument => "instrument",
            IndicatorKind::MetronomeMark => "metronome mark",
            IndicatorKind::StaffLines => "staff lines",
            IndicatorKind::TimeSignature => "time signature",
            IndicatorKind::MarginMarkup => "margin markup",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Indicator {
    Clef {
        name: String,
    },
    Dynamic {
        name: String,
    },
    /// `shape` is `<` (crescendo) or `>` (decrescendo).
    StartHairpin {
        shape: String,
    },
    StopHairpin,
    Instrument {
        name: String,
        short_name: String,
    },
    /// `reference_duration` is the note value, e.g. 4 for a quarter.
    MetronomeMark {
        reference_duration: u32,
        units_per_minute: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_text: Option<String>,
    },
    StaffLines {
        count: u32,
    },
    TimeSignature {
        numerator: u32,
        denominator: u32,
    },
    /// Short instrument name shown in the margin of later systems.
    MarginMarkup {
        text: String,
    },
}

impl Indicator {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            Indicator::Clef { .. } => IndicatorKind::Clef,
            Indicator::Dynamic { .. } | Indicator::StartHairpin { .. } | Indicator::StopHairpin => {
                IndicatorKind::Dynamic
            }
            Indicator::Instrument { .. } => IndicatorKind::Instrument,
            Indicator::MetronomeMark { .. } => IndicatorKind::MetronomeMark,
            Indicator::StaffLines { .. } => IndicatorKind::StaffLines,
            Indicator::TimeSignature { .. } => IndicatorKind::TimeSignature,
            Indicator::MarginMarkup { .. } => IndicatorKind::MarginMarkup,
        }
    }

    /// Hairpin starts and stops mark a span rather than set a value.
    pub fn is_span_marker(&self) -> bool {
        matches!(self, Indicator::StartHairpin { .. } | Indicator::StopHairpin)
    }

    /// Instrument names are reprinted at the start of every system, so their
    /// status also gets a persistent redraw color.
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Indicator::Instrument { .. } | Indicator::MarginMarkup { .. })
    }

    /// Dynamics and hairpins attach after the note they belong to.
    pub fn is_post_event(&self) -> bool {
        self.kind() == IndicatorKind::Dynamic
    }

    pub fn is_sforzando(&self) -> bool {
        matches!(self, Indicator::Dynamic { name } if is_sforzando(name))
    }

    /// Equality as far as carrying an attribute forward is concerned.
    pub fn persistent_eq(&self, other: &Indicator) -> bool {
        if self.is_sforzando() && other.is_sforzando() {
            return false;
        }
        self == other
    }

    fn text_fields(&self) -> Vec<&str> {
        match self {
            Indicator::Clef { name } | Indicator::Dynamic { name } => vec![name.as_str()],
            Indicator::StartHairpin { shape } => vec![shape.as_str()],
            Indicator::Instrument { name, short_name } => vec![name.as_str(), short_name.as_str()],
            Indicator::MetronomeMark { custom_text, .. } => {
                custom_text.iter().map(String::as_str).collect()
            }
            Indicator::MarginMarkup { text } => vec![text.as_str()],
            Indicator::StopHairpin
            | Indicator::StaffLines { .. }
            | Indicator::TimeSignature { .. } => Vec::new(),
        }
    }

    /// Rejects text that can't sit on one region line.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for text in self.text_fields() {
            let reason = if text.contains(['\n', '\r']) {
                "contains a line break"
            } else if text.contains("%!") || text.contains("%@%") {
                "contains a region marker"
            } else {
                continue;
            };
            return Err(ScoreError::UnsafeText {
                text: text.to_string(),
                reason,
            });
        }
        Ok(())
    }

    /// The LilyPond markup that states this indicator.
    pub fn lilypond(&self) -> String {
        match self {
            Indicator::Clef { name } => format!("\\clef \"{name}\""),
            Indicator::Dynamic { name } => format!("\\{name}"),
            Indicator::StartHairpin { shape } => format!("\\{shape}"),
            Indicator::StopHairpin => "\\!".to_string(),
            Indicator::Instrument { name, short_name } => format!(
                "\\set Staff.instrumentName = \\markup {{ \"{name}\" }} \
                 \\set Staff.shortInstrumentName = \\markup {{ \"{short_name}\" }}"
            ),
            Indicator::MetronomeMark {
                reference_duration,
                units_per_minute,
                custom_text,
            } => match custom_text {
                Some(text) => format!("\\tempo \"{text}\" {reference_duration}={units_per_minute}"),
                None => format!("\\tempo {reference_duration}={units_per_minute}"),
            },
            Indicator::StaffLines { count } => format!(
                "\\stopStaff \\once \\override Staff.StaffSymbol.line-count = {count} \\startStaff"
            ),
            Indicator::TimeSignature {
                numerator,
                denominator,
            } => format!("\\time {numerator}/{denominator}"),
            Indicator::MarginMarkup { text } => {
                format!("\\set Staff.shortInstrumentName = \\markup {{ \"{text}\" }}")
            }
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lilypond())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic(name: &str) -> Indicator {
        Indicator::Dynamic {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_kinds_and_scopes() {
        assert_eq!(Indicator::StopHairpin.kind(), IndicatorKind::Dynamic);
        assert_eq!(IndicatorKind::Dynamic.default_scope(), Scope::Voice);
        assert_eq!(IndicatorKind::MetronomeMark.default_scope(), Scope::Score);
        assert_eq!(IndicatorKind::Clef.default_scope(), Scope::Staff);
        assert_eq!(IndicatorKind::TimeSignature.stem(), "TIME_SIGNATURE");
    }

    #[test]
    fn test_sforzando_dynamics_never_equal() {
        assert!(dynamic("f").persistent_eq(&dynamic("f")));
        assert!(!dynamic("f").persistent_eq(&dynamic("p")));
        assert!(!dynamic("sfz").persistent_eq(&dynamic("sfz")));
        assert!(!dynamic("sfz").persistent_eq(&dynamic("fp")));
        assert!(!dynamic("sfz").persistent_eq(&dynamic("f")));
    }

    #[test]
    fn test_validate_rejects_text_that_breaks_a_region() {
        assert!(dynamic("mf").validate().is_ok());
        let split = Indicator::MarginMarkup {
            text: "Vc.\n\\f".to_string(),
        };
        assert!(matches!(
            split.validate(),
            Err(ScoreError::UnsafeText {
                reason: "contains a line break",
                ..
            })
        ));
        let tagged = Indicator::Instrument {
            name: "Cello %! -PARTS".to_string(),
            short_name: "Vc.".to_string(),
        };
        assert!(matches!(
            tagged.validate(),
            Err(ScoreError::UnsafeText {
                reason: "contains a region marker",
                ..
            })
        ));
        let tempo = Indicator::MetronomeMark {
            reference_duration: 4,
            units_per_minute: 60,
            custom_text: Some("%@% Largo".to_string()),
        };
        assert!(tempo.validate().is_err());
    }

    #[test]
    fn test_span_markers_and_redraw() {
        let start = Indicator::StartHairpin {
            shape: "<".to_string(),
        };
        assert!(start.is_span_marker());
        assert!(Indicator::StopHairpin.is_span_marker());
        assert!(!dynamic("f").is_span_marker());
        assert!(
            Indicator::MarginMarkup {
                text: "Vc.".to_string()
            }
            .needs_redraw()
        );
        assert!(!dynamic("f").needs_redraw());
    }

    #[test]
    fn test_lilypond_formatting() {
        assert_eq!(
            Indicator::Clef {
                name: "treble".to_string()
            }
            .lilypond(),
            "\\clef \"treble\""
        );
        assert_eq!(dynamic("ff").lilypond(), "\\ff");
        assert_eq!(
            Indicator::StartHairpin {
                shape: ">".to_string()
            }
            .lilypond(),
            "\\>"
        );
        assert_eq!(Indicator::StopHairpin.lilypond(), "\\!");
        assert_eq!(
            Indicator::MetronomeMark {
                reference_duration: 4,
                units_per_minute: 72,
                custom_text: None,
            }
            .lilypond(),
            "\\tempo 4=72"
        );
        assert_eq!(
            Indicator::TimeSignature {
                numerator: 3,
                denominator: 4
            }
            .lilypond(),
            "\\time 3/4"
        );
        assert_eq!(
            Indicator::Instrument {
                name: "Cello".to_string(),
                short_name: "Vc.".to_string()
            }
            .lilypond(),
            "\\set Staff.instrumentName = \\markup { \"Cello\" } \
             \\set Staff.shortInstrumentName = \\markup { \"Vc.\" }"
        );
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(Indicator::StaffLines { count: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "StaffLines", "count": 1}));
        let back: Indicator = serde_json::from_value(json).unwrap();
        assert_eq!(back, Indicator::StaffLines { count: 1 });
        let stop: Indicator = serde_json::from_str(r#"{"type":"StopHairpin"}"#).unwrap();
        assert_eq!(stop, Indicator::StopHairpin);
    }
}
