// Prototype registry: rebuilds indicators from persisted key/value pairs.
//
// A memento that isn't a direct value or a manifest entry records a
// prototype key plus a JSON value, and the next section turns that back into
// an indicator through this registry. Keys are a closed enum and each maps
// to a plain constructor function, so nothing is looked up by type name at
// runtime. The registry is built once per run and passed where it's needed.

use crate::error::ScoreError;
use crate::indicator::Indicator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Stable key naming how to rebuild an indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prototype {
    Clef,
    Dynamic,
    StartHairpin,
    StopHairpin,
    MetronomeMark,
    StaffLines,
    TimeSignature,
    Instrument,
    MarginMarkup,
}

impl Prototype {
    pub const ALL: [Prototype; 9] = [
        Prototype::Clef,
        Prototype::Dynamic,
        Prototype::StartHairpin,
        Prototype::StopHairpin,
        Prototype::MetronomeMark,
        Prototype::StaffLines,
        Prototype::TimeSignature,
        Prototype::Instrument,
        Prototype::MarginMarkup,
    ];

    /// The prototype and value that rebuild `indicator`.
    pub fn of(indicator: &Indicator) -> (Prototype, Value) {
        match indicator {
            Indicator::Clef { name } => (Prototype::Clef, Value::from(name.as_str())),
            Indicator::Dynamic { name } => (Prototype::Dynamic, Value::from(name.as_str())),
            Indicator::StartHairpin { shape } => {
                (Prototype::StartHairpin, Value::from(shape.as_str()))
            }
            Indicator::StopHairpin => (Prototype::StopHairpin, Value::Null),
            Indicator::MetronomeMark {
                reference_duration,
                units_per_minute,
                custom_text,
            } => {
                let mut value = serde_json::json!({
                    "reference_duration": reference_duration,
                    "units_per_minute": units_per_minute,
                });
                if let (Some(text), Some(map)) = (custom_text, value.as_object_mut()) {
                    map.insert("custom_text".to_string(), Value::from(text.as_str()));
                }
                (Prototype::MetronomeMark, value)
            }
            Indicator::StaffLines { count } => (Prototype::StaffLines, Value::from(*count)),
            Indicator::TimeSignature {
                numerator,
                denominator,
            } => (
                Prototype::TimeSignature,
                Value::from(format!("{numerator}/{denominator}")),
            ),
            Indicator::Instrument { name, short_name } => (
                Prototype::Instrument,
                serde_json::json!({"name": name, "short_name": short_name}),
            ),
            Indicator::MarginMarkup { text } => {
                (Prototype::MarginMarkup, Value::from(text.as_str()))
            }
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub type Constructor = fn(&Value) -> Result<Indicator, ScoreError>;

/// Prototype key → constructor.
#[derive(Clone)]
pub struct PrototypeRegistry {
    constructors: BTreeMap<Prototype, Constructor>,
}

fn bad(prototype: Prototype, value: &Value, reason: &str) -> ScoreError {
    ScoreError::BadPrototypeValue {
        prototype,
        value: value.clone(),
        reason: reason.to_string(),
    }
}

fn string_value(prototype: Prototype, value: &Value) -> Result<String, ScoreError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| bad(prototype, value, "expected a string"))
}

fn u32_field(prototype: Prototype, value: &Value, field: &str) -> Result<u32, ScoreError> {
    value
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| bad(prototype, value, &format!("missing integer field {field:?}")))
}

fn clef(value: &Value) -> Result<Indicator, ScoreError> {
    Ok(Indicator::Clef {
        name: string_value(Prototype::Clef, value)?,
    })
}

fn dynamic(value: &Value) -> Result<Indicator, ScoreError> {
    Ok(Indicator::Dynamic {
        name: string_value(Prototype::Dynamic, value)?,
    })
}

fn start_hairpin(value: &Value) -> Result<Indicator, ScoreError> {
    let shape = string_value(Prototype::StartHairpin, value)?;
    if shape != "<" && shape != ">" {
        return Err(bad(Prototype::StartHairpin, value, "shape must be < or >"));
    }
    Ok(Indicator::StartHairpin { shape })
}

fn stop_hairpin(_value: &Value) -> Result<Indicator, ScoreError> {
    Ok(Indicator::StopHairpin)
}

fn metronome_mark(value: &Value) -> Result<Indicator, ScoreError> {
    let prototype = Prototype::MetronomeMark;
    let custom_text = match value.get("custom_text") {
        None | Some(Value::Null) => None,
        Some(text) => Some(string_value(prototype, text)?),
    };
    Ok(Indicator::MetronomeMark {
        reference_duration: u32_field(prototype, value, "reference_duration")?,
        units_per_minute: u32_field(prototype, value, "units_per_minute")?,
        custom_text,
    })
}

fn staff_lines(value: &Value) -> Result<Indicator, ScoreError> {
    let count = value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| bad(Prototype::StaffLines, value, "expected a line count"))?;
    Ok(Indicator::StaffLines { count })
}

fn time_signature(value: &Value) -> Result<Indicator, ScoreError> {
    let prototype = Prototype::TimeSignature;
    let text = string_value(prototype, value)?;
    let parsed = text
        .split_once('/')
        .and_then(|(n, d)| Some((n.parse::<u32>().ok()?, d.parse::<u32>().ok()?)))
        .filter(|&(n, d)| n > 0 && d > 0);
    let Some((numerator, denominator)) = parsed else {
        return Err(bad(prototype, value, "expected \"n/d\""));
    };
    Ok(Indicator::TimeSignature {
        numerator,
        denominator,
    })
}

fn instrument(value: &Value) -> Result<Indicator, ScoreError> {
    let prototype = Prototype::Instrument;
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| bad(prototype, value, &format!("missing string field {name:?}")))
    };
    Ok(Indicator::Instrument {
        name: field("name")?,
        short_name: field("short_name")?,
    })
}

fn margin_markup(value: &Value) -> Result<Indicator, ScoreError> {
    Ok(Indicator::MarginMarkup {
        text: string_value(Prototype::MarginMarkup, value)?,
    })
}

impl PrototypeRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// One constructor for every prototype key.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for prototype in Prototype::ALL {
            let constructor: Constructor = match prototype {
                Prototype::Clef => clef,
                Prototype::Dynamic => dynamic,
                Prototype::StartHairpin => start_hairpin,
                Prototype::StopHairpin => stop_hairpin,
                Prototype::MetronomeMark => metronome_mark,
                Prototype::StaffLines => staff_lines,
                Prototype::TimeSignature => time_signature,
                Prototype::Instrument => instrument,
                Prototype::MarginMarkup => margin_markup,
            };
            registry.register(prototype, constructor);
        }
        registry
    }

    pub fn register(&mut self, prototype: Prototype, constructor: Constructor) {
        self.constructors.insert(prototype, constructor);
    }

    pub fn construct(&self, prototype: Prototype, value: &Value) -> Result<Indicator, ScoreError> {
        let constructor = self
            .constructors
            .get(&prototype)
            .ok_or_else(|| bad(prototype, value, "no constructor registered"))?;
        let indicator = constructor(value)?;
        indicator.validate()?;
        Ok(indicator)
    }
}

impl Default for PrototypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
