// Manifest registry: caller-supplied name → indicator tables.
//
// A score names its instruments, tempi and short instrument names once, in a
// JSON file, and refers to them by key. Persisting "instrument Cello" instead
// of the full instrument value keeps section metadata stable when the
// manifest entry is edited between runs. Tables are read-only after loading;
// a lookup miss is an error, never a default.
//
// JSON shape:
//
//     {
//       "instruments": { "Cello": { "type": "Instrument", ... } },
//       "metronome_marks": { "Adagio": { "type": "MetronomeMark", ... } },
//       "short_instrument_names": { "Vc.": { "type": "MarginMarkup", ... } }
//     }

use crate::error::ScoreError;
use crate::indicator::Indicator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestName {
    Instruments,
    MetronomeMarks,
    ShortInstrumentNames,
}

impl ManifestName {
    pub const ALL: [ManifestName; 3] = [
        ManifestName::Instruments,
        ManifestName::MetronomeMarks,
        ManifestName::ShortInstrumentNames,
    ];
}

impl fmt::Display for ManifestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ManifestName::Instruments => "instruments",
            ManifestName::MetronomeMarks => "metronome_marks",
            ManifestName::ShortInstrumentNames => "short_instrument_names",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifests {
    #[serde(default)]
    pub instruments: BTreeMap<String, Indicator>,
    #[serde(default)]
    pub metronome_marks: BTreeMap<String, Indicator>,
    #[serde(default)]
    pub short_instrument_names: BTreeMap<String, Indicator>,
}

impl Manifests {
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let manifests: Self = serde_json::from_str(json)?;
        for manifest in ManifestName::ALL {
            for indicator in manifests.table(manifest).values() {
                indicator.validate()?;
            }
        }
        Ok(manifests)
    }

    pub fn table(&self, manifest: ManifestName) -> &BTreeMap<String, Indicator> {
        match manifest {
            ManifestName::Instruments => &self.instruments,
            ManifestName::MetronomeMarks => &self.metronome_marks,
            ManifestName::ShortInstrumentNames => &self.short_instrument_names,
        }
    }

    pub fn lookup(&self, manifest: ManifestName, key: &str) -> Result<&Indicator, ScoreError> {
        self.table(manifest)
            .get(key)
            .ok_or_else(|| ScoreError::ManifestMiss {
                manifest,
                key: key.to_string(),
            })
    }

    /// The manifest entry equal to `indicator`, if any. Tables are searched
    /// in `ManifestName::ALL` order, keys in sorted order.
    pub fn reverse_lookup(&self, indicator: &Indicator) -> Option<(ManifestName, &str)> {
        ManifestName::ALL.into_iter().find_map(|manifest| {
            self.table(manifest)
                .iter()
                .find(|(_, value)| *value == indicator)
                .map(|(key, _)| (manifest, key.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFESTS: &str = r#"{
        "instruments": {
            "Cello": {"type": "Instrument", "name": "Cello", "short_name": "Vc."}
        },
        "metronome_marks": {
            "Adagio": {"type": "MetronomeMark", "reference_duration": 4, "units_per_minute": 56}
        }
    }"#;

    #[test]
    fn test_lookup() {
        let manifests = Manifests::from_json(MANIFESTS).unwrap();
        let tempo = manifests.lookup(ManifestName::MetronomeMarks, "Adagio").unwrap();
        assert_eq!(tempo.lilypond(), "\\tempo 4=56");
        assert!(manifests.short_instrument_names.is_empty());
    }

    #[test]
    fn test_lookup_miss_is_error() {
        let manifests = Manifests::from_json(MANIFESTS).unwrap();
        let err = manifests.lookup(ManifestName::Instruments, "Viola").unwrap_err();
        assert!(matches!(err, ScoreError::ManifestMiss { .. }));
    }

    #[test]
    fn test_entries_are_validated_on_load() {
        let json = r#"{
            "instruments": {
                "Cello": {"type": "Instrument", "name": "Cello\n%! -PARTS", "short_name": "Vc."}
            }
        }"#;
        let err = Manifests::from_json(json).unwrap_err();
        assert!(matches!(err, ScoreError::UnsafeText { .. }));
    }

    #[test]
    fn test_reverse_lookup() {
        let manifests = Manifests::from_json(MANIFESTS).unwrap();
        let cello = Indicator::Instrument {
            name: "Cello".to_string(),
            short_name: "Vc.".to_string(),
        };
        assert_eq!(
            manifests.reverse_lookup(&cello),
            Some((ManifestName::Instruments, "Cello"))
        );
        let clef = Indicator::Clef {
            name: "bass".to_string(),
        };
        assert_eq!(manifests.reverse_lookup(&clef), None);
    }
}
