// Mementos: what one section tells the next about persistent indicators.
//
// At the end of a section, the indicator of each kind still in effect in
// each context is written down as a memento. A memento records where its
// value comes from rather than always copying the value: a manifest key if
// the value is a manifest entry, otherwise a prototype key and JSON value.
// `Origin::Direct` carries a value verbatim for callers that build mementos
// by hand.
//
// A hairpin stop in effect at the end of a section carries nothing forward,
// so no memento is written for it.

use crate::dedup::effective_at_end;
use crate::document::Document;
use crate::error::ScoreError;
use crate::indicator::{Indicator, IndicatorKind};
use crate::manifest::{ManifestName, Manifests};
use crate::offset::Offset;
use crate::prototype::{Prototype, PrototypeRegistry};
use elven_canopy_tags::Tag;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to rebuild a memento's indicator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Origin {
    Direct {
        indicator: Indicator,
    },
    Manifest {
        manifest: ManifestName,
        key: String,
    },
    Prototype {
        prototype: Prototype,
        value: serde_json::Value,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Memento {
    /// Context the indicator governed.
    pub context: String,
    /// Edition words the indicator was tagged with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<Tag>,
    #[serde(flatten)]
    pub origin: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic_offset: Option<Offset>,
}

impl Memento {
    /// Rebuild the indicator this memento stands for.
    pub fn indicator(
        &self,
        manifests: &Manifests,
        prototypes: &PrototypeRegistry,
    ) -> Result<Indicator, ScoreError> {
        match &self.origin {
            Origin::Direct { indicator } => {
                indicator.validate()?;
                Ok(indicator.clone())
            }
            Origin::Manifest { manifest, key } => Ok(manifests.lookup(*manifest, key)?.clone()),
            Origin::Prototype { prototype, value } => prototypes.construct(*prototype, value),
        }
    }
}

/// Context name → mementos, in `IndicatorKind` order.
pub type PersistentIndicators = BTreeMap<String, Vec<Memento>>;

fn origin_for(indicator: &Indicator, manifests: &Manifests) -> Origin {
    match manifests.reverse_lookup(indicator) {
        Some((manifest, key)) => Origin::Manifest {
            manifest,
            key: key.to_string(),
        },
        None => {
            let (prototype, value) = Prototype::of(indicator);
            Origin::Prototype { prototype, value }
        }
    }
}

/// One memento per (context, kind) for every indicator still in effect at
/// the end of `doc`.
pub fn collect_mementos(doc: &Document, manifests: &Manifests) -> PersistentIndicators {
    let mut persistent = PersistentIndicators::new();
    for context in doc.context_names() {
        for kind in IndicatorKind::ALL {
            let Some(id) = effective_at_end(doc, context, kind) else {
                continue;
            };
            let annotation = doc.annotation(id);
            if annotation.indicator == Indicator::StopHairpin {
                debug!("{context}: hairpin stop at end of section, nothing to persist");
                continue;
            }
            let editions = annotation.tag.editions();
            let memento = Memento {
                context: context.to_string(),
                edition: (!editions.is_empty()).then_some(editions),
                origin: origin_for(&annotation.indicator, manifests),
                synthetic_offset: annotation.synthetic_offset,
            };
            debug!("{context}: persisting {kind} {}", annotation.indicator);
            persistent
                .entry(context.to_string())
                .or_default()
                .push(memento);
        }
    }
    persistent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeId;

    fn doc_with_voice() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new("Score", "Score");
        let staff = doc.add_context(doc.root(), "Cello_Staff", "Staff").unwrap();
        let voice = doc.add_context(staff, "Cello_Voice", "Voice").unwrap();
        for _ in 0..2 {
            doc.add_leaf(voice, Offset::new(1, 2), None).unwrap();
        }
        let leaves = doc.leaves(voice);
        (doc, leaves)
    }

    fn cello() -> Indicator {
        Indicator::Instrument {
            name: "Cello".to_string(),
            short_name: "Vc.".to_string(),
        }
    }

    #[test]
    fn test_one_memento_per_context_and_kind() {
        let (mut doc, leaves) = doc_with_voice();
        let dynamic = |name: &str| Indicator::Dynamic {
            name: name.to_string(),
        };
        doc.attach(dynamic("p"), leaves[0], Tag::empty());
        doc.attach(dynamic("f"), leaves[1], Tag::parse("-PARTS").unwrap());
        doc.attach(
            Indicator::Clef {
                name: "bass".to_string(),
            },
            leaves[0],
            Tag::empty(),
        );

        let persistent = collect_mementos(&doc, &Manifests::default());
        let voice = &persistent["Cello_Voice"];
        assert_eq!(voice.len(), 1);
        assert_eq!(voice[0].edition, Some(Tag::parse("-PARTS").unwrap()));
        assert_eq!(
            voice[0].origin,
            Origin::Prototype {
                prototype: Prototype::Dynamic,
                value: serde_json::json!("f"),
            }
        );
        assert_eq!(persistent["Cello_Staff"].len(), 1);
        assert!(!persistent.contains_key("Score"));
    }

    #[test]
    fn test_manifest_origin_preferred() {
        let (mut doc, leaves) = doc_with_voice();
        doc.attach(cello(), leaves[0], Tag::empty());
        let mut manifests = Manifests::default();
        manifests.instruments.insert("Cello".to_string(), cello());

        let persistent = collect_mementos(&doc, &manifests);
        let memento = &persistent["Cello_Staff"][0];
        assert_eq!(
            memento.origin,
            Origin::Manifest {
                manifest: ManifestName::Instruments,
                key: "Cello".to_string(),
            }
        );
        let rebuilt = memento
            .indicator(&manifests, &PrototypeRegistry::standard())
            .unwrap();
        assert_eq!(rebuilt, cello());
    }

    #[test]
    fn test_hairpin_stop_not_persisted() {
        let (mut doc, leaves) = doc_with_voice();
        doc.attach(Indicator::StopHairpin, leaves[1], Tag::empty());
        let persistent = collect_mementos(&doc, &Manifests::default());
        assert!(persistent.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let memento = Memento {
            context: "Cello_Staff".to_string(),
            edition: None,
            origin: Origin::Manifest {
                manifest: ManifestName::Instruments,
                key: "Cello".to_string(),
            },
            synthetic_offset: None,
        };
        let json = serde_json::to_value(&memento).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "context": "Cello_Staff",
                "origin": "manifest",
                "manifest": "instruments",
                "key": "Cello"
            })
        );
        let back: Memento = serde_json::from_value(json).unwrap();
        assert_eq!(back, memento);
    }
}
