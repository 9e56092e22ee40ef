//! Viseme-driven lip sync.
//!
//! A message carries a cue timeline aligned to its audio track. Each frame
//! the engine samples the timeline at the playback position, resolves the
//! matching cue's symbol through the viseme catalogue, and eases the mouth
//! channels toward the entry's weights. With no active timeline or audio
//! the mouth channels are left untouched rather than relaxed, so the last
//! spoken shape holds until something else claims the channel.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::blend::approach;
use crate::model::MorphRegistry;

/// Mouth-shape targets for one viseme symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisemeEntry {
    /// Target for the mouth-open channel
    #[serde(default)]
    pub open: f32,
    /// Target for the mouth-smile channel
    #[serde(default)]
    pub smile: f32,
    /// Additional channel targets beyond open/smile
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, f32>,
}

impl VisemeEntry {
    fn new(open: f32, smile: f32) -> Self {
        Self {
            open,
            smile,
            extra: HashMap::new(),
        }
    }
}

/// Symbol-keyed catalogue of viseme entries.
///
/// Injected at engine construction like the expression catalogue. An
/// unknown symbol resolves to a closed mouth (open 0, smile 0, no extras);
/// that silent fallback can visibly desync from audio and is kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisemeCatalog {
    entries: HashMap<String, VisemeEntry>,
}

impl VisemeCatalog {
    /// Catalogue with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up a symbol.
    pub fn get(&self, symbol: &str) -> Option<&VisemeEntry> {
        self.entries.get(symbol)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, symbol: &str, entry: VisemeEntry) {
        self.entries.insert(symbol.to_string(), entry);
    }
}

impl Default for VisemeCatalog {
    /// The stock A-Z mouth-shape table.
    fn default() -> Self {
        let table: [(&str, f32, f32); 26] = [
            ("A", 1.0, 0.38),
            ("B", 0.0, 0.36),
            ("C", 1.0, 0.66),
            ("D", 1.0, 0.0),
            ("E", 0.49, 0.14),
            ("F", 0.0, 0.7),
            ("G", 1.0, 0.0),
            ("H", 0.0, 0.31),
            ("I", 0.41, 1.0),
            ("J", 0.3, 0.6),
            ("K", 0.72, 0.41),
            ("L", 0.72, 0.41),
            ("M", 0.0, 0.41),
            ("N", 0.0, 0.6),
            ("O", 1.0, 0.0),
            ("P", 0.0, 0.19),
            ("Q", 0.72, 0.41),
            ("R", 0.38, 0.19),
            ("S", 0.11, 0.49),
            ("T", 0.33, 0.18),
            ("U", 0.37, 0.0),
            ("V", 0.45, 0.0),
            ("W", 0.6, 0.4),
            ("X", 0.3, 0.3),
            ("Y", 0.4, 0.6),
            ("Z", 0.2, 0.5),
        ];

        let mut catalog = Self::empty();
        for (symbol, open, smile) in table {
            catalog.insert(symbol, VisemeEntry::new(open, smile));
        }
        catalog
    }
}

/// One timed viseme cue, produced externally per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MouthCue {
    /// Cue start in seconds
    pub start: f32,
    /// Cue end in seconds
    pub end: f32,
    /// Viseme symbol
    pub value: String,
}

/// Ordered cue sequence for one message. Assumed sorted by start and
/// non-overlapping; never validated.
pub type CueTimeline = Vec<MouthCue>;

/// First cue containing `t`, in timeline order.
///
/// Ties and overlaps resolve to the earliest entry in the sequence, not
/// the tightest bound.
pub fn sample_timeline(timeline: &[MouthCue], t: f32) -> Option<&MouthCue> {
    timeline.iter().find(|cue| t >= cue.start && t <= cue.end)
}

/// Ease the mouth channels toward the cue active at time `t`.
///
/// With no matching cue, open and smile relax toward 0 and no extra
/// channel is touched. Extras absent from the matched entry keep their
/// current weight this frame.
pub fn apply_visemes(
    catalog: &VisemeCatalog,
    timeline: &[MouthCue],
    t: f32,
    registry: &mut MorphRegistry,
    mouth_channels: (&str, &str),
    rate: f32,
) {
    let mut open = 0.0;
    let mut smile = 0.0;
    let mut extra: Option<&HashMap<String, f32>> = None;

    if let Some(cue) = sample_timeline(timeline, t) {
        if let Some(entry) = catalog.get(&cue.value) {
            open = entry.open;
            smile = entry.smile;
            extra = Some(&entry.extra);
        }
    }

    ease(registry, mouth_channels.0, open, rate);
    ease(registry, mouth_channels.1, smile, rate);

    if let Some(extra) = extra {
        for (name, &target) in extra {
            ease(registry, name, target, rate);
        }
    }
}

fn ease(registry: &mut MorphRegistry, name: &str, target: f32, rate: f32) {
    if let Some(idx) = registry.index_of(name) {
        let next = approach(registry.weight(idx), target, rate);
        registry.set_weight(idx, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelRig, SkinnedMesh};

    const MOUTH: (&str, &str) = ("mouthOpen", "mouthSmile");

    fn cue(start: f32, end: f32, value: &str) -> MouthCue {
        MouthCue {
            start,
            end,
            value: value.to_string(),
        }
    }

    fn registry() -> MorphRegistry {
        let rig = ModelRig {
            meshes: vec![SkinnedMesh {
                name: "Head".into(),
                morph_targets: vec![
                    "mouthOpen".into(),
                    "mouthSmile".into(),
                    "tongueOut".into(),
                ],
                influences: vec![0.0; 3],
            }],
            nodes: vec![],
            clips: vec![],
        };
        MorphRegistry::from_rig(&rig)
    }

    #[test]
    fn test_sampling_picks_the_containing_cue() {
        let timeline = vec![cue(0.0, 1.0, "A"), cue(1.0, 2.0, "B")];

        assert_eq!(sample_timeline(&timeline, 0.5).unwrap().value, "A");
        assert_eq!(sample_timeline(&timeline, 1.5).unwrap().value, "B");
        assert!(sample_timeline(&timeline, 2.5).is_none());
    }

    #[test]
    fn test_overlap_resolves_to_first_in_timeline_order() {
        let timeline = vec![cue(0.0, 2.0, "A"), cue(0.0, 2.0, "B")];
        assert_eq!(sample_timeline(&timeline, 1.0).unwrap().value, "A");
        // Boundary between consecutive cues also goes to the earlier one.
        let timeline = vec![cue(0.0, 1.0, "A"), cue(1.0, 2.0, "B")];
        assert_eq!(sample_timeline(&timeline, 1.0).unwrap().value, "A");
    }

    #[test]
    fn test_matched_cue_eases_mouth_channels() {
        let catalog = VisemeCatalog::default();
        let mut registry = registry();
        let timeline = vec![cue(0.0, 1.0, "A")];

        apply_visemes(&catalog, &timeline, 0.5, &mut registry, MOUTH, 0.2);
        // A is open 1.0, smile 0.38
        assert!((registry.weight_by_name("mouthOpen") - 0.2).abs() < 1e-6);
        assert!((registry.weight_by_name("mouthSmile") - 0.076).abs() < 1e-6);
    }

    #[test]
    fn test_no_matching_cue_relaxes_open_and_smile() {
        let catalog = VisemeCatalog::default();
        let mut registry = registry();
        registry.set_weight_by_name("mouthOpen", 1.0);
        let timeline = vec![cue(0.0, 1.0, "A")];

        apply_visemes(&catalog, &timeline, 5.0, &mut registry, MOUTH, 0.2);
        assert!((registry.weight_by_name("mouthOpen") - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_symbol_closes_mouth_without_extras() {
        let catalog = VisemeCatalog::default();
        let mut registry = registry();
        registry.set_weight_by_name("mouthOpen", 1.0);
        registry.set_weight_by_name("tongueOut", 1.0);
        let timeline = vec![cue(0.0, 1.0, "?")];

        apply_visemes(&catalog, &timeline, 0.5, &mut registry, MOUTH, 0.2);
        assert!((registry.weight_by_name("mouthOpen") - 0.8).abs() < 1e-6);
        // Extra channel untouched by the fallback
        assert_eq!(registry.weight_by_name("tongueOut"), 1.0);
    }

    #[test]
    fn test_extra_channels_ease_when_entry_names_them() {
        let mut catalog = VisemeCatalog::default();
        let mut entry = VisemeEntry::new(0.5, 0.0);
        entry.extra.insert("tongueOut".to_string(), 1.0);
        catalog.insert("L", entry);

        let mut registry = registry();
        let timeline = vec![cue(0.0, 1.0, "L")];
        apply_visemes(&catalog, &timeline, 0.5, &mut registry, MOUTH, 0.2);
        assert!((registry.weight_by_name("tongueOut") - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_extras_hold_value_once_cue_moves_on() {
        let mut catalog = VisemeCatalog::default();
        let mut entry = VisemeEntry::new(0.5, 0.0);
        entry.extra.insert("tongueOut".to_string(), 1.0);
        catalog.insert("L", entry);

        let mut registry = registry();
        let timeline = vec![cue(0.0, 1.0, "L"), cue(1.0, 2.0, "A")];

        apply_visemes(&catalog, &timeline, 0.5, &mut registry, MOUTH, 0.2);
        let held = registry.weight_by_name("tongueOut");
        assert!(held > 0.0);

        // "A" has no extras, so tongueOut keeps its weight.
        apply_visemes(&catalog, &timeline, 1.5, &mut registry, MOUTH, 0.2);
        assert_eq!(registry.weight_by_name("tongueOut"), held);
    }

    #[test]
    fn test_builtin_catalog_covers_the_alphabet() {
        let catalog = VisemeCatalog::default();
        for symbol in 'A'..='Z' {
            assert!(
                catalog.get(&symbol.to_string()).is_some(),
                "missing viseme {}",
                symbol
            );
        }
        let a = catalog.get("A").unwrap();
        assert!((a.open - 1.0).abs() < 1e-6);
        assert!((a.smile - 0.38).abs() < 1e-6);
    }
}
