//! Facial-expression presets and their per-frame application.
//!
//! A preset is a named bundle of target channel weights. Switching presets
//! is always a blend: every non-blink channel eases toward the preset's
//! weight (or 0 when the preset does not mention it), so there is never a
//! hard cut between faces.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::blend::approach;
use crate::model::MorphRegistry;

/// Target weights for one expression, keyed by channel name.
pub type PresetWeights = HashMap<String, f32>;

/// Named catalogue of expression presets.
///
/// Injected into the engine at construction; alternate catalogues for
/// different rigs substitute cleanly via config. An unknown preset name
/// resolves to the empty preset, relaxing every non-blink channel to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionCatalog {
    presets: HashMap<String, PresetWeights>,
}

impl ExpressionCatalog {
    /// Catalogue with no presets at all.
    pub fn empty() -> Self {
        Self {
            presets: HashMap::new(),
        }
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<&PresetWeights> {
        self.presets.get(name)
    }

    /// All preset names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|s| s.as_str())
    }

    /// Add or replace a preset.
    pub fn insert(&mut self, name: &str, weights: PresetWeights) {
        self.presets.insert(name.to_string(), weights);
    }
}

fn preset(entries: &[(&str, f32)]) -> PresetWeights {
    entries
        .iter()
        .map(|&(name, weight)| (name.to_string(), weight))
        .collect()
}

impl Default for ExpressionCatalog {
    /// The stock character catalogue.
    fn default() -> Self {
        let mut catalog = Self::empty();

        catalog.insert("default", PresetWeights::new());

        catalog.insert(
            "smile",
            preset(&[
                ("browInnerUp", 0.17),
                ("eyeSquintLeft", 0.4),
                ("eyeSquintRight", 0.44),
                ("noseSneerLeft", 0.170_000_07),
                ("noseSneerRight", 0.140_000_03),
                ("mouthPressLeft", 0.61),
                ("mouthPressRight", 0.41),
            ]),
        );

        catalog.insert(
            "funnyFace",
            preset(&[
                ("jawLeft", 0.63),
                ("mouthPucker", 0.53),
                ("noseSneerLeft", 1.0),
                ("noseSneerRight", 0.39),
                ("mouthLeft", 1.0),
                ("eyeLookUpLeft", 1.0),
                ("eyeLookUpRight", 1.0),
                ("cheekPuff", 0.999_992_5),
                ("mouthDimpleLeft", 0.414_743_9),
                ("mouthRollLower", 0.32),
                ("mouthSmileLeft", 0.354_997_34),
                ("mouthSmileRight", 0.354_997_34),
            ]),
        );

        catalog.insert(
            "sad",
            preset(&[
                ("mouthFrownLeft", 1.0),
                ("mouthFrownRight", 1.0),
                ("mouthShrugLower", 0.78341),
                ("browInnerUp", 0.452),
                ("eyeSquintLeft", 0.72),
                ("eyeSquintRight", 0.75),
                ("eyeLookDownLeft", 0.5),
                ("eyeLookDownRight", 0.5),
                ("jawForward", 1.0),
            ]),
        );

        catalog.insert(
            "surprised",
            preset(&[
                ("eyeWideLeft", 0.5),
                ("eyeWideRight", 0.5),
                ("jawOpen", 0.351),
                ("mouthFunnel", 1.0),
                ("browInnerUp", 1.0),
            ]),
        );

        catalog.insert(
            "angry",
            preset(&[
                ("browDownLeft", 1.0),
                ("browDownRight", 1.0),
                ("eyeSquintLeft", 1.0),
                ("eyeSquintRight", 1.0),
                ("jawForward", 1.0),
                ("jawLeft", 1.0),
                ("mouthShrugLower", 1.0),
                ("noseSneerLeft", 1.0),
                ("noseSneerRight", 0.42),
                ("eyeLookDownLeft", 0.16),
                ("eyeLookDownRight", 0.16),
                ("cheekSquintLeft", 1.0),
                ("cheekSquintRight", 1.0),
                ("mouthClose", 0.23),
                ("mouthFunnel", 0.63),
                ("mouthDimpleRight", 1.0),
            ]),
        );

        catalog.insert(
            "crazy",
            preset(&[
                ("browInnerUp", 0.9),
                ("jawForward", 1.0),
                ("noseSneerLeft", 0.57),
                ("noseSneerRight", 0.51),
                ("eyeLookDownLeft", 0.394_357_66),
                ("eyeLookUpRight", 0.403_976_14),
                ("eyeLookInLeft", 0.961_848),
                ("eyeLookInRight", 0.961_848),
                ("jawOpen", 0.961_848),
                ("mouthDimpleLeft", 0.961_848),
                ("mouthDimpleRight", 0.961_848),
                ("mouthStretchLeft", 0.278_935_9),
                ("mouthStretchRight", 0.288_554_4),
                ("mouthSmileLeft", 0.557_871_8),
                ("mouthSmileRight", 0.384_739_2),
                ("tongueOut", 0.961_848),
            ]),
        );

        catalog
    }
}

/// Ease every non-blink channel toward `preset_name`'s weights.
///
/// `blink_channels` are excluded here; the blink driver owns them at its
/// own (faster) rate.
pub fn apply_expression(
    catalog: &ExpressionCatalog,
    preset_name: &str,
    registry: &mut MorphRegistry,
    blink_channels: (&str, &str),
    rate: f32,
) {
    let weights = catalog.get(preset_name);

    for idx in 0..registry.len() {
        let target = {
            let name = registry.name(idx);
            if name == blink_channels.0 || name == blink_channels.1 {
                continue;
            }
            weights.and_then(|w| w.get(name)).copied().unwrap_or(0.0)
        };
        let next = approach(registry.weight(idx), target, rate);
        registry.set_weight(idx, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelRig, SkinnedMesh};

    const BLINKS: (&str, &str) = ("eyeBlinkLeft", "eyeBlinkRight");

    fn registry() -> MorphRegistry {
        let rig = ModelRig {
            meshes: vec![SkinnedMesh {
                name: "Head".into(),
                morph_targets: vec![
                    "browDownLeft".into(),
                    "browInnerUp".into(),
                    "eyeBlinkLeft".into(),
                    "eyeBlinkRight".into(),
                ],
                influences: vec![0.0; 4],
            }],
            nodes: vec![],
            clips: vec![],
        };
        MorphRegistry::from_rig(&rig)
    }

    #[test]
    fn test_builtin_catalog_has_stock_presets() {
        let catalog = ExpressionCatalog::default();
        for name in ["default", "smile", "funnyFace", "sad", "surprised", "angry", "crazy"] {
            assert!(catalog.get(name).is_some(), "missing preset {}", name);
        }
        assert_eq!(
            catalog.get("angry").unwrap().get("browDownLeft").copied(),
            Some(1.0)
        );
    }

    #[test]
    fn test_switch_to_angry_follows_geometric_series() {
        let catalog = ExpressionCatalog::default();
        let mut registry = registry();
        let idx = registry.index_of("browDownLeft").unwrap();

        apply_expression(&catalog, "angry", &mut registry, BLINKS, 0.1);
        assert!((registry.weight(idx) - 0.1).abs() < 1e-6, "after 1 frame");

        apply_expression(&catalog, "angry", &mut registry, BLINKS, 0.1);
        assert!((registry.weight(idx) - 0.19).abs() < 1e-6, "after 2 frames");

        for _ in 2..20 {
            apply_expression(&catalog, "angry", &mut registry, BLINKS, 0.1);
        }
        let expected = 1.0 - 0.9f32.powi(20);
        assert!(
            (registry.weight(idx) - expected).abs() < 1e-5,
            "after 20 frames: {} vs {}",
            registry.weight(idx),
            expected
        );
    }

    #[test]
    fn test_unknown_preset_relaxes_everything_toward_zero() {
        let catalog = ExpressionCatalog::default();
        let mut registry = registry();
        let idx = registry.index_of("browInnerUp").unwrap();
        registry.set_weight(idx, 1.0);

        apply_expression(&catalog, "no-such-face", &mut registry, BLINKS, 0.1);
        assert!((registry.weight(idx) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_blink_channels_are_never_touched() {
        let catalog = ExpressionCatalog::default();
        let mut registry = registry();
        let left = registry.index_of("eyeBlinkLeft").unwrap();
        let right = registry.index_of("eyeBlinkRight").unwrap();
        registry.set_weight(left, 0.5);
        registry.set_weight(right, 0.5);

        apply_expression(&catalog, "angry", &mut registry, BLINKS, 0.1);
        assert_eq!(registry.weight(left), 0.5);
        assert_eq!(registry.weight(right), 0.5);
    }

    #[test]
    fn test_preset_entry_for_absent_channel_is_never_read() {
        // "angry" mentions channels the registry lacks; applying must not
        // create them or fail.
        let catalog = ExpressionCatalog::default();
        let mut registry = registry();
        apply_expression(&catalog, "angry", &mut registry, BLINKS, 0.1);
        assert_eq!(registry.len(), 4);
        assert!(registry.index_of("cheekSquintLeft").is_none());
    }
}
