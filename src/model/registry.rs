//! Morph-channel registry.
//!
//! Built once per loaded model: one record per distinct morph-target name,
//! with the (mesh, slot) positions that name occupies across sub-meshes.
//! The registry owns the authoritative weight for each channel; the rig's
//! influence arrays are write-through targets for the renderer.

use std::collections::HashMap;

use super::ModelRig;

/// One named morph channel and everywhere it appears on the model.
#[derive(Debug, Clone)]
pub struct MorphChannel {
    /// Channel name ("jawOpen", "eyeBlinkLeft", ...)
    pub name: String,
    /// Current weight, nominally in [0, 1] (not enforced)
    pub weight: f32,
    /// (mesh index, influence slot) for every sub-mesh carrying this target
    bindings: Vec<(usize, usize)>,
}

/// Name-indexed arena of morph channels for one loaded model.
///
/// Rebuilt whenever the model reloads; channel indices are stable for the
/// registry's lifetime and can be pre-resolved for hot-path writes.
#[derive(Debug, Default)]
pub struct MorphRegistry {
    channels: Vec<MorphChannel>,
    by_name: HashMap<String, usize>,
}

impl MorphRegistry {
    /// Build the registry with a single pass over the rig's sub-meshes.
    pub fn from_rig(rig: &ModelRig) -> Self {
        let mut registry = Self::default();

        for (mesh_idx, mesh) in rig.meshes.iter().enumerate() {
            for (slot, name) in mesh.morph_targets.iter().enumerate() {
                let idx = match registry.by_name.get(name) {
                    Some(&idx) => idx,
                    None => {
                        let idx = registry.channels.len();
                        registry.channels.push(MorphChannel {
                            name: name.clone(),
                            weight: 0.0,
                            bindings: Vec::new(),
                        });
                        registry.by_name.insert(name.clone(), idx);
                        idx
                    }
                };
                registry.channels[idx].bindings.push((mesh_idx, slot));
            }
        }

        tracing::debug!("Morph registry built: {} channels", registry.channels.len());
        registry
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the registry has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Resolve a channel name to its index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Channel names in arena order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Channel name by index.
    pub fn name(&self, idx: usize) -> &str {
        &self.channels[idx].name
    }

    /// Current weight by index.
    pub fn weight(&self, idx: usize) -> f32 {
        self.channels[idx].weight
    }

    /// Current weight by name, or 0 for an unknown channel.
    pub fn weight_by_name(&self, name: &str) -> f32 {
        self.index_of(name).map(|i| self.weight(i)).unwrap_or(0.0)
    }

    /// Set a weight by index.
    pub fn set_weight(&mut self, idx: usize, weight: f32) {
        self.channels[idx].weight = weight;
    }

    /// Set a weight by name. Unknown names are ignored.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) {
        if let Some(idx) = self.index_of(name) {
            self.set_weight(idx, weight);
        }
    }

    /// Write every channel weight back into the rig's influence arrays.
    pub fn apply_to(&self, rig: &mut ModelRig) {
        for channel in &self.channels {
            for &(mesh_idx, slot) in &channel.bindings {
                if let Some(mesh) = rig.meshes.get_mut(mesh_idx) {
                    if let Some(influence) = mesh.influences.get_mut(slot) {
                        *influence = channel.weight;
                    }
                }
            }
        }
    }
}
