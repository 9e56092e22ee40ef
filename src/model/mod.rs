//! Skinned-model description and clip catalogue.
//!
//! The engine never decodes 3D assets itself. A loader collaborator hands
//! over a [`ModelRig`]: the skinned sub-meshes with their morph-target name
//! lists, the skeleton node names, and the named animation clips. A JSON
//! manifest with the same shape lets the engine run headless.

pub mod registry;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ModelError;

pub use registry::MorphRegistry;

/// One skinned sub-mesh: morph-target names plus their current influences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinnedMesh {
    /// Mesh name in the scene graph
    pub name: String,
    /// Morph-target names, in influence-array order
    pub morph_targets: Vec<String>,
    /// Current influence per morph target
    #[serde(default)]
    pub influences: Vec<f32>,
}

/// A named skeletal clip. Track values stay with the renderer; the engine
/// only needs names and durations to drive crossfades and completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip name ("Idle", "Talking_1", ...)
    pub name: String,
    /// Authored duration in seconds
    pub duration: f32,
    /// Track names as "<node>.<property>"
    #[serde(default)]
    pub tracks: Vec<String>,
}

impl AnimationClip {
    /// The scene-graph node a track targets.
    pub fn track_node(track: &str) -> &str {
        track.split('.').next().unwrap_or(track)
    }
}

/// The loaded model as the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRig {
    /// Skinned sub-meshes carrying morph targets
    pub meshes: Vec<SkinnedMesh>,
    /// Skeleton node names present in the scene graph
    pub nodes: Vec<String>,
    /// Animation clips, filtered to tracks whose nodes exist
    pub clips: Vec<AnimationClip>,
}

impl ModelRig {
    /// Load a rig from a JSON manifest file.
    pub fn from_manifest_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModelError::ReadManifest(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_manifest_str(&contents)
    }

    /// Parse a rig from a JSON manifest string.
    pub fn from_manifest_str(s: &str) -> Result<Self, ModelError> {
        let mut rig: ModelRig =
            serde_json::from_str(s).map_err(|e| ModelError::Parse(e.to_string()))?;

        if rig.meshes.is_empty() {
            return Err(ModelError::NoMeshes);
        }

        // Influence arrays default to zeroed, one slot per morph target.
        for mesh in &mut rig.meshes {
            if mesh.influences.len() != mesh.morph_targets.len() {
                mesh.influences = vec![0.0; mesh.morph_targets.len()];
            }
        }

        rig.filter_clips();
        Ok(rig)
    }

    /// Drop clip tracks that reference unknown skeleton nodes, and drop
    /// clips left with no tracks at all.
    fn filter_clips(&mut self) {
        let known: HashSet<&str> = self.nodes.iter().map(|s| s.as_str()).collect();

        for clip in &mut self.clips {
            clip.tracks
                .retain(|t| known.contains(AnimationClip::track_node(t)));
        }
        self.clips.retain(|c| !c.tracks.is_empty());

        tracing::debug!(
            "Rig ready: {} meshes, {} nodes, {} clips after track filtering",
            self.meshes.len(),
            self.nodes.len(),
            self.clips.len()
        );
    }

    /// Names of all clips in the catalogue.
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }
}
