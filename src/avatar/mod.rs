//! Facial and animation blending engine.
//!
//! One [`AvatarEngine`] per loaded model. The owning session feeds it
//! messages and per-frame input; the engine blends expression, blink,
//! and lip-sync targets into the morph registry, drives the clip
//! crossfade controller, and reports when a message has fully played.

pub mod animation;
pub mod blend;
pub mod blink;
pub mod expression;
pub mod viseme;

pub use animation::{ActionStatus, AnimationController};
pub use blend::approach;
pub use expression::{ExpressionCatalog, PresetWeights};
pub use viseme::{CueTimeline, MouthCue, VisemeCatalog, VisemeEntry};

use crate::audio::AudioSync;
use crate::config::{Config, EngineConfig};
use crate::error::Result;
use crate::model::{ModelRig, MorphRegistry};
use crate::session::Message;

use blink::apply_blink;
use expression::apply_expression;
use viseme::apply_visemes;

/// Per-frame input from the render loop and the timer collaborator.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Run the automated weight blending this frame. A setup/editor
    /// surface passes false to pose channels by hand.
    pub blending: bool,
    pub blink: bool,
    pub wink_left: bool,
    pub wink_right: bool,
}

impl FrameInput {
    /// A plain frame tick: blending on, no blink or wink held.
    pub fn tick(dt: f32) -> Self {
        Self {
            dt,
            blending: true,
            blink: false,
            wink_left: false,
            wink_right: false,
        }
    }
}

/// Notifications for the owning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The active message's audio finished; the session may advance.
    MessagePlayed,
}

/// The per-model blending engine.
pub struct AvatarEngine {
    engine: EngineConfig,
    expressions: ExpressionCatalog,
    visemes: VisemeCatalog,
    registry: MorphRegistry,
    animation: AnimationController,
    audio: AudioSync,
    /// Cue timeline of the active message
    timeline: Option<CueTimeline>,
    /// Active preset name; empty resolves to the empty preset
    active_expression: String,
}

impl AvatarEngine {
    /// Build an engine for `rig` with the given configuration.
    pub fn new(rig: &ModelRig, config: Config) -> Self {
        let registry = MorphRegistry::from_rig(rig);
        let animation = AnimationController::new(
            rig.clips.clone(),
            &config.engine.idle_clip,
            config.engine.fade_duration,
            config.engine.clip_time_scale,
        );
        let audio = AudioSync::new(&config.audio);

        tracing::info!(
            "Engine ready: {} morph channels, {} clips",
            registry.len(),
            rig.clips.len()
        );

        Self {
            engine: config.engine,
            expressions: config.expressions,
            visemes: config.visemes,
            registry,
            animation,
            audio,
            timeline: None,
            active_expression: String::new(),
        }
    }

    /// Replace the active message.
    ///
    /// `None` means immediate idle: animation back to the idle clip, audio
    /// hard-stopped and discarded, cue timeline cleared, expression
    /// cleared, all before this call returns. `Some` starts the new
    /// utterance, cancelling any prior audio session first; the animation
    /// change still goes through the normal crossfade.
    pub fn set_message(&mut self, message: Option<&Message>) -> Result<()> {
        let Some(message) = message else {
            tracing::debug!("Message cleared, returning to idle");
            let idle = self.engine.idle_clip.clone();
            self.animation.request(&idle);
            self.audio.stop();
            self.timeline = None;
            self.active_expression.clear();
            return Ok(());
        };

        // Drop the old timeline before touching audio so a failed start
        // can never leave a stale cue/clock pairing behind.
        self.timeline = None;
        let cues = message
            .lipsync
            .as_ref()
            .map(|lipsync| lipsync.mouth_cues.clone());
        let fallback_duration = cues
            .as_deref()
            .and_then(|cues| cues.last())
            .map(|cue| cue.end)
            .unwrap_or(0.0);

        self.audio.start(&message.audio, fallback_duration)?;

        self.active_expression = message
            .facial_expression
            .clone()
            .unwrap_or_else(|| self.engine.default_expression.clone());
        let clip = message
            .animation
            .as_deref()
            .unwrap_or(&self.engine.default_clip)
            .to_string();
        self.animation.request(&clip);
        self.timeline = cues;

        tracing::info!(
            "Message started: expression '{}', clip '{}'",
            self.active_expression,
            clip
        );
        Ok(())
    }

    /// Advance one frame.
    ///
    /// Out-of-band completion notifications are applied first, then the
    /// mixer and audio clock advance, then the blend passes run in their
    /// fixed order: expression, blink, viseme. Later passes win conflicts
    /// on a shared channel.
    pub fn update(&mut self, frame: &FrameInput) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        self.animation.drain_finished();
        self.animation.update(frame.dt);

        if self.audio.update(frame.dt) {
            // Audio completion: revert to idle and drop the lip-sync
            // session before any viseme sampling can see it. The
            // expression intentionally stays until the next message.
            tracing::info!("Message fully played");
            let idle = self.engine.idle_clip.clone();
            self.animation.request(&idle);
            self.timeline = None;
            events.push(EngineEvent::MessagePlayed);
        }

        if frame.blending {
            apply_expression(
                &self.expressions,
                &self.active_expression,
                &mut self.registry,
                (
                    self.engine.blink_left_channel.as_str(),
                    self.engine.blink_right_channel.as_str(),
                ),
                self.engine.expression_rate,
            );

            apply_blink(
                frame.blink,
                frame.wink_left,
                frame.wink_right,
                &mut self.registry,
                (
                    self.engine.blink_left_channel.as_str(),
                    self.engine.blink_right_channel.as_str(),
                ),
                self.engine.blink_rate,
            );

            if let (Some(timeline), Some(t)) = (&self.timeline, self.audio.current_time()) {
                apply_visemes(
                    &self.visemes,
                    timeline,
                    t,
                    &mut self.registry,
                    (
                        self.engine.mouth_open_channel.as_str(),
                        self.engine.mouth_smile_channel.as_str(),
                    ),
                    self.engine.viseme_rate,
                );
            }
        }

        events
    }

    /// Write the blended weights back into the rig for rendering.
    pub fn sync_rig(&self, rig: &mut ModelRig) {
        self.registry.apply_to(rig);
    }

    /// The morph registry (channel weights).
    pub fn registry(&self) -> &MorphRegistry {
        &self.registry
    }

    /// The crossfade controller.
    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    /// The audio driver.
    pub fn audio(&self) -> &AudioSync {
        &self.audio
    }

    /// Active expression preset name; empty when cleared.
    pub fn active_expression(&self) -> &str {
        &self.active_expression
    }

    /// Cue timeline of the active message, if any.
    pub fn timeline(&self) -> Option<&[MouthCue]> {
        self.timeline.as_deref()
    }
}
