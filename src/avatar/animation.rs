//! Skeletal-clip crossfade state machine.
//!
//! One clip is the target at any time; every other action fades toward
//! zero influence. Transitions always crossfade over a fixed duration.
//! Requested clips play exactly once at a scaled speed (half authored
//! speed by default) and clamp to their final pose; when a non-idle
//! clip completes naturally the controller returns to the idle clip on
//! its own.
//!
//! Completion notifications travel out-of-band through a channel and are
//! drained before the next frame reads controller state. Each transition
//! bumps a generation token, so a notification raised for an earlier
//! target can never fire a stale return-to-idle.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::model::AnimationClip;

/// Playback status of one clip action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// Not contributing; local time reset
    Stopped,
    /// Advancing local time
    Playing,
    /// Completed one-shot, clamped at its final pose
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    target: f32,
    /// Weight change per second (signed)
    rate: f32,
}

/// Per-clip mixer bookkeeping.
#[derive(Debug, Clone)]
struct ClipAction {
    time: f32,
    weight: f32,
    fade: Option<Fade>,
    status: ActionStatus,
}

impl ClipAction {
    fn new() -> Self {
        Self {
            time: 0.0,
            weight: 0.0,
            fade: None,
            status: ActionStatus::Stopped,
        }
    }
}

/// Raised when a one-shot action reaches its clip's end.
#[derive(Debug, Clone, Copy)]
struct FinishedEvent {
    clip: usize,
    generation: u64,
}

/// Crossfade controller over a fixed clip catalogue.
pub struct AnimationController {
    clips: Vec<AnimationClip>,
    actions: Vec<ClipAction>,
    /// Index of the current target clip
    target: Option<usize>,
    /// Bumped on every transition; in-flight events from older targets
    /// fail the comparison and are dropped
    generation: u64,
    /// Generation the completion listener was registered under, or None
    /// while the target is the idle clip (no listener)
    listener: Option<u64>,
    idle_clip: String,
    fade_duration: f32,
    time_scale: f32,
    finished_tx: Sender<FinishedEvent>,
    finished_rx: Receiver<FinishedEvent>,
}

impl AnimationController {
    /// Build the controller and start the initial clip: the idle clip if
    /// the catalogue has one, otherwise the first clip.
    pub fn new(clips: Vec<AnimationClip>, idle_clip: &str, fade_duration: f32, time_scale: f32) -> Self {
        let (finished_tx, finished_rx) = unbounded();
        let actions = clips.iter().map(|_| ClipAction::new()).collect();

        let mut controller = Self {
            clips,
            actions,
            target: None,
            generation: 0,
            listener: None,
            idle_clip: idle_clip.to_string(),
            fade_duration,
            time_scale,
            finished_tx,
            finished_rx,
        };

        let initial = controller
            .clip_index(&controller.idle_clip)
            .or(if controller.clips.is_empty() { None } else { Some(0) });
        if let Some(idx) = initial {
            controller.begin(idx);
        }
        controller
    }

    fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }

    /// Name of the current target clip.
    pub fn target_name(&self) -> Option<&str> {
        self.target.map(|idx| self.clips[idx].name.as_str())
    }

    /// Whether the catalogue contains `name`.
    pub fn has_clip(&self, name: &str) -> bool {
        self.clip_index(name).is_some()
    }

    /// Request a transition to the named clip.
    ///
    /// Unknown names are ignored and the controller stays on its previous
    /// target; re-requesting the current target is a no-op.
    pub fn request(&mut self, name: &str) {
        let Some(next) = self.clip_index(name) else {
            tracing::debug!("Ignoring request for unknown clip: {}", name);
            return;
        };
        if self.target == Some(next) {
            return;
        }
        self.begin(next);
    }

    /// Make `next` the target: dispose the old completion subscription,
    /// fade out everything else, fade in a fresh one-shot action.
    fn begin(&mut self, next: usize) {
        // Replacing the target invalidates any in-flight completion
        // notification from the previous one.
        self.generation += 1;

        for idx in 0..self.actions.len() {
            if idx != next && (self.actions[idx].status != ActionStatus::Stopped || self.actions[idx].weight > 0.0) {
                self.start_fade(idx, 0.0);
            }
        }

        let action = &mut self.actions[next];
        action.time = 0.0;
        action.status = ActionStatus::Playing;
        self.start_fade(next, 1.0);

        self.target = Some(next);
        self.listener = if self.clips[next].name != self.idle_clip {
            Some(self.generation)
        } else {
            None
        };

        tracing::debug!("Animation target: {}", self.clips[next].name);
    }

    fn start_fade(&mut self, idx: usize, target: f32) {
        let action = &mut self.actions[idx];
        if self.fade_duration <= 0.0 {
            action.weight = target;
            action.fade = None;
            if target == 0.0 {
                action.status = ActionStatus::Stopped;
                action.time = 0.0;
            }
            return;
        }
        action.fade = Some(Fade {
            target,
            rate: (target - action.weight) / self.fade_duration,
        });
    }

    /// Advance fades and clip time by `dt` seconds (the frame tick).
    ///
    /// One-shot completions are queued on the out-of-band channel; call
    /// [`drain_finished`](Self::drain_finished) before the next frame
    /// reads controller state.
    pub fn update(&mut self, dt: f32) {
        for idx in 0..self.actions.len() {
            let duration = self.clips[idx].duration;
            let action = &mut self.actions[idx];

            if let Some(fade) = action.fade {
                action.weight += fade.rate * dt;
                let done = (fade.rate >= 0.0 && action.weight >= fade.target)
                    || (fade.rate < 0.0 && action.weight <= fade.target);
                if done {
                    action.weight = fade.target;
                    action.fade = None;
                    if action.weight == 0.0 && action.status != ActionStatus::Stopped {
                        action.status = ActionStatus::Stopped;
                        action.time = 0.0;
                    }
                }
            }

            if action.status == ActionStatus::Playing {
                action.time += dt * self.time_scale;
                if action.time >= duration {
                    // Play-once with clamp: hold the final pose and keep
                    // the current influence.
                    action.time = duration;
                    action.status = ActionStatus::Finished;
                    let _ = self.finished_tx.send(FinishedEvent {
                        clip: idx,
                        generation: self.generation,
                    });
                }
            }
        }
    }

    /// Apply queued completion notifications to controller state.
    ///
    /// A notification is acted on only when its generation matches the
    /// live subscription (notifications raised under an earlier target are
    /// stale and dropped) and the completed clip is not the idle clip.
    /// Acting on one requests the idle clip. The subscription is
    /// mixer-wide: a still-fading older action that runs out also
    /// triggers the return to idle.
    pub fn drain_finished(&mut self) {
        let events: Vec<FinishedEvent> = self.finished_rx.try_iter().collect();
        for event in events {
            if self.listener != Some(event.generation)
                || self.clips[event.clip].name == self.idle_clip
            {
                continue;
            }
            tracing::debug!(
                "Clip '{}' finished, returning to '{}'",
                self.clips[event.clip].name,
                self.idle_clip
            );
            let idle = self.idle_clip.clone();
            self.request(&idle);
        }
    }

    /// Current influence weight of a named clip's action.
    pub fn weight(&self, name: &str) -> f32 {
        self.clip_index(name)
            .map(|idx| self.actions[idx].weight)
            .unwrap_or(0.0)
    }

    /// Local playback time of a named clip's action.
    pub fn time(&self, name: &str) -> f32 {
        self.clip_index(name)
            .map(|idx| self.actions[idx].time)
            .unwrap_or(0.0)
    }

    /// Playback status of a named clip's action.
    pub fn status(&self, name: &str) -> ActionStatus {
        self.clip_index(name)
            .map(|idx| self.actions[idx].status)
            .unwrap_or(ActionStatus::Stopped)
    }
}
