//! Audio-synchronized playback driver.
//!
//! Owns at most one playable resource: the decoded payload of the active
//! message. Starting a new payload hard-stops and discards the previous
//! one first; there is never a frame with two live resources. The
//! playback position advances with the frame clock, which keeps lip-sync
//! sampling deterministic whether or not an output device exists, and
//! completion is raised when the position reaches the session duration.

pub mod output;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rodio::Sink;

use crate::config::AudioConfig;
use crate::error::AudioError;

pub use output::AudioOutput;

/// One active playback session.
struct PlaybackSession {
    /// Elapsed playback position in seconds
    position: f32,
    /// Session length in seconds
    duration: f32,
    /// Audible sink, present only when a device is open
    sink: Option<Sink>,
}

/// Driver for the current message's audio resource and clock.
pub struct AudioSync {
    out: Option<AudioOutput>,
    session: Option<PlaybackSession>,
    volume: f32,
}

impl AudioSync {
    /// Create the driver, opening the output device when enabled.
    ///
    /// A missing or failing device is logged and tolerated; the driver
    /// then runs silent with the same clock and completion behavior.
    pub fn new(config: &AudioConfig) -> Self {
        let out = if config.enabled {
            match AudioOutput::open() {
                Ok(out) => Some(out),
                Err(e) => {
                    tracing::warn!("Audio output unavailable, running silent: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            out,
            session: None,
            volume: config.volume,
        }
    }

    /// Start playing a base64 payload, discarding any prior session.
    ///
    /// `fallback_duration` bounds the session when the payload itself
    /// reports no length (the usual case for mp3); the caller passes the
    /// cue timeline's end.
    pub fn start(&mut self, payload: &str, fallback_duration: f32) -> Result<(), AudioError> {
        self.stop();

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| AudioError::InvalidPayload(e.to_string()))?;

        let mut duration = fallback_duration;
        let sink = match &self.out {
            Some(out) => match out.play(bytes, self.volume) {
                Ok((sink, decoded)) => {
                    if let Some(decoded) = decoded {
                        duration = decoded.as_secs_f32();
                    }
                    Some(sink)
                }
                Err(e) => {
                    // A payload the device cannot decode still drives the
                    // clock; the session just plays silent.
                    tracing::warn!("Audio payload not playable: {}", e);
                    None
                }
            },
            None => None,
        };

        tracing::debug!("Audio session started ({:.2}s)", duration);
        self.session = Some(PlaybackSession {
            position: 0.0,
            duration,
            sink,
        });
        Ok(())
    }

    /// Advance the playback clock. Returns true when the session
    /// completed on this tick; the resource is discarded before
    /// returning, so the completion's effects are visible immediately.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };

        session.position += dt;
        if session.position >= session.duration {
            tracing::debug!("Audio session completed");
            self.stop();
            return true;
        }
        false
    }

    /// Elapsed playback position, while a session is active.
    pub fn current_time(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.position)
    }

    /// Whether a session is active.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Hard-stop and discard the current session, if any.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Some(sink) = session.sink {
                sink.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_config() -> AudioConfig {
        AudioConfig {
            enabled: false,
            volume: 1.0,
        }
    }

    // "audio" in base64 — decodes fine, content is irrelevant silent-side.
    const PAYLOAD: &str = "YXVkaW8=";

    #[test]
    fn test_start_opens_a_session_without_a_device() {
        let mut audio = AudioSync::new(&silent_config());
        audio.start(PAYLOAD, 2.0).unwrap();
        assert!(audio.is_active());
        assert_eq!(audio.current_time(), Some(0.0));
    }

    #[test]
    fn test_clock_advances_with_frame_ticks() {
        let mut audio = AudioSync::new(&silent_config());
        audio.start(PAYLOAD, 2.0).unwrap();
        assert!(!audio.update(0.5));
        assert!((audio.current_time().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_completion_discards_the_resource() {
        let mut audio = AudioSync::new(&silent_config());
        audio.start(PAYLOAD, 1.0).unwrap();
        assert!(!audio.update(0.6));
        assert!(audio.update(0.6), "position passed duration");
        assert!(!audio.is_active());
        assert_eq!(audio.current_time(), None);
    }

    #[test]
    fn test_new_start_discards_prior_session_first() {
        let mut audio = AudioSync::new(&silent_config());
        audio.start(PAYLOAD, 10.0).unwrap();
        audio.update(3.0);
        audio.start(PAYLOAD, 5.0).unwrap();
        // One session only, restarted from zero.
        assert_eq!(audio.current_time(), Some(0.0));
        assert!(!audio.update(1.0));
    }

    #[test]
    fn test_invalid_payload_is_an_error_with_no_session() {
        let mut audio = AudioSync::new(&silent_config());
        let err = audio.start("not base64!!!", 1.0).unwrap_err();
        assert!(matches!(err, AudioError::InvalidPayload(_)));
        assert!(!audio.is_active());
    }

    #[test]
    fn test_invalid_payload_still_discards_prior_session() {
        let mut audio = AudioSync::new(&silent_config());
        audio.start(PAYLOAD, 10.0).unwrap();
        let _ = audio.start("***", 1.0);
        assert!(!audio.is_active(), "old resource must not survive a failed start");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut audio = AudioSync::new(&silent_config());
        audio.stop();
        audio.start(PAYLOAD, 1.0).unwrap();
        audio.stop();
        audio.stop();
        assert!(!audio.is_active());
    }
}
