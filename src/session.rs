//! Chat-session collaborator interface.
//!
//! A session delivers one [`Message`] at a time; the engine plays it and
//! answers with a played notification so the session can advance. The
//! wire shape matches the chat backend's JSON: camelCase field names,
//! base64 audio, cue timestamps in seconds.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::avatar::CueTimeline;

/// Lip-sync block of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lipsync {
    #[serde(rename = "mouthCues", default)]
    pub mouth_cues: CueTimeline,
}

/// One utterance from the chat collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Spoken text, for display only
    #[serde(default)]
    pub text: String,
    /// Base64-encoded audio payload
    pub audio: String,
    /// Cue timeline aligned to the audio
    #[serde(default)]
    pub lipsync: Option<Lipsync>,
    /// Expression preset name; engine default applies when absent
    #[serde(rename = "facialExpression", default)]
    pub facial_expression: Option<String>,
    /// Clip name; engine default applies when absent
    #[serde(default)]
    pub animation: Option<String>,
}

/// FIFO of pending messages; at most one is active at a time.
///
/// The owner pops the next message only after the engine reports the
/// current one fully played.
#[derive(Debug, Default)]
pub struct MessageQueue {
    pending: VecDeque<Message>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message.
    pub fn push(&mut self, message: Message) {
        self.pending.push_back(message);
    }

    /// Take the next message to play, if any.
    pub fn next(&mut self) -> Option<Message> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
