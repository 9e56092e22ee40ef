//! kotoba3d - Talking-Character Blending Engine
//!
//! A frame-driven engine that blends a talking 3D character's face and
//! body into one coherent pose:
//! - Expression presets, blink/wink state, and audio-synchronized
//!   visemes eased into morph-channel weights
//! - A named-clip crossfade state machine with one-shot playback and
//!   auto-return-to-idle
//! - An audio driver that owns each message's playback session and
//!   clock, and notifies the session when an utterance finishes
//!
//! Asset decoding, chat transport, and rendering live outside; the
//! engine consumes a [`model::ModelRig`] description and
//! [`session::Message`] values and produces per-frame channel weights
//! and clip influences.

pub mod audio;
pub mod avatar;
pub mod config;
pub mod error;
pub mod model;
pub mod session;

pub use avatar::{AvatarEngine, EngineEvent, FrameInput};
pub use config::Config;
pub use error::{Kotoba3dError, Result};
pub use model::ModelRig;
pub use session::{Message, MessageQueue};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
