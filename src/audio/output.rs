//! Audio output device wrapper.
//!
//! Thin rodio layer: open the default output once, then hand out a sink
//! per played payload. The engine works without a device at all, so
//! opening is allowed to fail and callers treat the output as optional.

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::time::Duration;

use crate::error::AudioError;

/// An open output device.
pub struct AudioOutput {
    /// Must stay alive for the stream handle to keep working
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AudioError::OutputInit(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Decode `bytes` and start playing them on a fresh sink.
    ///
    /// Returns the sink and the decoder-reported duration when the
    /// container carries one.
    pub fn play(&self, bytes: Vec<u8>, volume: f32) -> Result<(Sink, Option<Duration>), AudioError> {
        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode(e.to_string()))?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| AudioError::OutputInit(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(source);

        Ok((sink, duration))
    }
}
