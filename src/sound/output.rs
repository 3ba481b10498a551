//! Audio output facilities.
//!
//! [`AudioOutput`] is the host side of playback: it takes an encoded
//! stream and plays it in the background, once or on repeat. None of its
//! calls block until playback ends, and none report when it does.

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use super::error::SoundError;
use super::source::SoundStream;

/// Non-blocking audio output.
pub trait AudioOutput {
    /// Starts playing the stream once.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be decoded or played.
    fn play(&mut self, stream: &SoundStream) -> Result<(), SoundError>;

    /// Starts playing the stream on repeat until stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be decoded or played.
    fn play_looping(&mut self, stream: &SoundStream) -> Result<(), SoundError>;

    /// Halts whatever is playing. Succeeds when nothing is.
    ///
    /// # Errors
    ///
    /// Returns an error if the device refuses to stop.
    fn stop(&mut self) -> Result<(), SoundError>;

    /// Releases the device. Later playback calls fail.
    fn close(&mut self);
}

// ============================================================================
// RodioOutput
// ============================================================================

struct Device {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Audio output backed by rodio.
///
/// Each playback gets its own [`Sink`], kept so that `stop` can halt it.
pub struct RodioOutput {
    device: Option<Device>,
    sink: Option<Sink>,
}

impl RodioOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            device: Some(Device {
                _stream: stream,
                handle,
            }),
            sink: None,
        })
    }

    fn decode(stream: &SoundStream) -> Result<Decoder<Cursor<Arc<[u8]>>>, SoundError> {
        Decoder::new(stream.reader()).map_err(|e| SoundError::DecodeError(e.to_string()))
    }

    fn start(&mut self, source: Box<dyn Source<Item = i16> + Send>) -> Result<(), SoundError> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| SoundError::DeviceNotAvailable("output closed".to_string()))?;

        let sink =
            Sink::try_new(&device.handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
        sink.append(source);

        if let Some(previous) = self.sink.replace(sink) {
            previous.stop();
        }
        Ok(())
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        let decoder = Self::decode(stream)?;
        self.start(Box::new(decoder))?;
        debug!("Sound playback started");
        Ok(())
    }

    fn play_looping(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        let decoder = Self::decode(stream)?;
        self.start(Box::new(decoder.repeat_infinite()))?;
        debug!("Looping sound playback started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("Sound playback stopped");
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if self.device.take().is_some() {
            debug!("Audio output stream closed");
        }
    }
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioOutput")
            .field("open", &self.device.is_some())
            .field("playing", &self.sink.is_some())
            .finish()
    }
}

// ============================================================================
// SilentOutput
// ============================================================================

/// Output that accepts every request and plays nothing.
///
/// Used when sound is disabled; the player still raises its events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn play(&mut self, _stream: &SoundStream) -> Result<(), SoundError> {
        debug!("Sound disabled, skipping playback");
        Ok(())
    }

    fn play_looping(&mut self, _stream: &SoundStream) -> Result<(), SoundError> {
        debug!("Sound disabled, skipping looping playback");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        Ok(())
    }

    fn close(&mut self) {}
}

// ============================================================================
// MockAudioOutput
// ============================================================================

/// A call received by [`MockAudioOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCall {
    /// One-shot playback of a stream with this many bytes.
    Play(usize),
    /// Looping playback of a stream with this many bytes.
    PlayLooping(usize),
    Stop,
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<OutputCall>,
    fail_play: bool,
    fail_stop: bool,
    closed: bool,
}

/// Recording audio output for testing.
///
/// Clones share their state, so a test can keep one clone while the
/// player owns another.
#[derive(Debug, Default, Clone)]
pub struct MockAudioOutput {
    state: Rc<RefCell<MockState>>,
}

impl MockAudioOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `play` and `play_looping` fail.
    pub fn set_fail_play(&self, fail: bool) {
        self.state.borrow_mut().fail_play = fail;
    }

    /// Makes `stop` fail.
    pub fn set_fail_stop(&self, fail: bool) {
        self.state.borrow_mut().fail_stop = fail;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<OutputCall> {
        self.state.borrow().calls.clone()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Play(_) | OutputCall::PlayLooping(_)))
            .count()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record_play(&self, call: OutputCall) -> Result<(), SoundError> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(SoundError::DeviceNotAvailable("output closed".to_string()));
        }
        if state.fail_play {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        state.calls.push(call);
        Ok(())
    }
}

impl AudioOutput for MockAudioOutput {
    fn play(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        self.record_play(OutputCall::Play(stream.len()))
    }

    fn play_looping(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        self.record_play(OutputCall::PlayLooping(stream.len()))
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        let mut state = self.state.borrow_mut();
        if state.fail_stop {
            return Err(SoundError::PlaybackError("Mock stop failure".to_string()));
        }
        state.calls.push(OutputCall::Stop);
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.calls.push(OutputCall::Close);
    }
}
