//! The sound player.
//!
//! [`SoundPlayer`] plays one sound at a time through an [`AudioOutput`] and
//! reports `Started`, `Stopped` and `Completed` to its subscribers. The
//! output cannot say when a clip has finished, so for one-shot playback of
//! a clip with a known duration the player arms a [`CompletionTimer`] and
//! raises `Completed` when it fires.
//!
//! All calls, and every event, happen on the single context that owns the
//! player. Handlers of `Started` and `Stopped` run inside `play`/`stop` and
//! must not call back into the player.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::error::SoundError;
use super::events::{EventHub, PlayerEvent};
use super::output::{AudioOutput, RodioOutput, SilentOutput};
use super::source::{Sound, SoundStream};
use super::timer::{CompletionTimer, TokioCompletionTimer};

/// Plays sounds and reports their lifecycle.
pub struct SoundPlayer<O: AudioOutput, T: CompletionTimer> {
    output: O,
    timer: T,
    /// Stream handed to the output by the most recent successful `play`.
    stream: Option<SoundStream>,
    events: Rc<EventHub>,
    /// Session whose completion is currently pending, if any.
    armed: Rc<Cell<Option<u64>>>,
    session: u64,
    released: bool,
}

impl<O: AudioOutput, T: CompletionTimer> SoundPlayer<O, T> {
    /// Creates an idle player. The timer must not be armed.
    pub fn new(output: O, mut timer: T) -> Self {
        timer.stop();
        Self {
            output,
            timer,
            stream: None,
            events: Rc::new(EventHub::new()),
            armed: Rc::new(Cell::new(None)),
            session: 0,
            released: false,
        }
    }

    /// Subscription point for lifecycle events.
    #[must_use]
    pub fn events(&self) -> &Rc<EventHub> {
        &self.events
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Plays a sound, replacing whatever is playing.
    ///
    /// `None` requests silence: the current sound is stopped and nothing new
    /// starts. Looping playback never completes; one-shot playback completes
    /// only when the sound's duration is known.
    ///
    /// Returns `Ok(false)` if the sound could not be played, leaving the
    /// player idle.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Released` if the player has been released.
    pub fn play(&mut self, sound: Option<&dyn Sound>, looping: bool) -> Result<bool, SoundError> {
        if !self.stop()? {
            return Ok(false);
        }

        let Some(sound) = sound else {
            debug!("No sound requested, staying idle");
            return Ok(true);
        };

        match self.start_session(sound, looping) {
            Ok(()) => {
                self.events.emit(PlayerEvent::Started);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to play sound '{}': {}", sound.name(), e);
                self.abandon_session();
                Ok(false)
            }
        }
    }

    /// Stops playback and cancels any pending completion.
    ///
    /// Succeeds, and raises `Stopped`, even when nothing is playing. Returns
    /// `Ok(false)` without raising anything if the output fails to stop.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Released` if the player has been released.
    pub fn stop(&mut self) -> Result<bool, SoundError> {
        self.ensure_not_released()?;

        match self.halt() {
            Ok(()) => {
                self.events.emit(PlayerEvent::Stopped);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to stop sound: {}", e);
                Ok(false)
            }
        }
    }

    /// Tears down playback and closes the output. Later calls to `play` and
    /// `stop` fail with `SoundError::Released`. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(e) = self.output.stop() {
            warn!("Failed to stop sound during release: {}", e);
        }
        self.disarm();
        self.stream = None;
        self.output.close();
        debug!("Sound player released");
    }

    fn ensure_not_released(&self) -> Result<(), SoundError> {
        if self.released {
            Err(SoundError::Released)
        } else {
            Ok(())
        }
    }

    fn start_session(&mut self, sound: &dyn Sound, looping: bool) -> Result<(), SoundError> {
        let stream = sound.open_stream()?;

        if looping {
            self.output.play_looping(&stream)?;
            debug!("Looping '{}'", sound.name());
        } else {
            self.output.play(&stream)?;
            match sound.stream_duration(&stream) {
                Some(duration) => self.arm_completion(duration)?,
                None => debug!("Duration of '{}' unknown, no completion", sound.name()),
            }
        }

        self.stream = Some(stream);
        Ok(())
    }

    fn arm_completion(&mut self, duration: std::time::Duration) -> Result<(), SoundError> {
        self.session += 1;
        let session = self.session;
        let armed = Rc::clone(&self.armed);
        let events: Weak<EventHub> = Rc::downgrade(&self.events);

        self.timer.set_interval(duration);
        self.timer.start(Box::new(move || {
            if armed.get() != Some(session) {
                return;
            }
            armed.set(None);
            if let Some(events) = events.upgrade() {
                events.emit(PlayerEvent::Completed);
            }
        }))?;
        self.armed.set(Some(session));

        debug!("Completion expected in {:?}", duration);
        Ok(())
    }

    fn disarm(&mut self) {
        self.timer.stop();
        self.armed.set(None);
    }

    fn halt(&mut self) -> Result<(), SoundError> {
        self.output.stop()?;
        self.disarm();
        if self.stream.take().is_some() {
            debug!("Sound stream released");
        }
        Ok(())
    }

    /// Returns to idle after a failed start, without raising events.
    fn abandon_session(&mut self) {
        if let Err(e) = self.output.stop() {
            debug!("Ignoring stop failure after failed start: {}", e);
        }
        self.disarm();
        self.stream = None;
    }
}

impl<O: AudioOutput, T: CompletionTimer> Drop for SoundPlayer<O, T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<O: AudioOutput, T: CompletionTimer> std::fmt::Debug for SoundPlayer<O, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundPlayer")
            .field("playing", &self.stream.is_some())
            .field("completion_pending", &self.armed.get().is_some())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

/// Player on the default audio device, completing via a tokio local timer.
pub type DefaultSoundPlayer = SoundPlayer<Box<dyn AudioOutput>, TokioCompletionTimer>;

impl AudioOutput for Box<dyn AudioOutput> {
    fn play(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        (**self).play(stream)
    }

    fn play_looping(&mut self, stream: &SoundStream) -> Result<(), SoundError> {
        (**self).play_looping(stream)
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        (**self).stop()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Creates a player on the default audio device.
///
/// With `disabled`, or if audio initialization fails (a warning is logged),
/// the player plays silently but still raises every event.
#[must_use]
pub fn try_create_player(disabled: bool) -> DefaultSoundPlayer {
    let output: Box<dyn AudioOutput> = if disabled {
        Box::new(SilentOutput)
    } else {
        match RodioOutput::new() {
            Ok(output) => Box::new(output),
            Err(e) => {
                warn!("Audio not available, sound disabled: {}", e);
                Box::new(SilentOutput)
            }
        }
    };
    SoundPlayer::new(output, TokioCompletionTimer::new())
}
