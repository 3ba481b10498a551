//! Drives a single playback from the command line.
//!
//! Runs on the owning `LocalSet` together with the player's completion
//! timer, and ends on the first of: completion, the optional stop deadline,
//! or an interrupt.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::sound::{AudioOutput, CompletionTimer, PlayerEvent, Sound, SoundPlayer, SoundSource};

/// What to play.
#[derive(Debug, Clone, Default)]
pub struct PlayRequest {
    /// `None` requests silence.
    pub sound: Option<SoundSource>,
    pub looping: bool,
    pub stop_after: Option<Duration>,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Silence was requested; nothing played
    Silent,
    /// The sound could not be played
    Failed,
    /// The clip reached its end
    Completed,
    /// Stopped at the requested deadline
    StoppedAfterDeadline,
    /// Stopped by an interrupt
    Interrupted,
}

/// Plays the request and waits for the session to end.
///
/// Every event raised by the player is passed to `on_event` in order,
/// including the `Stopped` that precedes each `play`. The session's
/// subscription is removed before returning, so the player can be reused.
///
/// # Errors
///
/// Returns an error if the player has been released.
pub async fn run_session<O, T, F>(
    player: &mut SoundPlayer<O, T>,
    request: &PlayRequest,
    interrupt: F,
    on_event: impl FnMut(PlayerEvent),
) -> Result<SessionEnd>
where
    O: AudioOutput,
    T: CompletionTimer,
    F: Future<Output = ()>,
{
    let (subscription, events) = player.events().channel();
    let end = drive(player, request, events, interrupt, on_event).await;
    player.events().unsubscribe(subscription);
    end
}

async fn drive<O, T, F>(
    player: &mut SoundPlayer<O, T>,
    request: &PlayRequest,
    mut events: mpsc::UnboundedReceiver<PlayerEvent>,
    interrupt: F,
    mut on_event: impl FnMut(PlayerEvent),
) -> Result<SessionEnd>
where
    O: AudioOutput,
    T: CompletionTimer,
    F: Future<Output = ()>,
{
    let sound = request.sound.as_ref().map(|s| s as &dyn Sound);
    let started = player.play(sound, request.looping)?;
    drain(&mut events, &mut on_event);

    if !started {
        return Ok(SessionEnd::Failed);
    }
    if sound.is_none() {
        return Ok(SessionEnd::Silent);
    }

    let deadline = request.stop_after.map(|after| Instant::now() + after);
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    // The player owns the sending side; it cannot close first.
                    return Ok(SessionEnd::Interrupted);
                };
                on_event(event);
                if event == PlayerEvent::Completed {
                    return Ok(SessionEnd::Completed);
                }
            }
            () = wait_for(deadline) => {
                debug!("Stop deadline reached");
                player.stop()?;
                drain(&mut events, &mut on_event);
                return Ok(SessionEnd::StoppedAfterDeadline);
            }
            () = &mut interrupt => {
                debug!("Interrupted");
                player.stop()?;
                drain(&mut events, &mut on_event);
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}

/// True if the request can end on its own by completing.
#[must_use]
pub fn completes_on_its_own(request: &PlayRequest) -> bool {
    !request.looping
        && request
            .sound
            .as_ref()
            .is_some_and(|sound| Sound::duration(sound).is_some())
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn drain(
    events: &mut mpsc::UnboundedReceiver<PlayerEvent>,
    on_event: &mut impl FnMut(PlayerEvent),
) {
    while let Ok(event) = events.try_recv() {
        on_event(event);
    }
}
