//! Sound playback for timer notifications.
//!
//! This module provides:
//!
//! - A [`SoundPlayer`] that plays one sound at a time and raises
//!   `Started`/`Stopped`/`Completed` events
//! - Completion synthesis from a clip's known duration
//! - Embedded clips and system sound discovery
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  events   ┌──────────────────┐
//! │   SoundPlayer    │──────────▶│     EventHub     │──▶ subscribers
//! └───┬──────────┬───┘           └──────────────────┘
//!     │          │ arm / stop              ▲
//!     │          ▼                         │ Completed
//!     │   ┌──────────────────┐             │
//!     │   │ CompletionTimer  │─────────────┘
//!     │   └──────────────────┘
//!     ▼ play / play_looping / stop
//! ┌──────────────────┐     ┌──────────────────┐
//! │   AudioOutput    │◀────│  Sound (stream,  │
//! │     (rodio)      │     │    duration)     │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use chime::sound::{get_default_sound, try_create_player};
//!
//! # async fn run() {
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async {
//!         let mut player = try_create_player(false);
//!         player.events().on_completed(|| println!("done"));
//!
//!         let sound = get_default_sound();
//!         player.play(Some(&sound), false).expect("player released");
//!     })
//!     .await;
//! # }
//! ```

mod embedded;
mod error;
mod events;
mod output;
mod player;
mod source;
mod timer;

pub use embedded::{
    get_embedded_sound, get_embedded_sound_format, wav_duration, EMBEDDED_SOUND_NAMES,
};
pub use error::SoundError;
pub use events::{EventHub, PlayerEvent, SubscriptionId};
pub use output::{AudioOutput, MockAudioOutput, OutputCall, RodioOutput, SilentOutput};
pub use player::{try_create_player, DefaultSoundPlayer, SoundPlayer};
pub use source::{
    discover_system_sounds, embedded_sounds, find_system_sound, get_default_sound, probe_duration,
    resolve, Sound, SoundSource, SoundStream,
};
pub use timer::{
    CompletionTimer, ManualTimer, TickHandler, TokioCompletionTimer, DEFAULT_COMPLETION_INTERVAL,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _: fn(bool) -> DefaultSoundPlayer = try_create_player;
        let _: fn() -> SoundSource = get_default_sound;
        let _: fn() -> Vec<SoundSource> = discover_system_sounds;
        let _: fn(&str) -> Result<SoundSource, SoundError> = find_system_sound;
        let _: fn(&str) -> Result<SoundSource, SoundError> = resolve;
        let _: fn(&str) -> Option<std::sync::Arc<[u8]>> = get_embedded_sound;
    }

    #[test]
    fn test_embedded_sounds_all_resolve() {
        for sound in embedded_sounds() {
            assert!(sound.open_stream().is_ok(), "{} failed", sound.name());
            assert!(Sound::duration(&sound).is_some());
        }
    }

    #[test]
    fn test_default_sound_has_known_duration() {
        let sound = get_default_sound();
        assert!(Sound::duration(&sound).unwrap() > std::time::Duration::ZERO);
    }
}
