//! chime library
//!
//! Sound playback for desktop timers. It includes:
//! - A sound player raising started/stopped/completed events
//! - Completion synthesis for clips with a known duration
//! - Embedded clips and system sound discovery
//! - Configuration and CLI plumbing for the `chime` binary

pub mod cli;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::SoundConfig;

pub use sound::{
    get_default_sound, try_create_player, AudioOutput, CompletionTimer, DefaultSoundPlayer,
    EventHub, PlayerEvent, Sound, SoundError, SoundPlayer, SoundSource, SoundStream,
};
