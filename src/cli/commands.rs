//! Command definitions for the chime CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// chime - timer sounds with start/stop/completion events
#[derive(Parser, Debug)]
#[command(
    name = "chime",
    version,
    about = "タイマー用サウンド再生ツール",
    long_about = "埋め込みサウンド・システムサウンド・音声ファイルを再生し、\n\
                  開始・停止・完了イベントを表示します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Play a sound and report its lifecycle events
    Play(PlayArgs),

    /// List embedded and system sounds
    List,

    /// Show the effective configuration
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Play Command Arguments
// ============================================================================

/// Sound reference that requests silence.
pub const SILENCE: &str = "none";

/// Arguments for the play command
#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Embedded clip, system sound name, file path, or "none" for silence
    #[arg(value_parser = validate_sound_name)]
    pub sound: Option<String>,

    /// Repeat the sound until stopped
    #[arg(short, long = "loop", overrides_with = "once")]
    pub looping: bool,

    /// Play the sound once, even if the configuration says to loop
    #[arg(long, overrides_with = "looping")]
    pub once: bool,

    /// Stop playback after this many seconds (1-3600)
    #[arg(
        short,
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub stop_after: Option<u64>,

    /// Run without producing sound (events are still reported)
    #[arg(long, overrides_with = "audible")]
    pub no_sound: bool,

    /// Produce sound, even if the configuration disables it
    #[arg(long, overrides_with = "no_sound")]
    pub audible: bool,
}

impl PlayArgs {
    /// Looping requested on the command line, if any.
    #[must_use]
    pub fn looping_override(&self) -> Option<bool> {
        match (self.looping, self.once) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }

    /// Sound enablement requested on the command line, if any.
    #[must_use]
    pub fn enabled_override(&self) -> Option<bool> {
        match (self.no_sound, self.audible) {
            (true, _) => Some(false),
            (false, true) => Some(true),
            (false, false) => None,
        }
    }
}

/// Validates a sound reference.
fn validate_sound_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("サウンド名を指定してください".to_string());
    }
    if s.len() > 1024 {
        return Err("サウンド名が長すぎます".to_string());
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================
