//! CLI module for chime.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `session`: Drives one playback until it completes or is stopped
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod session;

pub use commands::{Cli, Commands, PlayArgs, SILENCE};
pub use display::Display;
pub use session::{completes_on_its_own, run_session, PlayRequest, SessionEnd};
