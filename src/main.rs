//! chime - timer sounds with lifecycle events
//!
//! Plays embedded clips, system sounds or audio files and reports when
//! playback starts, stops and completes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::task::LocalSet;

use chime::cli::{
    completes_on_its_own, run_session, Cli, Commands, Display, PlayArgs, PlayRequest, SessionEnd,
    SILENCE,
};
use chime::sound::{
    discover_system_sounds, embedded_sounds, resolve, try_create_player, Sound, SoundError,
};
use chime::types::{default_config_path, SoundConfig};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match execute(cli).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Display::show_error(&format!("{:#}", e));
            if let Some(sound_error) = e.chain().find_map(|c| c.downcast_ref::<SoundError>()) {
                Display::show_hint(sound_error.suggestion());
            }
            std::process::exit(1);
        }
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info,chime=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command, returning the process exit code.
async fn execute(cli: Cli) -> Result<i32> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    match cli.command {
        Some(Commands::Play(args)) => {
            let config = SoundConfig::load_or_default(&config_path)?;
            let end = LocalSet::new().run_until(play(args, config)).await?;
            Display::show_session_end(end);
            return Ok(if end == SessionEnd::Failed { 1 } else { 0 });
        }
        Some(Commands::List) => list(),
        Some(Commands::Config { init }) => show_config(config_path, init)?,
        Some(Commands::Completions { shell }) => generate_completions(shell),
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(0)
}

/// Applies the command-line flags on top of the file configuration.
fn effective_config(args: &PlayArgs, mut config: SoundConfig) -> SoundConfig {
    if let Some(sound) = &args.sound {
        config = config.with_sound(sound.clone());
    }
    if let Some(looping) = args.looping_override() {
        config = config.with_looping(looping);
    }
    if let Some(enabled) = args.enabled_override() {
        config = config.with_enabled(enabled);
    }
    config
}

/// Plays one sound on the owning local set.
async fn play(args: PlayArgs, config: SoundConfig) -> Result<SessionEnd> {
    let config = effective_config(&args, config);
    let reference = config.sound.as_str();
    let sound = if reference == SILENCE {
        None
    } else {
        Some(resolve(reference).with_context(|| format!("'{}' を解決できません", reference))?)
    };

    let request = PlayRequest {
        sound,
        looping: config.looping,
        stop_after: args.stop_after.map(Duration::from_secs),
    };
    let name = request
        .sound
        .as_ref()
        .map_or(SILENCE.to_string(), |s| s.name().to_string());

    if request.sound.is_some() && !completes_on_its_own(&request) && request.stop_after.is_none() {
        Display::show_waiting_for_interrupt();
    }

    let mut player = try_create_player(!config.enabled);
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let end = run_session(&mut player, &request, interrupt, |event| {
        Display::show_event(event, &name)
    })
    .await?;

    player.release();
    Ok(end)
}

/// Lists embedded and system sounds with their durations.
fn list() {
    let with_duration = |sounds: Vec<chime::SoundSource>| {
        sounds
            .into_iter()
            .map(|sound| {
                let duration = Sound::duration(&sound);
                (sound, duration)
            })
            .collect::<Vec<_>>()
    };

    Display::show_sound_list(
        &with_duration(embedded_sounds()),
        &with_duration(discover_system_sounds()),
    );
}

/// Shows the effective configuration, optionally creating the file.
fn show_config(path: PathBuf, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            Display::show_config_exists(&path);
        } else {
            SoundConfig::default().save(&path)?;
            Display::show_config_created(&path);
        }
    }

    let config = SoundConfig::load_or_default(&path)?;
    Display::show_config(&path, path.exists(), &config);
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_play_silent_request() {
        let args = PlayArgs {
            sound: Some(SILENCE.to_string()),
            no_sound: true,
            ..Default::default()
        };
        let end = LocalSet::new()
            .run_until(play(args, SoundConfig::default()))
            .await
            .unwrap();
        assert_eq!(end, SessionEnd::Silent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_embedded_without_sound_completes() {
        let args = PlayArgs {
            sound: Some("chime".to_string()),
            no_sound: true,
            ..Default::default()
        };
        let end = LocalSet::new()
            .run_until(play(args, SoundConfig::default()))
            .await
            .unwrap();
        assert_eq!(end, SessionEnd::Completed);
    }

    #[tokio::test]
    async fn test_play_unknown_sound_is_error() {
        let args = PlayArgs {
            sound: Some("NoSuchSound12345".to_string()),
            no_sound: true,
            ..Default::default()
        };
        let result = LocalSet::new()
            .run_until(play(args, SoundConfig::default()))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_both_ways() {
        let config = SoundConfig {
            sound: "beep".to_string(),
            looping: true,
            enabled: false,
        };

        let unchanged = effective_config(&PlayArgs::default(), config.clone());
        assert_eq!(unchanged, config);

        let args = PlayArgs {
            sound: Some("chime".to_string()),
            once: true,
            audible: true,
            ..Default::default()
        };
        let overridden = effective_config(&args, config);
        assert_eq!(overridden.sound, "chime");
        assert!(!overridden.looping);
        assert!(overridden.enabled);
    }

    #[test]
    fn test_show_config_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        show_config(path.clone(), true).unwrap();
        assert!(path.exists());
        assert_eq!(SoundConfig::load(&path).unwrap(), SoundConfig::default());
    }
}
