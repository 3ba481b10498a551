//! Display utilities for the chime CLI.
//!
//! This module provides formatted output for:
//! - Playback lifecycle events
//! - Sound listings
//! - Configuration
//! - Error messages

use std::path::Path;
use std::time::Duration;

use crate::cli::session::SessionEnd;
use crate::sound::{PlayerEvent, SoundSource};
use crate::types::SoundConfig;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a lifecycle event as it happens.
    pub fn show_event(event: PlayerEvent, sound_name: &str) {
        println!("{}", Self::format_event(event, sound_name));
    }

    /// Formats a lifecycle event line.
    pub fn format_event(event: PlayerEvent, sound_name: &str) -> String {
        match event {
            PlayerEvent::Started => format!("> 再生を開始しました: {}", sound_name),
            PlayerEvent::Stopped => "[] 停止しました".to_string(),
            PlayerEvent::Completed => format!("* 再生が完了しました: {}", sound_name),
        }
    }

    /// Shows a hint when the session can only end by interruption.
    pub fn show_waiting_for_interrupt() {
        println!("  Ctrl-C で停止します");
    }

    /// Shows how the session ended, when it needs explaining.
    pub fn show_session_end(end: SessionEnd) {
        match end {
            SessionEnd::Silent => println!("  無音が指定されたため再生しませんでした"),
            SessionEnd::Failed => eprintln!("警告: サウンドを再生できませんでした"),
            SessionEnd::Completed | SessionEnd::StoppedAfterDeadline | SessionEnd::Interrupted => {}
        }
    }

    /// Shows the embedded and system sounds with their durations.
    pub fn show_sound_list(
        embedded: &[(SoundSource, Option<Duration>)],
        system: &[(SoundSource, Option<Duration>)],
    ) {
        println!("埋め込みサウンド");
        println!("─────────────────────────────");
        for (sound, duration) in embedded {
            println!("{}", Self::format_sound_entry(sound, *duration));
        }

        println!();
        println!("システムサウンド");
        println!("─────────────────────────────");
        if system.is_empty() {
            println!("  (見つかりません)");
        }
        for (sound, duration) in system {
            println!("{}", Self::format_sound_entry(sound, *duration));
        }
    }

    /// Formats one listing line.
    pub fn format_sound_entry(sound: &SoundSource, duration: Option<Duration>) -> String {
        let length = duration.map_or_else(|| "不明".to_string(), Self::format_duration);
        match sound.path() {
            Some(path) => format!("  {:<16} {:>8}  {}", sound.name(), length, path.display()),
            None => format!("  {:<16} {:>8}", sound.name(), length),
        }
    }

    /// Shows the effective configuration.
    pub fn show_config(path: &Path, exists: bool, config: &SoundConfig) {
        println!("設定ファイル: {}", path.display());
        if !exists {
            println!("  (未作成のためデフォルト値を使用しています)");
        }
        println!("サウンド: {}", config.sound);
        println!("ループ: {}", Self::format_flag(config.looping));
        println!("サウンド有効: {}", Self::format_flag(config.enabled));
    }

    /// Shows a success message for config creation.
    pub fn show_config_created(path: &Path) {
        println!("* 設定ファイルを作成しました: {}", path.display());
    }

    /// Shows a notice that the config file already exists.
    pub fn show_config_exists(path: &Path) {
        println!("設定ファイルは既に存在します: {}", path.display());
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Shows a hint for resolving an error.
    pub fn show_hint(hint: &str) {
        eprintln!("ヒント: {}", hint);
    }

    /// Formats a duration as seconds with millisecond precision.
    pub fn format_duration(duration: Duration) -> String {
        format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
    }

    fn format_flag(value: bool) -> &'static str {
        if value {
            "はい"
        } else {
            "いいえ"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_event() {
        assert!(Display::format_event(PlayerEvent::Started, "chime").contains("chime"));
        assert!(Display::format_event(PlayerEvent::Stopped, "chime").contains("停止"));
        assert!(Display::format_event(PlayerEvent::Completed, "beep").contains("完了"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(Display::format_duration(Duration::from_millis(400)), "0.400s");
        assert_eq!(Display::format_duration(Duration::from_secs(65)), "65.000s");
        assert_eq!(Display::format_duration(Duration::ZERO), "0.000s");
    }

    #[test]
    fn test_format_sound_entry() {
        let embedded = Display::format_sound_entry(
            &SoundSource::embedded("chime"),
            Some(Duration::from_millis(400)),
        );
        assert!(embedded.contains("chime"));
        assert!(embedded.contains("0.400s"));

        let file = Display::format_sound_entry(&SoundSource::file("/tmp/Bell.mp3"), None);
        assert!(file.contains("Bell"));
        assert!(file.contains("不明"));
        assert!(file.contains("/tmp/Bell.mp3"));
    }

    #[test]
    fn test_format_flag() {
        assert_eq!(Display::format_flag(true), "はい");
        assert_eq!(Display::format_flag(false), "いいえ");
    }

    #[test]
    fn test_show_functions_do_not_panic() {
        Display::show_event(PlayerEvent::Started, "chime");
        Display::show_session_end(SessionEnd::Silent);
        Display::show_session_end(SessionEnd::Completed);
        Display::show_config(Path::new("/tmp/config.json"), false, &SoundConfig::default());
        Display::show_error("test");
        Display::show_hint("test");
    }
}
