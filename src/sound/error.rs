//! Sound system error types.
//!
//! Every variant except [`SoundError::Released`] describes a playback
//! failure that the player recovers from locally. `Released` is the only
//! error that reaches callers of `play`/`stop`.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("オーディオデバイスが利用できません: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("サウンドファイルが見つかりません: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio data.
    #[error("サウンドファイルのデコードに失敗しました: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream.
    #[error("オーディオストリームの作成に失敗しました: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("サウンド再生エラー: {0}")]
    PlaybackError(String),

    /// Path is outside the allowed system sound directories.
    #[error("許可されていないパスです: {0}")]
    InvalidPath(String),

    /// No embedded clip, system sound or file matches the given name.
    #[error("サウンドが見つかりません: {0}")]
    UnknownSound(String),

    /// The completion timer could not be scheduled.
    #[error("完了タイマーを開始できません: {0}")]
    TimerUnavailable(String),

    /// The player was used after `release`.
    #[error("サウンドプレイヤーは既に解放されています")]
    Released,
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio data or its location.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::DecodeError(_)
                | Self::InvalidPath(_)
                | Self::UnknownSound(_)
        )
    }

    /// Returns true if the player was misused after release.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::Released)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "オーディオデバイスを接続してください",
            Self::FileNotFound(_) | Self::UnknownSound(_) => {
                "`chime list` で利用可能なサウンドを確認してください"
            }
            Self::DecodeError(_) => "サウンドファイルが破損している可能性があります",
            Self::StreamError(_) => "オーディオ設定を確認してください",
            Self::PlaybackError(_) => "アプリケーションを再起動してください",
            Self::InvalidPath(_) => "システムサウンドのディレクトリ内のファイルを指定してください",
            Self::TimerUnavailable(_) => "非同期ランタイム内から再生してください",
            Self::Released => "新しいサウンドプレイヤーを作成してください",
        }
    }
}
