//! Sound resources.
//!
//! A [`Sound`] is anything that can hand out a stream of encoded audio and
//! may know its own playing time. [`SoundSource`] covers the two kinds the
//! timer uses: sound files on disk and clips embedded in the binary.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, Source};
use tracing::debug;

use super::embedded::{get_embedded_sound, wav_duration, EMBEDDED_SOUND_NAMES};
use super::error::SoundError;

// ============================================================================
// Sound / SoundStream
// ============================================================================

/// A playable audio resource.
pub trait Sound {
    /// Display name of the sound.
    fn name(&self) -> &str;

    /// Opens a fresh stream of the encoded audio data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be read.
    fn open_stream(&self) -> Result<SoundStream, SoundError>;

    /// Playing time of the sound, if known.
    fn duration(&self) -> Option<Duration>;

    /// Playing time of a stream returned by [`Sound::open_stream`].
    ///
    /// The player arms completion from this, so the timer matches the data
    /// that was actually handed to the output.
    fn stream_duration(&self, _stream: &SoundStream) -> Option<Duration> {
        self.duration()
    }
}

/// An open stream of encoded audio data.
///
/// Cloning shares the underlying buffer. Dropping the last clone closes it.
#[derive(Debug, Clone)]
pub struct SoundStream {
    data: Arc<[u8]>,
}

impl SoundStream {
    #[must_use]
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Returns a seekable reader positioned at the start of the data.
    #[must_use]
    pub fn reader(&self) -> Cursor<Arc<[u8]>> {
        Cursor::new(Arc::clone(&self.data))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ============================================================================
// SoundSource
// ============================================================================

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A sound file, usually from `/System/Library/Sounds/`.
    System {
        /// The name of the sound (e.g., "Glass").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A clip compiled into the binary.
    Embedded {
        /// The name of the embedded clip (e.g., "chime").
        name: String,
    },
}

impl SoundSource {
    /// Creates a new file-backed sound source without validating the path.
    #[must_use]
    pub fn system(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::System {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a new system sound source with path validation.
    ///
    /// Only allows paths within the system sound directories:
    /// - `/System/Library/Sounds`
    /// - `/Library/Sounds`
    ///
    /// # Errors
    ///
    /// Returns `SoundError::InvalidPath` if the path is outside allowed directories.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chime::sound::SoundSource;
    ///
    /// let source = SoundSource::system_validated("Glass", "/System/Library/Sounds/Glass.aiff");
    /// assert!(source.is_ok());
    ///
    /// let source = SoundSource::system_validated("evil", "/tmp/evil.wav");
    /// assert!(source.is_err());
    /// ```
    pub fn system_validated(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, SoundError> {
        let path = path.into();
        validate_system_sound_path(&path)?;
        Ok(Self::System {
            name: name.into(),
            path,
        })
    }

    /// Creates a new embedded sound source.
    #[must_use]
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::Embedded { name: name.into() }
    }

    /// Creates a sound source for an arbitrary file, named after its stem.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::System { name, path }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::System { name, .. } | Self::Embedded { name } => name,
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Returns the file path if this is a file-backed sound.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::System { path, .. } => Some(path),
            Self::Embedded { .. } => None,
        }
    }

    fn read_data(&self) -> Result<Arc<[u8]>, SoundError> {
        match self {
            Self::System { path, .. } => std::fs::read(path)
                .map(Arc::from)
                .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e))),
            Self::Embedded { name } => {
                get_embedded_sound(name).ok_or_else(|| SoundError::UnknownSound(name.clone()))
            }
        }
    }
}

impl Sound for SoundSource {
    fn name(&self) -> &str {
        SoundSource::name(self)
    }

    fn open_stream(&self) -> Result<SoundStream, SoundError> {
        let data = self.read_data()?;
        debug!("Opened sound stream '{}' ({} bytes)", self.name(), data.len());
        Ok(SoundStream { data })
    }

    fn duration(&self) -> Option<Duration> {
        let data = self.read_data().ok()?;
        probe_duration(&data)
    }

    fn stream_duration(&self, stream: &SoundStream) -> Option<Duration> {
        probe_duration(&stream.data)
    }
}

/// Determines the playing time of encoded audio.
///
/// WAV headers are read directly; other formats fall back to the total
/// duration reported by the decoder, which is not always available.
#[must_use]
pub fn probe_duration(data: &Arc<[u8]>) -> Option<Duration> {
    wav_duration(data).or_else(|| {
        Decoder::new(Cursor::new(Arc::clone(data)))
            .ok()?
            .total_duration()
    })
}

// ============================================================================
// Discovery
// ============================================================================

/// Directories to search for system sounds, in order of priority.
const SYSTEM_SOUND_DIRS: &[&str] = &["/System/Library/Sounds", "/Library/Sounds"];

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["aiff", "wav", "mp3", "m4a", "flac", "ogg"];

/// Embedded clip used when no sound is configured.
const DEFAULT_EMBEDDED_SOUND: &str = "chime";

fn validate_system_sound_path(path: &Path) -> Result<(), SoundError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let allowed = SYSTEM_SOUND_DIRS.iter().any(|dir| {
        let dir = Path::new(dir);
        let canonical_dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        canonical.starts_with(&canonical_dir) && !has_parent_components(&canonical)
    });

    if allowed {
        Ok(())
    } else {
        Err(SoundError::InvalidPath(format!(
            "Path '{}' is not within allowed system sound directories",
            path.display()
        )))
    }
}

fn has_parent_components(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Discovers available system sounds, sorted by name.
///
/// Returns an empty vector on systems without sound directories.
#[must_use]
pub fn discover_system_sounds() -> Vec<SoundSource> {
    let mut sounds: Vec<SoundSource> = SYSTEM_SOUND_DIRS
        .iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .map(|entry| entry.path())
        .filter(|path| is_supported_file(path))
        .map(SoundSource::file)
        .collect();

    sounds.sort_by(|a, b| a.name().cmp(b.name()));
    sounds
}

/// Lists the embedded clips.
#[must_use]
pub fn embedded_sounds() -> Vec<SoundSource> {
    EMBEDDED_SOUND_NAMES
        .iter()
        .map(|name| SoundSource::embedded(*name))
        .collect()
}

/// Gets the default sound source for timer notifications.
#[must_use]
pub fn get_default_sound() -> SoundSource {
    SoundSource::embedded(DEFAULT_EMBEDDED_SOUND)
}

/// Finds a system sound by name (case-insensitive).
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` if no sound with the given name exists.
pub fn find_system_sound(name: &str) -> Result<SoundSource, SoundError> {
    discover_system_sounds()
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| SoundError::FileNotFound(format!("System sound '{}' not found", name)))
}

/// Resolves a user-supplied sound reference.
///
/// Tried in order: embedded clip name, system sound name, path to an
/// existing file.
///
/// # Errors
///
/// Returns `SoundError::UnknownSound` if nothing matches.
pub fn resolve(reference: &str) -> Result<SoundSource, SoundError> {
    if EMBEDDED_SOUND_NAMES.contains(&reference) {
        return Ok(SoundSource::embedded(reference));
    }
    if let Ok(sound) = find_system_sound(reference) {
        return Ok(sound);
    }

    let path = Path::new(reference);
    if path.is_file() {
        return Ok(SoundSource::file(path));
    }

    Err(SoundError::UnknownSound(reference.to_string()))
}
