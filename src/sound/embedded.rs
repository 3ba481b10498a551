//! Embedded sound clips.
//!
//! Clips are compiled into the binary as synthesized 16-bit PCM WAV data,
//! generated once on first use and shared afterwards. Because the sample
//! count of every clip is fixed, its duration is always known.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Sample rate of every embedded clip.
const SAMPLE_RATE: u32 = 44_100;

/// Fade in/out applied to each tone to avoid clicks.
const FADE_MILLIS: u32 = 5;

/// Names of the embedded clips, in display order.
pub const EMBEDDED_SOUND_NAMES: &[&str] = &["chime", "beep", "default"];

/// Two-tone notification chime (880 Hz, pause, 1046.5 Hz).
static CHIME: LazyLock<Arc<[u8]>> = LazyLock::new(|| {
    let mut samples = tone(880.0, 150, 0.3);
    samples.extend(silence(50));
    samples.extend(tone(1046.5, 200, 0.3));
    encode_wav(&samples).into()
});

/// One second 1 kHz beep, suited to looping alarms.
static BEEP: LazyLock<Arc<[u8]>> = LazyLock::new(|| encode_wav(&tone(1000.0, 1000, 0.25)).into());

/// Header-only silent clip.
static SILENT: LazyLock<Arc<[u8]>> = LazyLock::new(|| encode_wav(&[]).into());

/// Returns the encoded WAV data of the named embedded clip.
#[must_use]
pub fn get_embedded_sound(name: &str) -> Option<Arc<[u8]>> {
    let clip = match name {
        "chime" => &CHIME,
        "beep" => &BEEP,
        "default" => &SILENT,
        _ => return None,
    };
    Some(Arc::clone(clip))
}

/// Returns the format description of the embedded clips.
#[must_use]
pub const fn get_embedded_sound_format() -> &'static str {
    "WAV (16-bit PCM, 44.1kHz, Mono)"
}

/// Computes the playing time of RIFF/WAVE data from its header.
///
/// Returns `None` when the data is not a WAV file or the header is
/// incomplete. A `data` chunk whose declared size runs past the end of the
/// buffer is clamped to the bytes actually present.
#[must_use]
pub fn wav_duration(bytes: &[u8]) -> Option<Duration> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let mut byte_rate = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4)? as usize;
        let body = pos + 8;

        match id {
            b"fmt " => byte_rate = Some(read_u32(bytes, body + 8)?),
            b"data" => {
                let rate = u64::from(byte_rate.filter(|rate| *rate > 0)?);
                let len = size.min(bytes.len() - body) as u64;
                return Some(Duration::from_nanos(len * 1_000_000_000 / rate));
            }
            _ => {}
        }

        // Chunks are padded to an even length.
        pos = body.checked_add(size)?.checked_add(size & 1)?;
    }

    None
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn sample_count(millis: u32) -> usize {
    (SAMPLE_RATE as usize * millis as usize) / 1000
}

fn tone(frequency: f32, millis: u32, amplitude: f32) -> Vec<i16> {
    let count = sample_count(millis);
    let fade = sample_count(FADE_MILLIS).min(count / 2).max(1);

    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = (i.min(count - 1 - i) as f32 / fade as f32).min(1.0);
            let value = (t * frequency * std::f32::consts::TAU).sin() * amplitude * envelope;
            (value * f32::from(i16::MAX)) as i16
        })
        .collect()
}

fn silence(millis: u32) -> Vec<i16> {
    vec![0; sample_count(millis)]
}

/// Encodes mono 16-bit samples as a canonical 44-byte-header WAV file.
fn encode_wav(samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk: PCM, mono, 16-bit
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}
