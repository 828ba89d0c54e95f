//! Marked-audio output
//!
//! Writes a mono WAV copy of a track with a short beep overlaid at every
//! detected beat, for auditing the tracker by ear.

use crate::error::{BeatscanError, Result};
use crate::types::AudioBuffer;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker tone frequency
const BEEP_FREQUENCY_HZ: f32 = 1000.0;
/// Marker tone length
const BEEP_DURATION_SECS: f32 = 0.03;
/// Marker tone level
const BEEP_AMPLITUDE: f32 = 0.6;

/// Write `marked_<name>.wav` into `dir`: the decoded audio with a beep at
/// every beat position
pub fn write_marked(
    buffer: &AudioBuffer,
    beats: &[f64],
    dir: &Path,
    source_name: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| BeatscanError::output_error(dir, e))?;

    let out_path = dir.join(format!("marked_{}.wav", flat_stem(source_name)));

    let mut samples = buffer.samples.clone();
    overlay_beeps(&mut samples, beats, buffer.sample_rate);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&out_path, spec).map_err(|e| {
        BeatscanError::OutputError {
            path: out_path.clone(),
            reason: e.to_string(),
        }
    })?;

    for sample in &samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| BeatscanError::OutputError {
                path: out_path.clone(),
                reason: e.to_string(),
            })?;
    }

    writer.finalize().map_err(|e| BeatscanError::OutputError {
        path: out_path.clone(),
        reason: e.to_string(),
    })?;

    debug!("Wrote marked copy: {}", out_path.display());

    Ok(out_path)
}

/// Report name without extension, with path separators flattened so marked
/// copies from subdirectories land in one directory without colliding
fn flat_stem(source_name: &str) -> String {
    Path::new(source_name)
        .with_extension("")
        .to_string_lossy()
        .replace(['/', '\\'], "_")
}

/// Mix a short sine beep into the samples at each beat position
fn overlay_beeps(samples: &mut [f32], beats: &[f64], sample_rate: u32) {
    let beep_len = (BEEP_DURATION_SECS * sample_rate as f32) as usize;

    for &beat in beats {
        let start = (beat * sample_rate as f64) as usize;
        for i in 0..beep_len {
            let idx = start + i;
            if idx >= samples.len() {
                break;
            }
            let t = i as f32 / sample_rate as f32;
            let beep = BEEP_AMPLITUDE * (2.0 * std::f32::consts::PI * BEEP_FREQUENCY_HZ * t).sin();
            samples[idx] = (samples[idx] + beep).clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn silence(duration_secs: f64, sample_rate: u32) -> AudioBuffer {
        let count = (duration_secs * sample_rate as f64) as usize;
        AudioBuffer::new(vec![0.0; count], sample_rate)
    }

    #[test]
    fn test_marked_file_name_and_length() {
        let dir = TempDir::new().unwrap();
        let buffer = silence(1.0, 44100);

        let path = write_marked(&buffer, &[0.5], dir.path(), "song.mp3").unwrap();
        assert_eq!(path.file_name().unwrap(), "marked_song.wav");

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 44100);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration() as usize, buffer.len());
    }

    #[test]
    fn test_beep_lands_on_the_beat() {
        let dir = TempDir::new().unwrap();
        let buffer = silence(1.0, 44100);

        let path = write_marked(&buffer, &[0.5], dir.path(), "quiet.wav").unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

        let beat_idx = 22050;
        let beep_region = &samples[beat_idx..beat_idx + 1000];
        assert!(beep_region.iter().any(|&s| s.unsigned_abs() > 1000));

        // Before the beat the track is still silent
        assert!(samples[..beat_idx - 100].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_beat_past_end_is_ignored() {
        let dir = TempDir::new().unwrap();
        let buffer = silence(0.5, 44100);

        let path = write_marked(&buffer, &[10.0], dir.path(), "short.wav").unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_subdirectory_names_are_flattened() {
        let dir = TempDir::new().unwrap();
        let buffer = silence(0.1, 44100);

        let path = write_marked(&buffer, &[], dir.path(), "nested/deep.mp3").unwrap();
        assert_eq!(path.file_name().unwrap(), "marked_nested_deep.wav");
    }
}
