//! Envelope-based beat tracking
//!
//! Wraps the beat-detector crate. Audio is fed to the detector in small
//! chunks, mimicking a live capture source, and every detected envelope
//! start becomes one beat timestamp.

use crate::analysis::traits::{BeatTracker, TrackerMethod};
use crate::types::{AudioBuffer, BeatEstimate};
use beat_detector::{util, BeatDetector};
use tracing::debug;

/// Samples fed to the detector per update (about 46ms at 44.1kHz)
///
/// The detector keeps a sliding history window; chunks must stay well below
/// that window or early beats fall out of it before they are seen.
const FEED_CHUNK_SAMPLES: usize = 2048;

/// Relative deviation from the median interval still counted as consistent
const INTERVAL_TOLERANCE: f64 = 0.1;

/// Beat tracker driven by beat-detector's envelope analysis
pub struct EnvelopeTracker {
    method: TrackerMethod,
}

impl EnvelopeTracker {
    pub fn new(method: TrackerMethod) -> Self {
        Self { method }
    }
}

impl BeatTracker for EnvelopeTracker {
    fn track(&self, buffer: &AudioBuffer) -> BeatEstimate {
        debug!(
            "Tracking beats ({} samples, {}Hz, method={})",
            buffer.len(),
            buffer.sample_rate,
            self.method
        );

        let needs_lowpass = matches!(self.method, TrackerMethod::Lowpass);
        let mut detector = BeatDetector::new(buffer.sample_rate as f32, needs_lowpass);

        let mut beats: Vec<f64> = Vec::new();
        for chunk in buffer.samples.chunks(FEED_CHUNK_SAMPLES) {
            let mono = chunk
                .iter()
                .map(|s| util::f32_sample_to_i16(s.clamp(-1.0, 1.0)).unwrap_or(0));
            if let Some(info) = detector.update_and_detect_beat(mono) {
                let at = info.from.timestamp.as_secs_f64();
                // Envelopes can touch at chunk borders; keep the list
                // strictly ascending.
                if beats.last().map_or(true, |&prev| at > prev) {
                    beats.push(at);
                }
            }
        }

        let (tempo_bpm, confidence) = derive_tempo(&beats);

        debug!(
            "Found {} beats{}",
            beats.len(),
            tempo_bpm
                .map(|bpm| format!(" (~{:.1} BPM, consistency {:.2})", bpm, confidence))
                .unwrap_or_default()
        );

        BeatEstimate {
            beats,
            tempo_bpm,
            confidence,
        }
    }

    fn name(&self) -> &'static str {
        match self.method {
            TrackerMethod::Lowpass => "envelope (lowpass)",
            TrackerMethod::Direct => "envelope (direct)",
        }
    }
}

/// Derive a tempo estimate from beat timestamps
///
/// Returns the BPM of the median inter-beat interval and the share of
/// intervals within tolerance of that median. Fewer than two beats yield
/// no tempo.
fn derive_tempo(beats: &[f64]) -> (Option<f64>, f64) {
    if beats.len() < 2 {
        return (None, 0.0);
    }

    let mut intervals: Vec<f64> = beats
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .collect();
    if intervals.is_empty() {
        return (None, 0.0);
    }

    intervals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = intervals[intervals.len() / 2];

    let consistent = intervals
        .iter()
        .filter(|&&d| (d - median).abs() <= median * INTERVAL_TOLERANCE)
        .count();
    let confidence = consistent as f64 / intervals.len() as f64;

    (Some(60.0 / median), confidence)
}
