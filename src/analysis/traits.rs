//! Analysis trait abstractions
//!
//! These traits define the interface for swappable beat tracking backends.
//! Current implementation uses beat-detector's envelope analysis.

use crate::types::{AudioBuffer, BeatEstimate};

/// Beat tracking backend
///
/// Tracking is total over audio input: material without detectable beats
/// (silence, noise) yields an empty estimate rather than an error.
pub trait BeatTracker: Send + Sync {
    /// Estimate beat positions from decoded audio
    fn track(&self, buffer: &AudioBuffer) -> BeatEstimate;

    /// Get the name of this tracker (for logging)
    fn name(&self) -> &'static str;
}

/// Selectable beat tracking method
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TrackerMethod {
    /// Envelope analysis behind a lowpass filter (robust for full mixes)
    Lowpass,
    /// Envelope analysis on the unfiltered signal (for percussive or
    /// already-filtered material)
    Direct,
}

impl std::fmt::Display for TrackerMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerMethod::Lowpass => write!(f, "lowpass"),
            TrackerMethod::Direct => write!(f, "direct"),
        }
    }
}
