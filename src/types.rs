//! Core data types for beatscan
//!
//! These types represent the domain model and flow through the pipeline.

use std::path::{Path, PathBuf};

// =============================================================================
// Discovered files
// =============================================================================

/// A single audio file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFileRef {
    /// Full path to the file
    pub path: PathBuf,
    /// Name used in the report: the path relative to the scanned directory
    /// (the bare file name for a flat scan)
    pub name: String,
}

impl AudioFileRef {
    pub fn new(path: PathBuf, scan_root: &Path) -> Self {
        let name = path
            .strip_prefix(scan_root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        Self { path, name }
    }
}

// =============================================================================
// Tracker results
// =============================================================================

/// Beat positions estimated for one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatEstimate {
    /// Beat onsets in seconds from the start of the audio, ascending
    pub beats: Vec<f64>,
    /// Tempo derived from the beat intervals, if enough beats were found
    pub tempo_bpm: Option<f64>,
    /// Interval consistency score (0.0 - 1.0)
    pub confidence: f64,
}

impl BeatEstimate {
    /// Number of detected beats
    pub fn beat_count(&self) -> usize {
        self.beats.len()
    }
}

/// Outcome of processing a single file.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// Decoded and tracked, possibly with zero beats
    Tracked(BeatEstimate),
    /// Skipped due to a recoverable per-file error
    Failed { error: String },
}

/// Per-file entry of the batch report, in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatResult {
    /// Report name of the source file
    pub filename: String,
    pub outcome: TrackOutcome,
}

impl BeatResult {
    pub fn tracked(filename: impl Into<String>, estimate: BeatEstimate) -> Self {
        Self {
            filename: filename.into(),
            outcome: TrackOutcome::Tracked(estimate),
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            outcome: TrackOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, TrackOutcome::Failed { .. })
    }
}

/// Ordered collection of per-file results for one run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<BeatResult>,
}

impl BatchReport {
    pub fn new(results: Vec<BeatResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of successfully tracked files
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| !r.is_failure()).count()
    }

    /// Number of files skipped with a failure record
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded audio samples ready for analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
