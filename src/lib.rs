//! beatscan - Batch Beat Extraction for Audio Files
//!
//! A command-line utility that scans a directory of audio files, runs beat
//! tracking on every track, and writes one JSON report mapping each file to
//! its beat positions in seconds.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: Deterministic audio file scanning
//! - `audio`: Audio decoding using symphonia
//! - `analysis`: Beat tracking (with swappable backends)
//! - `annotate`: Optional marked-audio copies for auditing by ear
//! - `pipeline`: Parallel processing orchestration
//! - `export`: JSON report output
//!
//! # Example
//!
//! ```no_run
//! use beatscan::{config::Settings, pipeline};
//! use std::sync::atomic::AtomicBool;
//!
//! let settings = Settings::default();
//! let stop = AtomicBool::new(false);
//! let result = pipeline::run(&settings, &stop).expect("Beat extraction failed");
//! println!("Processed {} tracks", result.successful);
//! ```

pub mod analysis;
pub mod annotate;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{BeatscanError, Result};
pub use types::{AudioBuffer, BatchReport, BeatEstimate, BeatResult};
