//! CLI argument parsing and configuration

use crate::analysis::TrackerMethod;
use clap::Parser;
use std::path::PathBuf;

/// beatscan - Batch beat extraction for audio files
///
/// Scans a directory for audio files, detects the beat positions of every
/// track, and writes a single JSON report with one record per file.
#[derive(Parser, Debug)]
#[command(name = "beatscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory to scan for audio files
    #[arg(short, long, value_name = "DIR", default_value = "songs")]
    pub input: PathBuf,

    /// Path of the JSON report to write
    #[arg(short, long, value_name = "FILE", default_value = "beats.json")]
    pub output: PathBuf,

    /// File extensions to include (comma separated, case-insensitive)
    #[arg(
        short,
        long,
        value_name = "EXT,EXT",
        value_delimiter = ',',
        default_value = "mp3,wav"
    )]
    pub extensions: Vec<String>,

    /// Beat tracking method
    #[arg(short, long, value_enum, default_value_t = TrackerMethod::Lowpass)]
    pub method: TrackerMethod,

    /// Number of worker threads (0 = all CPU cores)
    #[arg(short = 'j', long, value_name = "N", default_value_t = 1)]
    pub threads: usize,

    /// Per-file time limit in seconds for decoding and beat tracking
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value = "false")]
    pub recursive: bool,

    /// Write a copy of each track with its beats marked as beeps into DIR
    #[arg(long, value_name = "DIR")]
    pub mark_beats: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show files that would be processed without decoding
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on the quiet and verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
