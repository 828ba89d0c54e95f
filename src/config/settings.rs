//! Runtime configuration settings

use crate::analysis::TrackerMethod;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the extraction pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory to scan
    pub input: PathBuf,
    /// JSON report path
    pub output: PathBuf,
    /// Extensions to include, lowercase without leading dot
    pub extensions: Vec<String>,
    /// Beat tracking method
    pub method: TrackerMethod,
    /// Number of worker threads
    pub threads: usize,
    /// Per-file time limit covering decode and tracking together
    pub file_timeout: Option<Duration>,
    /// Scan recursively
    pub recursive: bool,
    /// Directory for marked copies of the tracks, if requested
    pub mark_beats_dir: Option<PathBuf>,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show files without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        // 0 means "use every core"; otherwise the exact count requested
        let threads = if cli.threads == 0 {
            num_cpus::get()
        } else {
            cli.threads
        };

        // Accept ".mp3" and "MP3" alike; matching is done lowercase
        let extensions = cli
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            extensions,
            method: cli.method,
            threads,
            file_timeout: cli.timeout.map(Duration::from_secs),
            recursive: cli.recursive,
            mark_beats_dir: cli.mark_beats.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// True when the given extension (without dot) is configured for the scan
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("songs"),
            output: PathBuf::from("beats.json"),
            extensions: vec!["mp3".to_string(), "wav".to_string()],
            method: TrackerMethod::Lowpass,
            threads: 1,
            file_timeout: None,
            recursive: false,
            mark_beats_dir: None,
            show_progress: true,
            dry_run: false,
        }
    }
}
