//! Unified error types for beatscan
//!
//! Error strategy:
//! - Per-file errors (decode, timeout): Recoverable, skip and continue
//! - Run-level errors (input directory, output, config): Fatal, abort batch
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, OGG, AAC/M4A";

/// Top-level error type for beatscan operations
#[derive(Debug, Error)]
pub enum BeatscanError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Processing timed out for '{path}' after {limit_secs}s\n  Tip: Raise or remove --timeout, or check the file for pathological length")]
    FileTimeout { path: PathBuf, limit_secs: u64 },

    #[error("Processing failed for '{path}': {reason}")]
    WorkerFailed { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Input directory not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    DirectoryNotFound(PathBuf),

    #[error("Cannot read input directory '{path}': {reason}\n  Tip: Check read permissions for the directory")]
    DirectoryUnreadable { path: PathBuf, reason: String },

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for beatscan operations
pub type Result<T> = std::result::Result<T, BeatscanError>;

impl BeatscanError {
    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BeatscanError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            std::io::ErrorKind::AlreadyExists => {
                format!("File already exists: {}", path.display())
            }
            _ => err.to_string(),
        };
        BeatscanError::OutputError { path, reason }
    }

    /// Compact single-line message for the per-file report record.
    ///
    /// Display output may span several lines with tips; report entries
    /// carry only the diagnostic itself.
    pub fn report_reason(&self) -> String {
        match self {
            BeatscanError::DecodeError { reason, .. } => format!("decode error: {reason}"),
            BeatscanError::FileTimeout { limit_secs, .. } => {
                format!("timeout: processing exceeded {limit_secs}s")
            }
            BeatscanError::WorkerFailed { reason, .. } => {
                format!("processing failed: {reason}")
            }
            other => other
                .to_string()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_reason_is_single_line() {
        let err = BeatscanError::decode_error("song.mp3", "unsupported codec");
        let reason = err.report_reason();
        assert_eq!(reason, "decode error: unsupported codec");
        assert!(!reason.contains('\n'));
    }

    #[test]
    fn timeout_report_names_the_timeout() {
        let err = BeatscanError::FileTimeout {
            path: PathBuf::from("song.mp3"),
            limit_secs: 30,
        };
        assert!(err.report_reason().contains("timeout"));
    }

    #[test]
    fn output_error_names_the_permission_problem() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = BeatscanError::output_error("beats.json", io);
        assert!(err.to_string().contains("Permission denied"));
    }

    #[test]
    fn output_error_names_the_missing_directory() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = BeatscanError::output_error("reports/beats.json", io);
        assert!(err.to_string().contains("Directory does not exist"));
    }
}
