//! JSON report export
//!
//! The report is a plain array with one record per processed file, in
//! enumeration order. Tracked files carry their beat positions, skipped
//! files the failure reason:
//!
//! ```json
//! [
//!   { "filename": "a.mp3", "beats": [0.52, 1.04] },
//!   { "filename": "b.mp3", "error": "decode error: ..." }
//! ]
//! ```

use crate::error::{BeatscanError, Result};
use crate::types::{BatchReport, TrackOutcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// One report record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordJson {
    Beats { filename: String, beats: Vec<f64> },
    Error { filename: String, error: String },
}

/// Write the batch report to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn write_report(report: &BatchReport, output_path: &Path) -> Result<()> {
    // Write to temp file in same directory (ensures same filesystem for atomic rename)
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| BeatscanError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let mut writer = BufWriter::new(file);

    let records: Vec<RecordJson> = report
        .results
        .iter()
        .map(|result| match &result.outcome {
            TrackOutcome::Tracked(estimate) => RecordJson::Beats {
                filename: result.filename.clone(),
                beats: estimate.beats.clone(),
            },
            TrackOutcome::Failed { error } => RecordJson::Error {
                filename: result.filename.clone(),
                error: error.clone(),
            },
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &records)
        .map_err(std::io::Error::from)
        .and_then(|()| writer.flush())
        .map_err(|e| {
            // Clean up temp file on error
            let _ = std::fs::remove_file(&temp_path);
            BeatscanError::OutputError {
                path: output_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        BeatscanError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote {} records to {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}
