//! Pipeline orchestration
//!
//! Coordinates file discovery, parallel beat tracking, and report export.
//! Files are isolated from each other: a recoverable failure becomes an
//! error record in the report and the batch moves on.

use crate::analysis::{BeatTracker, EnvelopeTracker};
use crate::annotate;
use crate::audio;
use crate::config::Settings;
use crate::discovery;
use crate::error::{BeatscanError, Result};
use crate::export;
use crate::types::{AudioBuffer, AudioFileRef, BatchReport, BeatEstimate, BeatResult, TrackOutcome};
use crossbeam_channel::{bounded, RecvTimeoutError};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug)]
pub struct RunSummary {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// Files never started (dry run, or a stop request mid-batch)
    pub skipped: usize,
    /// True when a stop was requested and the report only covers the files
    /// that had already been picked up
    pub cancelled: bool,
    /// (filename, error) for every failure record, for the end-of-run listing
    pub failures: Vec<(String, String)>,
}

/// Run the full beat tracking pipeline
pub fn run(settings: &Settings, stop: &AtomicBool) -> Result<RunSummary> {
    let pipeline_start = Instant::now();

    configure_thread_pool(settings.threads)?;

    // Phase 1: Discovery
    let discovery_start = Instant::now();
    info!("Scanning for audio files...");
    let files = discovery::scan(settings)?;
    info!(
        "Found {} audio files in {:.2}s",
        files.len(),
        discovery_start.elapsed().as_secs_f64()
    );

    // Dry run mode - show files and exit
    if settings.dry_run {
        return Ok(run_dry_run(&files, settings));
    }

    let tracker: Arc<dyn BeatTracker> = Arc::new(EnvelopeTracker::new(settings.method));
    info!(
        "Tracking {} files with {} ({} threads)",
        files.len(),
        tracker.name(),
        settings.threads
    );

    // Phase 2: Tracking
    let tracking_start = Instant::now();
    let report = process_files(&files, &tracker, settings, stop);
    let tracking_elapsed = tracking_start.elapsed();
    let files_per_sec = if tracking_elapsed.as_secs_f64() > 0.0 {
        report.len() as f64 / tracking_elapsed.as_secs_f64()
    } else {
        0.0
    };
    info!(
        "Tracking completed in {:.2}s ({:.1} files/sec)",
        tracking_elapsed.as_secs_f64(),
        files_per_sec
    );

    // Phase 3: Export. Runs even for empty or interrupted batches so the
    // report always reflects exactly what was processed.
    let export_start = Instant::now();
    export_report(&report, settings)?;
    info!(
        "Export completed in {:.2}s",
        export_start.elapsed().as_secs_f64()
    );

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    let failures = report
        .results
        .iter()
        .filter_map(|result| match &result.outcome {
            TrackOutcome::Failed { error } => Some((result.filename.clone(), error.clone())),
            TrackOutcome::Tracked(_) => None,
        })
        .collect();

    Ok(RunSummary {
        total_files: files.len(),
        successful: report.succeeded(),
        failed: report.failed(),
        skipped: files.len() - report.len(),
        cancelled: stop.load(Ordering::Relaxed),
        failures,
    })
}

/// Dry run mode - show files that would be processed without touching them
fn run_dry_run(files: &[AudioFileRef], settings: &Settings) -> RunSummary {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    for file in files {
        println!("  {}", file.name);
    }
    println!();

    println!(
        "Would track {} files with the {} method",
        files.len(),
        settings.method
    );
    println!("Would write: {}", settings.output.display());
    if let Some(dir) = &settings.mark_beats_dir {
        println!("Would write marked copies to: {}/", dir.display());
    }
    println!();

    RunSummary {
        total_files: files.len(),
        successful: 0,
        failed: 0,
        skipped: files.len(), // All "skipped" in dry run mode
        cancelled: false,
        failures: Vec::new(),
    }
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // If the pool is already initialized (e.g., in tests), that's OK
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(BeatscanError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}

/// Track files in parallel, preserving enumeration order in the report
fn process_files(
    files: &[AudioFileRef],
    tracker: &Arc<dyn BeatTracker>,
    settings: &Settings,
    stop: &AtomicBool,
) -> BatchReport {
    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Workers tag results with the enumeration index; the report is
    // reassembled in that order below, whatever order the pool finishes in.
    let mut indexed: Vec<(usize, BeatResult)> = files
        .par_iter()
        .enumerate()
        .filter_map(|(index, file)| {
            if stop.load(Ordering::Relaxed) {
                // Files not yet started are dropped from the report
                return None;
            }

            let result = process_file(file, tracker, settings);

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                pb.set_message(file.name.clone());
            }

            Some((index, result))
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Tracking complete");
    }

    indexed.sort_by_key(|(index, _)| *index);

    let report = BatchReport::new(indexed.into_iter().map(|(_, result)| result).collect());
    debug!(
        "Processed {} files ({} ok, {} failed)",
        report.len(),
        report.succeeded(),
        report.failed()
    );

    report
}

/// Decode and track a single file, folding recoverable errors into the
/// report record
fn process_file(
    file: &AudioFileRef,
    tracker: &Arc<dyn BeatTracker>,
    settings: &Settings,
) -> BeatResult {
    debug!("Processing: {}", file.path.display());

    let (buffer, estimate) = match decode_and_track(file, tracker, settings) {
        Ok(tracked) => tracked,
        Err(e) => {
            warn!("Skipping {}: {}", file.path.display(), e);
            return BeatResult::failed(file.name.clone(), e.report_reason());
        }
    };

    if let Some(dir) = &settings.mark_beats_dir {
        // A failed marked copy is logged but never fails the file
        if let Err(e) = annotate::write_marked(&buffer, &estimate.beats, dir, &file.name) {
            warn!("Could not write marked copy for {}: {}", file.name, e);
        }
    }

    debug!("Tracked {}: {} beats", file.name, estimate.beat_count());

    BeatResult::tracked(file.name.clone(), estimate)
}

/// Decode the file and run the tracker, both bounded by the configured
/// per-file time limit
///
/// Without a limit the work runs inline on the rayon worker. With one, it
/// runs on a supervisor-owned thread; on deadline the thread is abandoned
/// (it holds only its own file handle and buffer) and the file gets a
/// failure record.
fn decode_and_track(
    file: &AudioFileRef,
    tracker: &Arc<dyn BeatTracker>,
    settings: &Settings,
) -> Result<(Arc<AudioBuffer>, BeatEstimate)> {
    let limit = match settings.file_timeout {
        Some(limit) => limit,
        None => {
            let buffer = Arc::new(audio::decode(&file.path)?);
            let estimate = tracker.track(&buffer);
            return Ok((buffer, estimate));
        }
    };

    let (tx, rx) = bounded(1);
    let worker_path = file.path.clone();
    let worker_tracker = Arc::clone(tracker);

    thread::spawn(move || {
        let tracked = audio::decode(&worker_path).map(|buffer| {
            let buffer = Arc::new(buffer);
            let estimate = worker_tracker.track(&buffer);
            (buffer, estimate)
        });
        // The receiver is gone when the deadline already passed
        let _ = tx.send(tracked);
    });

    match rx.recv_timeout(limit) {
        Ok(tracked) => tracked,
        Err(RecvTimeoutError::Timeout) => Err(BeatscanError::FileTimeout {
            path: file.path.clone(),
            limit_secs: limit.as_secs(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(BeatscanError::WorkerFailed {
            path: file.path.clone(),
            reason: "worker thread terminated before returning a result".to_string(),
        }),
    }
}

/// Write the report to the configured output path
fn export_report(report: &BatchReport, settings: &Settings) -> Result<()> {
    if let Some(parent) = settings.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BeatscanError::output_error(&settings.output, e))?;
        }
    }

    export::write_report(report, &settings.output).map_err(|e| {
        error!("Failed to write report, {} records lost: {}", report.len(), e);
        e
    })
}
