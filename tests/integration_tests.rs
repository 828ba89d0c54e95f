//! Integration tests for the beatscan pipeline
//!
//! These tests verify the full extraction pipeline produces correct output.

use beatscan::config::Settings;
use beatscan::pipeline::{self, RunSummary};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tempfile::TempDir;

/// Generate a silent WAV file for testing
///
/// Silence decodes cleanly and is guaranteed to contain no beats, which
/// makes report contents fully predictable.
fn generate_silence_wav(path: &Path, duration_secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    for _ in 0..num_samples {
        writer.write_sample(0i16).expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Generate a click track WAV file for beat tracking
///
/// Creates impulses (short bursts) at regular intervals matching the
/// specified BPM. This produces a clear rhythmic signal for the tracker.
fn generate_click_track(path: &Path, bpm: f32, duration_secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;

    // Impulse duration: ~5ms (short click)
    let impulse_samples = (0.005 * sample_rate as f32) as usize;

    for i in 0..num_samples {
        let position_in_beat = i % samples_per_beat;

        // Generate impulse at the start of each beat
        let sample = if position_in_beat < impulse_samples {
            // Exponential decay for a more natural click sound
            let decay = (-5.0 * position_in_beat as f32 / impulse_samples as f32).exp();
            0.8 * decay
        } else {
            0.0
        };

        let sample_i16 = (sample * 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Create test settings with progress bars disabled
fn create_test_settings(input: &Path, output: &Path) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        threads: 2,
        show_progress: false, // Disable progress bars in tests
        ..Settings::default()
    }
}

/// Run the pipeline without a stop request
fn run_pipeline(settings: &Settings) -> beatscan::Result<RunSummary> {
    let stop = AtomicBool::new(false);
    pipeline::run(settings, &stop)
}

/// Read and parse the JSON report
fn read_report(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("Failed to read report");
    serde_json::from_str(&content).expect("Report should be valid JSON")
}

#[test]
fn test_silent_track_gets_a_record_with_no_beats() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("quiet.wav"), 2.0, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    let result = run_pipeline(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_files, 1, "Should find 1 file");
    assert_eq!(result.successful, 1, "Should track 1 file");
    assert_eq!(result.failed, 0, "Should have no failures");

    let report = read_report(&output);
    let records = report.as_array().expect("Report root should be an array");
    assert_eq!(records.len(), 1, "Should have 1 record");

    let record = records[0].as_object().expect("Record should be an object");
    assert_eq!(record["filename"], "quiet.wav");
    assert!(
        record["beats"].as_array().expect("beats should be an array").is_empty(),
        "Silence should contain no beats"
    );
    assert!(record.get("error").is_none(), "Success record has no error field");
    assert_eq!(record.len(), 2, "Success record carries exactly filename and beats");
}

#[test]
fn test_empty_directory_writes_empty_report() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    let settings = create_test_settings(input_dir.path(), &output);
    let result = run_pipeline(&settings).expect("Pipeline should succeed on empty directory");

    assert_eq!(result.total_files, 0, "Should find 0 files");
    assert_eq!(result.successful, 0, "Should have 0 successful");
    assert_eq!(result.failed, 0, "Should have 0 failures");

    // An empty batch still produces a report: an empty array
    assert!(output.exists(), "Report should be written for empty input");
    let report = read_report(&output);
    assert_eq!(report.as_array().expect("Report root should be an array").len(), 0);
}

#[test]
fn test_records_follow_scan_order() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    // Created out of order on purpose
    generate_silence_wav(&input_dir.path().join("c.wav"), 0.2, 44100);
    generate_silence_wav(&input_dir.path().join("a.wav"), 0.2, 44100);
    generate_silence_wav(&input_dir.path().join("b.wav"), 0.2, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    run_pipeline(&settings).expect("Pipeline should succeed");

    let report = read_report(&output);
    let names: Vec<&str> = report
        .as_array()
        .expect("Report root should be an array")
        .iter()
        .map(|r| r["filename"].as_str().expect("filename should be a string"))
        .collect();

    assert_eq!(names, ["a.wav", "b.wav", "c.wav"], "Records follow path order");
}

#[test]
fn test_click_track_beats_are_ordered_and_in_range() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_click_track(&input_dir.path().join("click_120bpm.wav"), 120.0, 10.0, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    let result = run_pipeline(&settings).expect("Pipeline should succeed");
    assert_eq!(result.successful, 1, "Should track 1 file");

    let report = read_report(&output);
    let beats: Vec<f64> = report[0]["beats"]
        .as_array()
        .expect("beats should be an array")
        .iter()
        .map(|b| b.as_f64().expect("beat should be a number"))
        .collect();

    println!("120 BPM click track: detected {} beats", beats.len());

    for window in beats.windows(2) {
        assert!(
            window[0] < window[1],
            "Beats should be strictly ascending: {} then {}",
            window[0],
            window[1]
        );
    }
    for &beat in &beats {
        assert!(
            (0.0..=10.5).contains(&beat),
            "Beat {} should lie within the track",
            beat
        );
    }
}

#[test]
fn test_rerun_produces_identical_report() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_click_track(&input_dir.path().join("steady.wav"), 128.0, 8.0, 44100);
    generate_silence_wav(&input_dir.path().join("zz_quiet.wav"), 1.0, 44100);

    let settings = create_test_settings(input_dir.path(), &output);

    run_pipeline(&settings).expect("First run should succeed");
    let first = fs::read(&output).expect("Failed to read first report");

    run_pipeline(&settings).expect("Second run should succeed");
    let second = fs::read(&output).expect("Failed to read second report");

    assert_eq!(first, second, "Reruns over unchanged input are byte-identical");

    // The report is written via a temp file that must not be left behind
    let temp = output.with_extension("json.tmp");
    assert!(!temp.exists(), "Temp file should be cleaned up");
}

#[test]
fn test_recursive_scan_includes_subdirectories() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("top.wav"), 0.2, 44100);
    fs::create_dir(input_dir.path().join("sub")).expect("Failed to create subdirectory");
    generate_silence_wav(&input_dir.path().join("sub").join("inner.wav"), 0.2, 44100);

    let mut settings = create_test_settings(input_dir.path(), &output);
    settings.recursive = true;

    let result = run_pipeline(&settings).expect("Pipeline should succeed");
    assert_eq!(result.total_files, 2, "Recursive scan should find both files");

    let report = read_report(&output);
    let names: Vec<&str> = report
        .as_array()
        .expect("Report root should be an array")
        .iter()
        .map(|r| r["filename"].as_str().expect("filename should be a string"))
        .collect();

    let nested = format!("sub{}inner.wav", std::path::MAIN_SEPARATOR);
    assert_eq!(names, [nested.as_str(), "top.wav"]);
}

#[test]
fn test_flat_scan_ignores_subdirectories() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("top.wav"), 0.2, 44100);
    fs::create_dir(input_dir.path().join("sub")).expect("Failed to create subdirectory");
    generate_silence_wav(&input_dir.path().join("sub").join("inner.wav"), 0.2, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    let result = run_pipeline(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_files, 1, "Flat scan should only see the top-level file");

    let report = read_report(&output);
    assert_eq!(report[0]["filename"], "top.wav");
}

#[test]
fn test_marked_copies_are_written() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");
    let marked_dir = output_dir.path().join("marked");

    generate_silence_wav(&input_dir.path().join("quiet.wav"), 2.0, 44100);

    let mut settings = create_test_settings(input_dir.path(), &output);
    settings.mark_beats_dir = Some(marked_dir.clone());

    run_pipeline(&settings).expect("Pipeline should succeed");

    let marked = marked_dir.join("marked_quiet.wav");
    assert!(marked.exists(), "Marked copy should be written");

    let reader = hound::WavReader::open(&marked).expect("Marked copy should be a valid WAV");
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.duration(), 2 * 44100, "Marked copy keeps the track length");
}

#[test]
fn test_dry_run_writes_nothing() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("quiet.wav"), 0.2, 44100);

    let mut settings = create_test_settings(input_dir.path(), &output);
    settings.dry_run = true;

    let result = run_pipeline(&settings).expect("Dry run should succeed");

    assert_eq!(result.total_files, 1);
    assert_eq!(result.skipped, 1, "Dry run skips every file");
    assert!(!output.exists(), "Dry run must not write a report");
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_bad_files_get_error_records_and_good_files_still_track() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    fs::write(input_dir.path().join("empty.wav"), b"").expect("Failed to create empty file");
    fs::write(
        input_dir.path().join("invalid.wav"),
        b"This is not a valid WAV file content!!!!!",
    )
    .expect("Failed to create invalid file");
    generate_silence_wav(&input_dir.path().join("zz_good.wav"), 1.0, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    let result = run_pipeline(&settings).expect("Bad files must not abort the batch");

    assert_eq!(result.total_files, 3, "Should find all 3 files");
    assert_eq!(result.successful, 1, "Only the real WAV tracks");
    assert_eq!(result.failed, 2, "Both broken files fail");

    let report = read_report(&output);
    let records = report.as_array().expect("Report root should be an array");
    assert_eq!(records.len(), 3, "Every enumerated file gets a record");

    for record in &records[..2] {
        let record = record.as_object().expect("Record should be an object");
        let error = record["error"].as_str().expect("error should be a string");
        assert!(!error.is_empty(), "Error record carries a diagnostic");
        assert!(!error.contains('\n'), "Error text is a single line");
        assert!(record.get("beats").is_none(), "Failure record has no beats field");
        assert_eq!(record.len(), 2, "Failure record carries exactly filename and error");
    }

    assert_eq!(records[0]["filename"], "empty.wav");
    assert_eq!(records[1]["filename"], "invalid.wav");
    assert_eq!(records[2]["filename"], "zz_good.wav");
    assert!(records[2]["beats"].is_array(), "Good file still gets tracked");
}

#[test]
fn test_nonexistent_input_is_fatal() {
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    let settings = create_test_settings(Path::new("/nonexistent/path/that/does/not/exist"), &output);
    let result = run_pipeline(&settings);

    assert!(result.is_err(), "Pipeline should return error for nonexistent input");
    assert!(!output.exists(), "No report should be written for a failed run");
}

#[test]
fn test_zero_timeout_fails_every_file() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("quiet.wav"), 1.0, 44100);

    let mut settings = create_test_settings(input_dir.path(), &output);
    settings.file_timeout = Some(Duration::ZERO);

    let result = run_pipeline(&settings).expect("Timeouts are per-file, not fatal");
    assert_eq!(result.failed, 1, "The file should time out");

    let report = read_report(&output);
    let error = report[0]["error"].as_str().expect("error should be a string");
    assert!(error.contains("timeout"), "Diagnostic names the timeout: {}", error);
}

#[test]
fn test_stop_request_before_start_writes_empty_report() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let output = output_dir.path().join("beats.json");

    generate_silence_wav(&input_dir.path().join("a.wav"), 0.2, 44100);
    generate_silence_wav(&input_dir.path().join("b.wav"), 0.2, 44100);

    let settings = create_test_settings(input_dir.path(), &output);
    let stop = AtomicBool::new(true);
    let result = pipeline::run(&settings, &stop).expect("A stopped run still succeeds");

    assert!(result.cancelled, "Summary should mark the run as cancelled");
    assert_eq!(result.skipped, 2, "Neither file was started");

    // The report is still valid JSON covering the (empty) processed set
    let report = read_report(&output);
    assert_eq!(report.as_array().expect("Report root should be an array").len(), 0);
}
