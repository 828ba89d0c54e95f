//! beatscan CLI entry point

use beatscan::config::{Cli, Settings};
use beatscan::pipeline;
use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code when a stop request cut the batch short
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = Settings::from_cli(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if settings.extensions.is_empty() {
        eprintln!("Error: no usable file extensions were given (use e.g. -e mp3,wav)");
        return ExitCode::FAILURE;
    }

    // Ctrl-C lets files already started finish, then the partial report
    // is written as usual
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        if stop_handler.swap(true, Ordering::Relaxed) {
            // Second Ctrl-C aborts outright
            std::process::exit(EXIT_INTERRUPTED as i32);
        }
        eprintln!("\nStop requested, finishing files already started...");
    }) {
        eprintln!("Warning: could not install Ctrl-C handler: {}", e);
    }

    // Run the pipeline
    match pipeline::run(&settings, &stop) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} successful, {} failed, {} skipped (of {} total)",
                result.successful, result.failed, result.skipped, result.total_files
            );
            for (name, error) in &result.failures {
                println!("  failed {}: {}", name, error);
            }

            if result.cancelled {
                println!(
                    "Interrupted: the report covers the {} files that were processed",
                    result.successful + result.failed
                );
                return ExitCode::from(EXIT_INTERRUPTED);
            }

            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    // Check input exists
    if !cli.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    beatscan -i ~/Music -o beats.json\n    beatscan -i ./songs -o reports/beats.json",
            cli.input.display()
        ));
    }

    if !cli.input.is_dir() {
        return Err(format!(
            "Input path is not a directory: {}\n\n  Tip: beatscan scans a directory for audio files.\n  Example: beatscan -i ./songs",
            cli.input.display()
        ));
    }

    // The report's parent directory is created automatically; reject only a
    // directory sitting where the report file itself should go
    if cli.output.is_dir() {
        return Err(format!(
            "Output path is a directory: {}\n\n  Tip: Pass the JSON report file path.\n  Example: beatscan -o {}/beats.json",
            cli.output.display(),
            cli.output.display()
        ));
    }

    Ok(())
}
