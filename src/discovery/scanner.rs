//! File discovery and scanning

use crate::config::Settings;
use crate::error::{BeatscanError, Result};
use crate::types::AudioFileRef;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scan the input directory for audio files matching the configured
/// extensions.
///
/// Results are sorted by path so a directory always yields the same file
/// order, whatever order the filesystem returns entries in.
pub fn scan(settings: &Settings) -> Result<Vec<AudioFileRef>> {
    let input = settings.input.as_path();

    if !input.exists() {
        return Err(BeatscanError::DirectoryNotFound(input.to_path_buf()));
    }
    if !input.is_dir() {
        return Err(BeatscanError::ConfigError(format!(
            "input path '{}' is not a directory",
            input.display()
        )));
    }

    let walker = if settings.recursive {
        WalkDir::new(input)
    } else {
        WalkDir::new(input).max_depth(1)
    };

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // Failure to read the scan root kills the run; deeper
                // subdirectory errors only lose that subtree.
                if err.path() == Some(input) {
                    return Err(BeatscanError::DirectoryUnreadable {
                        path: input.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() {
            if let Some(file) = try_discover_file(path, settings) {
                debug!("Discovered: {}", file.path.display());
                files.push(file);
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!("Discovered {} audio files", files.len());

    if files.is_empty() {
        warn!("No matching audio files found in {}", input.display());
    }

    Ok(files)
}

/// Try to create an AudioFileRef if the path has a configured extension
fn try_discover_file(path: &Path, settings: &Settings) -> Option<AudioFileRef> {
    let ext = path.extension()?.to_str()?;
    if !settings.matches_extension(ext) {
        return None;
    }
    Some(AudioFileRef::new(path.to_path_buf(), &settings.input))
}
