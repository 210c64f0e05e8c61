//! File naming and atomic writes for the data directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Prefix shared by the raw and structured per-year files.
pub const FILE_PREFIX: &str = "taiwan_holidays_";

/// File name of the cross-year index.
pub const SUMMARY_FILE_NAME: &str = "summary.yml";

/// Raw CSV path for `year`: `<dir>/taiwan_holidays_<year>.csv`.
#[must_use]
pub fn raw_csv_path(data_dir: &Path, year: i32) -> PathBuf {
    data_dir.join(format!("{FILE_PREFIX}{year}.csv"))
}

/// Structured file written next to a raw CSV: same stem, `.yml` extension.
#[must_use]
pub fn structured_path_for(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("yml")
}

/// Create the data directory if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        tracing::info!(path = %dir.display(), "Created data directory");
    }
    Ok(())
}

/// Names of the files in `dir` with the given extension, sorted.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Write `content` to `path` atomically.
///
/// Writes to a hidden temp file in the same directory, syncs it to disk, then
/// renames it over the destination, so readers never observe a partial file.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = dir.join(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(())
}
