//! Download a year's calendar and store it as a UTF-8 raw file.

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::Result;
use crate::http::download_text;
use crate::output::{raw_csv_path, write_atomic};

/// A raw calendar written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    /// Lines after the header row.
    pub rows: usize,
}

/// Download the calendar for `year` from `url` into `data_dir`.
///
/// The body is decoded with the supported encodings and written as UTF-8 to
/// `taiwan_holidays_<year>.csv`. A file with no rows after the header is
/// kept but logged.
pub fn fetch_year(
    client: &Client,
    url: &str,
    year: i32,
    data_dir: &Path,
    max_size: u64,
) -> Result<FetchedFile> {
    tracing::info!(year, url, "Downloading calendar");

    let text = download_text(client, url, max_size)?;
    let path = raw_csv_path(data_dir, year);
    write_atomic(&path, &text)?;

    let rows = count_data_rows(&text);
    if rows == 0 {
        tracing::warn!(year, path = %path.display(), "Calendar has no rows after the header");
    }
    tracing::info!(year, rows, path = %path.display(), "Saved calendar");

    Ok(FetchedFile { path, rows })
}

/// Number of lines after the header line.
fn count_data_rows(text: &str) -> usize {
    text.lines().count().saturating_sub(1)
}
