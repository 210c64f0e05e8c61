//! Conversion of raw calendar CSVs into structured yearly documents.
//!
//! Each raw row carries a western date (`YYYYMMDD`), a weekday glyph, a
//! holiday flag and a free-text note. Only two kinds of rows are kept:
//!
//! - flag `2`: a day off, recorded as a [`Holiday`]
//! - flag `0` with a note: a make-up working day, recorded as a
//!   [`SpecialWorkingDay`]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CrawlerError, Result};
use crate::output::{files_with_extension, structured_path_for};
use crate::yaml::save_yaml;

const DATE_COLUMN: &str = "西元日期";
const WEEKDAY_COLUMN: &str = "星期";
const HOLIDAY_COLUMN: &str = "是否放假";
const NOTE_COLUMN: &str = "備註";

/// Holiday flag for a day off.
const FLAG_HOLIDAY: &str = "2";
/// Holiday flag for a working day.
const FLAG_WORKDAY: &str = "0";

/// Name given to a day off without a note (regular weekend).
pub const DEFAULT_HOLIDAY_NAME: &str = "例假日";

/// Year suffix of a raw file name: `..._2024.csv`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FILE_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)\.csv$").expect("valid regex"));

/// A day off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: String,
    pub weekday: String,
    pub holiday: u8,
    pub name: String,
}

/// A working day that carries a note, usually a make-up workday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialWorkingDay {
    pub date: String,
    pub weekday: String,
    pub holiday: u8,
    pub note: String,
}

/// Structured calendar for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCalendar {
    pub year: i32,
    pub generated_at: String,
    pub holidays: Vec<Holiday>,
    pub special_working_days: Vec<SpecialWorkingDay>,
}

/// `YYYYMMDD` → `YYYY-MM-DD`. Shorter input is returned unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    match (raw.get(..4), raw.get(4..6), raw.get(6..8)) {
        (Some(year), Some(month), Some(day)) => format!("{year}-{month}-{day}"),
        _ => raw.to_string(),
    }
}

/// Weekday glyph (`一` … `日`) → full name (`星期一` … `星期日`).
///
/// Unknown glyphs are returned unchanged.
#[must_use]
pub fn weekday_name(glyph: &str) -> String {
    match glyph {
        "一" | "二" | "三" | "四" | "五" | "六" | "日" => format!("星期{glyph}"),
        other => other.to_string(),
    }
}

/// Current local time in the `generated_at` format.
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Western year encoded in a raw file name.
pub fn year_from_file_name(path: &Path) -> Result<i32> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    FILE_YEAR_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| CrawlerError::InvalidFileName(name.to_string()))
}

/// Build the structured calendar from raw CSV text.
///
/// # Arguments
/// * `content` - Raw CSV text, possibly with a BOM and `\r\n` line endings
/// * `year` - Western year of the calendar
/// * `generated_at` - Timestamp recorded in the document
/// * `source` - Name used in error messages
pub fn normalize_calendar(
    content: &str,
    year: i32,
    generated_at: &str,
    source: &str,
) -> Result<YearCalendar> {
    let content = content.trim_start_matches('\u{feff}');
    let content = content.replace("\r\n", "\n").replace('\r', "\n");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CrawlerError::MissingColumn {
                column: name.to_string(),
                file: source.to_string(),
            })
    };
    let date_idx = column(DATE_COLUMN)?;
    let weekday_idx = column(WEEKDAY_COLUMN)?;
    let flag_idx = column(HOLIDAY_COLUMN)?;
    let note_idx = column(NOTE_COLUMN)?;

    let mut calendar = YearCalendar {
        year,
        generated_at: generated_at.to_string(),
        holidays: Vec::new(),
        special_working_days: Vec::new(),
    };

    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let date = format_date(field(date_idx));
        let weekday = weekday_name(field(weekday_idx));
        let note = field(note_idx).trim();

        match field(flag_idx) {
            FLAG_HOLIDAY => calendar.holidays.push(Holiday {
                date,
                weekday,
                holiday: 1,
                name: if note.is_empty() {
                    DEFAULT_HOLIDAY_NAME.to_string()
                } else {
                    note.to_string()
                },
            }),
            FLAG_WORKDAY if !note.is_empty() => {
                calendar.special_working_days.push(SpecialWorkingDay {
                    date,
                    weekday,
                    holiday: 0,
                    note: note.to_string(),
                });
            }
            _ => {}
        }
    }

    Ok(calendar)
}

/// Convert one raw CSV into its structured `.yml` file.
///
/// # Returns
/// Path of the written file
pub fn convert_csv_file(csv_path: &Path) -> Result<PathBuf> {
    let year = year_from_file_name(csv_path)?;
    let content = fs::read_to_string(csv_path)?;
    let source = csv_path.display().to_string();
    let calendar = normalize_calendar(&content, year, &timestamp_now(), &source)?;

    let output = structured_path_for(csv_path);
    save_yaml(&calendar, &output)?;

    tracing::info!(
        year,
        holidays = calendar.holidays.len(),
        special_working_days = calendar.special_working_days.len(),
        path = %output.display(),
        "Converted calendar"
    );
    Ok(output)
}

/// Convert every raw CSV in `data_dir`.
///
/// Files that fail to convert are logged and skipped.
///
/// # Returns
/// Paths of the structured files written
pub fn convert_all(data_dir: &Path) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        tracing::error!(path = %data_dir.display(), "Data directory does not exist");
        return Ok(Vec::new());
    }

    let csv_files = files_with_extension(data_dir, "csv")?;
    if csv_files.is_empty() {
        tracing::warn!(path = %data_dir.display(), "No CSV files to convert");
        return Ok(Vec::new());
    }

    let mut converted = Vec::new();
    for name in &csv_files {
        let path = data_dir.join(name);
        match convert_csv_file(&path) {
            Ok(output) => converted.push(output),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "Conversion failed"),
        }
    }

    tracing::info!(
        converted = converted.len(),
        total = csv_files.len(),
        "Conversion finished"
    );
    Ok(converted)
}
