//! Cross-year summary index over the structured calendar files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::timestamp_now;
use crate::error::Result;
use crate::output::{files_with_extension, SUMMARY_FILE_NAME};
use crate::yaml::save_yaml;

/// Title recorded in the summary file.
pub const SUMMARY_TITLE: &str = "台灣政府行政機關辦公日曆表摘要";

/// Counts for one structured calendar file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub holidays_count: usize,
    pub special_working_days_count: usize,
    pub file: String,
}

/// The summary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub generated_at: String,
    pub available_years: Vec<YearSummary>,
}

/// Only the parts of a structured calendar the summary needs.
#[derive(Debug, Deserialize)]
struct CalendarCounts {
    year: Option<i32>,
    #[serde(default)]
    holidays: Vec<serde_yaml::Value>,
    #[serde(default)]
    special_working_days: Vec<serde_yaml::Value>,
}

/// Collect counts from every structured calendar in `data_dir`.
///
/// Files are visited in file-name order. Unreadable documents and documents
/// without a year are logged and skipped.
pub fn build_summary(data_dir: &Path, generated_at: &str) -> Result<Summary> {
    let mut available_years = Vec::new();

    for name in files_with_extension(data_dir, "yml")? {
        if name == SUMMARY_FILE_NAME {
            continue;
        }

        let path = data_dir.join(&name);
        let counts = match read_counts(&path) {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Skipping unreadable calendar");
                continue;
            }
        };

        let Some(year) = counts.year else {
            tracing::warn!(file = %name, "Skipping calendar without a year");
            continue;
        };

        available_years.push(YearSummary {
            year,
            holidays_count: counts.holidays.len(),
            special_working_days_count: counts.special_working_days.len(),
            file: name,
        });
    }

    Ok(Summary {
        title: SUMMARY_TITLE.to_string(),
        generated_at: generated_at.to_string(),
        available_years,
    })
}

fn read_counts(path: &Path) -> Result<CalendarCounts> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Build the summary and write it to `<data_dir>/summary.yml`.
///
/// Returns `None` without writing when there are no structured calendars.
pub fn write_summary(data_dir: &Path) -> Result<Option<PathBuf>> {
    let summary = build_summary(data_dir, &timestamp_now())?;
    if summary.available_years.is_empty() {
        tracing::warn!(path = %data_dir.display(), "No structured calendars to summarize");
        return Ok(None);
    }

    let path = data_dir.join(SUMMARY_FILE_NAME);
    save_yaml(&summary, &path)?;
    tracing::info!(
        path = %path.display(),
        years = summary.available_years.len(),
        "Wrote summary"
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    const CAL_2025: &str = "---\nyear: 2025\ngenerated_at: 'x'\nholidays:\n  - date: '2025-01-01'\n    name: 元旦\n  - date: '2025-01-04'\n    name: 例假日\nspecial_working_days: []\n";
    const CAL_2024: &str = "---\nyear: 2024\ngenerated_at: 'x'\nholidays:\n  - date: '2024-01-01'\nspecial_working_days:\n  - date: '2024-02-17'\n";

    #[test]
    fn test_build_summary_sorted_by_file_name() {
        let dir = tempdir().unwrap();
        write(dir.path(), "taiwan_holidays_2025.yml", CAL_2025);
        write(dir.path(), "taiwan_holidays_2024.yml", CAL_2024);
        write(dir.path(), "summary.yml", "title: old\n");

        let summary = build_summary(dir.path(), "now").unwrap();
        assert_eq!(summary.title, SUMMARY_TITLE);
        assert_eq!(
            summary.available_years,
            vec![
                YearSummary {
                    year: 2024,
                    holidays_count: 1,
                    special_working_days_count: 1,
                    file: "taiwan_holidays_2024.yml".to_string(),
                },
                YearSummary {
                    year: 2025,
                    holidays_count: 2,
                    special_working_days_count: 0,
                    file: "taiwan_holidays_2025.yml".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_build_summary_skips_bad_documents() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.yml", "holidays: []\n");
        write(dir.path(), "b.yml", "year: [unterminated\n");
        write(dir.path(), "taiwan_holidays_2024.yml", CAL_2024);

        let summary = build_summary(dir.path(), "now").unwrap();
        assert_eq!(summary.available_years.len(), 1);
        assert_eq!(summary.available_years[0].year, 2024);
    }

    #[test]
    fn test_write_summary_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "taiwan_holidays_2024.yml", CAL_2024);
        write(dir.path(), "taiwan_holidays_2025.yml", CAL_2025);

        let read = |path: &Path| -> Summary {
            serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
        };

        let first = read(&write_summary(dir.path()).unwrap().unwrap());
        let second = read(&write_summary(dir.path()).unwrap().unwrap());
        assert_eq!(first.available_years, second.available_years);
    }

    #[test]
    fn test_write_summary_without_calendars() {
        let dir = tempdir().unwrap();
        assert_eq!(write_summary(dir.path()).unwrap(), None);
        assert!(!dir.path().join(SUMMARY_FILE_NAME).exists());
    }
}
