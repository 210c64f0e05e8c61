//! Main crawler service that ties all components together.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::config::{CrawlerConfig, FallbackUrls};
use crate::convert::convert_all;
use crate::discovery::{discover_year_links, select_target_years, validate_link};
use crate::error::Result;
use crate::fetch::fetch_year;
use crate::http::create_client;
use crate::output::{ensure_dir, files_with_extension};
use crate::summary::write_summary;
use crate::types::{DataFile, LinkSource, RunMode, RunReport, YearLinkMap, YearOutcome};

/// Pick the link to download for `year`.
///
/// A discovered link is used if its year check is acceptable; otherwise the
/// fallback table is consulted. Fallback links are trusted as-is.
///
/// # Arguments
/// * `year` - Western year to resolve
/// * `links` - Links discovered on the listing page
/// * `fallbacks` - Hand-maintained links
/// * `strict` - Reject discovered links whose year cannot be verified
pub fn resolve_link(
    year: i32,
    links: &YearLinkMap,
    fallbacks: &FallbackUrls,
    strict: bool,
) -> Option<(String, LinkSource)> {
    if let Some(url) = links.get(year) {
        let result = validate_link(year, url);
        if result.is_acceptable(strict) {
            return Some((url.to_string(), LinkSource::Discovered));
        }
        tracing::warn!(year, ?result, "Rejected discovered link");
    }

    if let Some(url) = fallbacks.get(year) {
        tracing::info!(year, url, "Using known fallback link");
        return Some((url.to_string(), LinkSource::Fallback));
    }

    None
}

/// One-shot crawler over the open-data portal.
pub struct Crawler {
    config: CrawlerConfig,
    client: Client,
}

impl Crawler {
    /// Create a crawler with its HTTP client.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let client = create_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// Run the crawler to completion.
    ///
    /// Years are processed strictly in order. Failures of individual years
    /// are recorded in the report and never abort the run; only an unusable
    /// data directory is an error.
    ///
    /// # Arguments
    /// * `mode` - Which years to target
    /// * `today` - Date the maintenance years are derived from
    pub fn run(&self, mode: RunMode, today: NaiveDate) -> Result<RunReport> {
        let data_dir = self.config.data_dir.as_path();
        tracing::info!(%mode, data_dir = %data_dir.display(), "Starting crawler");
        ensure_dir(data_dir)?;

        let links = discover_year_links(
            &self.client,
            &self.config.listing_url,
            &self.config.site_origin,
            self.config.max_response_size,
        );
        if links.is_empty() {
            tracing::error!("No calendar years discovered; only fallback links can be used");
        }

        let targets = select_target_years(mode, today, &links);
        tracing::info!(years = ?targets.years, "Target years");

        let mut outcomes = Vec::with_capacity(targets.years.len());
        for &year in &targets.years {
            let outcome = self.process_year(year, &links);
            outcomes.push((year, outcome));
        }

        let succeeded = outcomes.iter().filter(|(_, o)| o.is_success()).count();
        let attempted = outcomes.len();

        let mut converted = Vec::new();
        let mut summary = None;
        if succeeded > 0 {
            match convert_all(data_dir) {
                Ok(paths) => converted = paths,
                Err(e) => tracing::error!(error = %e, "Converting calendars failed"),
            }
            match write_summary(data_dir) {
                Ok(path) => summary = path,
                Err(e) => tracing::error!(error = %e, "Writing summary failed"),
            }
        } else if links.is_empty()
            && outcomes
                .iter()
                .all(|(_, o)| matches!(o, YearOutcome::Unresolved))
        {
            tracing::error!(
                attempted,
                "Nothing discovered and no fallback link available; no files written"
            );
        }

        tracing::info!(succeeded, attempted, "Crawler finished");

        let (csv_files, yaml_files) = list_data_files(data_dir);
        Ok(RunReport {
            mode,
            discovered: links.len(),
            targets,
            outcomes,
            converted,
            summary,
            csv_files,
            yaml_files,
        })
    }

    fn process_year(&self, year: i32, links: &YearLinkMap) -> YearOutcome {
        let Some((url, source)) = resolve_link(
            year,
            links,
            &self.config.fallback_urls,
            self.config.strict_validation,
        ) else {
            tracing::warn!(year, "Calendar not available yet");
            return YearOutcome::Unresolved;
        };

        match fetch_year(
            &self.client,
            &url,
            year,
            &self.config.data_dir,
            self.config.max_response_size,
        ) {
            Ok(fetched) => YearOutcome::Fetched {
                path: fetched.path,
                rows: fetched.rows,
                source,
            },
            Err(e) => {
                tracing::error!(year, url = %url, error = %e, "Downloading calendar failed");
                YearOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// List the raw and structured files in `data_dir`, logging each with its size.
///
/// # Returns
/// `(csv_files, yaml_files)`, each sorted by name
pub fn list_data_files(data_dir: &Path) -> (Vec<DataFile>, Vec<DataFile>) {
    let collect = |extension: &str| -> Vec<DataFile> {
        files_with_extension(data_dir, extension)
            .unwrap_or_default()
            .into_iter()
            .map(|name| {
                let size = fs::metadata(data_dir.join(&name))
                    .map(|m| m.len())
                    .unwrap_or(0);
                DataFile { name, size }
            })
            .collect()
    };

    let csv_files = collect("csv");
    let yaml_files = collect("yml");

    for file in &csv_files {
        tracing::info!(file = %file.name, size = file.size, "CSV file");
    }
    for file in &yaml_files {
        tracing::info!(file = %file.name, size = file.size, "YAML file");
    }
    if csv_files.is_empty() && yaml_files.is_empty() {
        tracing::info!(path = %data_dir.display(), "Data directory has no data files");
    }

    (csv_files, yaml_files)
}
