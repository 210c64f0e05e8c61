//! Configuration constants and the run configuration for the crawler.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CrawlerError, Result};

/// Dataset page on the government open-data portal that lists the calendars.
pub const LISTING_URL: &str = "https://data.gov.tw/dataset/14718";

/// Scheme and host used to absolutize root-relative links on the listing page.
pub const SITE_ORIGIN: &str = "https://data.gov.tw";

/// Marker identifying the file-conversion endpoint that serves the CSV exports.
pub const FILE_CONVERSION_ENDPOINT: &str = "dgpa.gov.tw/FileConversion";

/// HTTP timeout in seconds. Requests are never retried.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (10 MB).
///
/// A yearly calendar is a few dozen kilobytes; the listing page is well
/// under a megabyte.
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Default directory for raw and structured files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default log file, written next to the working directory.
pub const DEFAULT_LOG_FILE: &str = "crawler.log";

/// Known-good CSV link for 2021 (民國 110), used when discovery misses it.
const KNOWN_URL_2021: &str = "https://www.dgpa.gov.tw/FileConversion?filename=dgpa/files/202407/daec35f0-ae43-4466-aa26-bafb39aa8e0a.csv&nfix=&name=110%e4%b8%ad%e8%8f%af%e6%b0%91%e5%9c%8b%e6%94%bf%e5%ba%9c%e8%a1%8c%e6%94%bf%e6%a9%9f%e9%97%9c%e8%be%a6%e5%85%ac%e6%97%a5%e6%9b%86%e8%a1%a8.csv";

/// Hand-maintained table of pre-vetted download links, keyed by western year.
///
/// Entries are used only when discovery does not yield an acceptable link
/// and are never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackUrls(BTreeMap<i32, String>);

impl FallbackUrls {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the crawler.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with(2021, KNOWN_URL_2021)
    }

    /// Add or replace the entry for `year`.
    #[must_use]
    pub fn with(mut self, year: i32, url: impl Into<String>) -> Self {
        self.0.insert(year, url.into());
        self
    }

    /// Look up the link for `year`.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<&str> {
        self.0.get(&year).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Settings for a single crawler run.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub listing_url: String,
    pub site_origin: String,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub timeout_secs: u64,
    pub max_response_size: u64,
    /// Reject links whose year cannot be verified instead of trusting them.
    pub strict_validation: bool,
    pub fallback_urls: FallbackUrls,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            site_origin: SITE_ORIGIN.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            timeout_secs: HTTP_TIMEOUT_SECS,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            strict_validation: false,
            fallback_urls: FallbackUrls::builtin(),
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Recognised variables: `CRAWLER_DATA_DIR`, `CRAWLER_LOG_FILE`,
    /// `CRAWLER_LISTING_URL`, `CRAWLER_SITE_ORIGIN` and
    /// `CRAWLER_STRICT_VALIDATION`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("CRAWLER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("CRAWLER_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }
        if let Some(url) = lookup("CRAWLER_LISTING_URL") {
            config.listing_url = url;
        }
        if let Some(origin) = lookup("CRAWLER_SITE_ORIGIN") {
            config.site_origin = origin.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("CRAWLER_STRICT_VALIDATION") {
            config.strict_validation = parse_flag("CRAWLER_STRICT_VALIDATION", &value)?;
        }

        Ok(config)
    }

    /// Create a config builder, mainly for tests.
    #[must_use]
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder {
            config: Self::default(),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CrawlerError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

/// Builder for constructing `CrawlerConfig` in tests.
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    #[must_use]
    pub fn listing_url(mut self, url: impl Into<String>) -> Self {
        self.config.listing_url = url.into();
        self
    }

    #[must_use]
    pub fn site_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.site_origin = origin.into();
        self
    }

    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.config.strict_validation = strict;
        self
    }

    #[must_use]
    pub fn fallback_urls(mut self, fallback_urls: FallbackUrls) -> Self {
        self.config.fallback_urls = fallback_urls;
        self
    }

    #[must_use]
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}
