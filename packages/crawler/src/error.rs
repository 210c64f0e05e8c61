//! Error types for the crawler.
//!
//! `CrawlerError` covers every failure a run can hit. Per-year failures are
//! caught at the year boundary by the crawler and recorded in the run report;
//! only setup errors reach the CLI.

use thiserror::Error;

/// Main error type for the crawler library.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// HTTP client construction or request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Download of a specific URL failed (network error or non-success status).
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body exceeded the configured size limit.
    #[error("Response from {url} exceeds the {limit} byte limit")]
    ResponseTooLarge { url: String, limit: u64 },

    /// Downloaded bytes did not decode under any supported encoding.
    #[error("Could not decode {url} (tried {})", .tried.join(", "))]
    Decode { url: String, tried: Vec<String> },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization or parsing error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),

    /// CSV parsing error.
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    /// A required CSV column is missing from the header row.
    #[error("Missing CSV column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    /// Raw file name carries no year.
    #[error("Cannot derive a year from file name: {0}")]
    InvalidFileName(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;
