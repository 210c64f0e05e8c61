//! Taiwan Holiday Crawler - Download government office calendars from data.gov.tw.
//!
//! This crate discovers the yearly 中華民國政府行政機關辦公日曆表 CSV exports on
//! the government open-data portal, downloads the ones for the target years,
//! and converts them to structured YAML with a cross-year summary.
//!
//! # Example
//!
//! ```
//! use taiwan_holiday_crawler::discovery::{extract_year_links, validate_link};
//! use taiwan_holiday_crawler::types::ValidationResult;
//!
//! let html = r#"<a href="https://www.dgpa.gov.tw/FileConversion?name=113年中華民國政府行政機關辦公日曆表.csv">CSV</a>"#;
//! let links = extract_year_links(html, "https://data.gov.tw");
//! let url = links.get(2024).unwrap();
//! assert_eq!(validate_link(2024, url), ValidationResult::Confirmed);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, run configuration and the fallback link table
//! - [`types`]: Core data types (YearLinkMap, ValidationResult, RunReport, etc.)
//! - [`error`]: Error types and Result alias
//! - [`year`]: Minguo/western year arithmetic
//! - [`encoding`]: Decoding of downloaded bytes
//! - [`http`]: HTTP client for the portal
//! - [`discovery`]: Link extraction, validation and target year selection
//! - [`fetch`]: Download and store raw calendars
//! - [`convert`]: Raw CSV to structured calendars
//! - [`summary`]: Cross-year summary index
//! - [`yaml`]: YAML output generation
//! - [`output`]: Data directory layout and atomic writes
//! - [`crawler`]: Main crawler service
//! - [`logging`]: Console and file logging
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod convert;
pub mod crawler;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod output;
pub mod summary;
pub mod types;
pub mod year;
pub mod yaml;

pub use crawler::{resolve_link, Crawler};

pub use config::{CrawlerConfig, FallbackUrls};
pub use error::{CrawlerError, Result};
pub use types::{RunMode, RunReport, ValidationResult, YearLinkMap, YearOutcome};
