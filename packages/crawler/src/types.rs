//! Core data types shared by discovery, the resolution loop and the CLI.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Candidate download link per western year, as discovered on the listing page.
///
/// A year that was not discovered is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearLinkMap(BTreeMap<i32, String>);

impl YearLinkMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the link for `year`, replacing any previous entry.
    pub fn insert(&mut self, year: i32, url: impl Into<String>) {
        self.0.insert(year, url.into());
    }

    /// Set the link for `year` only if the year has no entry yet.
    ///
    /// Returns `true` if the link was inserted.
    pub fn insert_if_absent(&mut self, year: i32, url: impl Into<String>) -> bool {
        if self.0.contains_key(&year) {
            return false;
        }
        self.0.insert(year, url.into());
        true
    }

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

    /// Discovered years, newest first.
    #[must_use]
    pub fn years_descending(&self) -> Vec<i32> {
        self.0.keys().rev().copied().collect()
    }
}

/// Outcome of checking that a link really belongs to the year it was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// The link's file name carries the expected year.
    Confirmed,
    /// The link's file name carries a different year, or the link is malformed.
    Mismatched,
    /// The link has no file name parameter to check.
    Unverifiable,
}

impl ValidationResult {
    /// Whether a link with this result may be downloaded.
    ///
    /// Unverifiable links are accepted unless `strict` is set.
    #[must_use]
    pub fn is_acceptable(self, strict: bool) -> bool {
        match self {
            Self::Confirmed => true,
            Self::Unverifiable => !strict,
            Self::Mismatched => false,
        }
    }
}

/// Which years a run targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Current and next calendar year.
    #[default]
    Maintenance,
    /// Every year discoverable on the listing page.
    Backfill,
}

impl RunMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Backfill => "backfill",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered years to attempt in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetYearSet {
    pub years: Vec<i32>,
    /// Backfill was requested but nothing was discovered, so maintenance years were used.
    pub is_fallback: bool,
}

/// Where the link used for a year came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    Discovered,
    Fallback,
}

impl LinkSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of attempting one target year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearOutcome {
    /// Raw file written.
    Fetched {
        path: PathBuf,
        rows: usize,
        source: LinkSource,
    },
    /// No acceptable link, discovered or fallback.
    Unresolved,
    /// A link was found but downloading or saving failed.
    Failed { reason: String },
}

impl YearOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// A file in the data directory, for the end-of-run listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub name: String,
    pub size: u64,
}

/// Everything a run did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    /// Number of years found on the listing page.
    pub discovered: usize,
    pub targets: TargetYearSet,
    pub outcomes: Vec<(i32, YearOutcome)>,
    /// Structured files written by the normalizer.
    pub converted: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
    pub csv_files: Vec<DataFile>,
    pub yaml_files: Vec<DataFile>,
}

impl RunReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .count()
    }
}
