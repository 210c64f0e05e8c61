//! Target year selection.

use chrono::{Datelike, NaiveDate};

use crate::types::{RunMode, TargetYearSet, YearLinkMap};

/// Decide which years a run attempts.
///
/// Maintenance mode always yields the current and next year of `today`.
/// Backfill mode yields every discovered year, newest first; if nothing was
/// discovered it degrades to the maintenance years and flags the fallback.
pub fn select_target_years(mode: RunMode, today: NaiveDate, links: &YearLinkMap) -> TargetYearSet {
    if mode == RunMode::Backfill {
        if !links.is_empty() {
            let years = links.years_descending();
            tracing::info!(?years, "Backfilling all available years");
            return TargetYearSet {
                years,
                is_fallback: false,
            };
        }
        tracing::warn!("No years discovered; falling back to maintenance years");
        return TargetYearSet {
            years: maintenance_years(today),
            is_fallback: true,
        };
    }

    TargetYearSet {
        years: maintenance_years(today),
        is_fallback: false,
    }
}

fn maintenance_years(today: NaiveDate) -> Vec<i32> {
    let current = today.year();
    vec![current, current + 1]
}
