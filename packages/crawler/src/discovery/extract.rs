//! Link extraction from the dataset listing page.
//!
//! Two strategies map a western year to a download link:
//!
//! 1. **Primary**: links to the file-conversion endpoint whose `name` query
//!    parameter is a calendar file name such as
//!    `113年中華民國政府行政機關辦公日曆表.csv`. A primary match always
//!    replaces the current entry for its year.
//! 2. **Secondary**: any other link whose visible text names a calendar and
//!    contains `CSV`. It only fills years that have no entry yet.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use url::form_urlencoded;

use crate::config::FILE_CONVERSION_ENDPOINT;
use crate::http::download_text;
use crate::types::YearLinkMap;
use crate::year::{minguo_to_western, CALENDAR_TITLE_SUFFIX};

/// Every hyperlink that has a target.
#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Calendar file name carried in the `name` parameter.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(\d{{3}}){CALENDAR_TITLE_SUFFIX}\.csv")).expect("valid regex")
});

/// Calendar title in a link's visible text.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LINK_TEXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(\d{{3}}){CALENDAR_TITLE_SUFFIX}")).expect("valid regex")
});

/// Marker the secondary strategy requires in the link text.
const CSV_MARKER: &str = "CSV";

/// Extract the year → link mapping from a listing page.
///
/// # Arguments
/// * `html` - The listing page markup
/// * `site_origin` - Scheme and host prepended to root-relative links
///
/// # Returns
/// The discovered links. Empty if the page names no calendars.
pub fn extract_year_links(html: &str, site_origin: &str) -> YearLinkMap {
    let document = Html::parse_document(html);
    let mut links = YearLinkMap::new();

    for anchor in document.select(&LINK_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        if is_file_conversion_link(href) {
            if let Some((year, file_name)) = primary_match(href) {
                tracing::info!(year, file_name = %file_name, "Found calendar link");
                links.insert(year, href);
            }
        } else if let Some(year) = secondary_match(anchor) {
            match absolutize(href, site_origin) {
                Some(url) => {
                    if links.insert_if_absent(year, url.as_str()) {
                        tracing::debug!(year, url = %url, "Found calendar link by link text");
                    }
                }
                None => tracing::debug!(year, href, "Ignoring calendar link with unsupported href"),
            }
        }
    }

    tracing::info!(years = ?links.years_descending(), "Discovered calendar years");
    links
}

/// Fetch the listing page and extract its links.
///
/// Discovery never fails the run: an unreachable or undecodable page is
/// logged and yields an empty map.
pub fn discover_year_links(
    client: &Client,
    listing_url: &str,
    site_origin: &str,
    max_size: u64,
) -> YearLinkMap {
    match download_text(client, listing_url, max_size) {
        Ok(html) => extract_year_links(&html, site_origin),
        Err(e) => {
            tracing::error!(url = listing_url, error = %e, "Failed to fetch listing page");
            YearLinkMap::new()
        }
    }
}

/// Whether the primary strategy owns this link.
fn is_file_conversion_link(href: &str) -> bool {
    href.contains(FILE_CONVERSION_ENDPOINT) && href.contains("name=")
}

/// Decoded value of the first non-empty `name` query parameter.
///
/// Only the query string is read, so absolute, protocol-relative and
/// relative links are all accepted.
pub(crate) fn name_parameter(href: &str) -> Option<String> {
    let without_fragment = href.split_once('#').map_or(href, |(before, _)| before);
    let (_, query) = without_fragment.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "name" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn primary_match(href: &str) -> Option<(i32, String)> {
    let file_name = name_parameter(href)?;
    let year = capture_year(&FILE_NAME_PATTERN, &file_name)?;
    Some((year, file_name))
}

fn secondary_match(anchor: ElementRef<'_>) -> Option<i32> {
    let text = anchor.text().collect::<String>();
    let text = text.trim();
    if !text.contains(CSV_MARKER) {
        return None;
    }
    capture_year(&LINK_TEXT_PATTERN, text)
}

/// Western year from the three-digit Minguo year captured by `pattern`.
fn capture_year(pattern: &Regex, haystack: &str) -> Option<i32> {
    let minguo: i32 = pattern.captures(haystack)?.get(1)?.as_str().parse().ok()?;
    Some(minguo_to_western(minguo))
}

/// Turn a listing-page href into an absolute URL.
///
/// Root-relative paths are joined to `site_origin`; absolute `http(s)` links
/// are kept as-is. Protocol-relative and document-relative links are
/// rejected.
fn absolutize(href: &str, site_origin: &str) -> Option<String> {
    if href.starts_with("//") {
        // Prefixing the origin here would produce `https://data.gov.tw//host/...`
        None
    } else if href.starts_with('/') {
        Some(format!("{}{href}", site_origin.trim_end_matches('/')))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}
