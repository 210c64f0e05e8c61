//! Year check for discovered links.

use url::{ParseError, Url};

use super::extract::name_parameter;
use crate::types::ValidationResult;
use crate::year::{calendar_title, western_to_minguo};

/// Check that `url` really is the calendar for western `year`.
///
/// The year is re-derived from the link's `name` query parameter:
/// - [`ValidationResult::Confirmed`] if the decoded file name contains the
///   calendar title for `year`
/// - [`ValidationResult::Mismatched`] if it does not, or if `url` is
///   malformed (relative links are accepted)
/// - [`ValidationResult::Unverifiable`] if there is no `name` parameter
///
/// # Examples
/// ```
/// use taiwan_holiday_crawler::discovery::validate_link;
/// use taiwan_holiday_crawler::types::ValidationResult;
///
/// let url = "https://www.dgpa.gov.tw/FileConversion?name=113年中華民國政府行政機關辦公日曆表.csv";
/// assert_eq!(validate_link(2024, url), ValidationResult::Confirmed);
/// assert_eq!(validate_link(2025, url), ValidationResult::Mismatched);
/// assert_eq!(validate_link(2024, "https://data.gov.tw/x.csv"), ValidationResult::Unverifiable);
/// ```
pub fn validate_link(year: i32, url: &str) -> ValidationResult {
    // A relative link is fine; only a malformed one is rejected
    if let Err(e) = Url::parse(url) {
        if e != ParseError::RelativeUrlWithoutBase {
            tracing::warn!(year, url, error = %e, "Cannot parse link");
            return ValidationResult::Mismatched;
        }
    }

    let Some(file_name) = name_parameter(url) else {
        tracing::warn!(year, url, "Cannot verify link year; no file name in link");
        return ValidationResult::Unverifiable;
    };

    let expected = calendar_title(western_to_minguo(year));
    if file_name.contains(&expected) {
        tracing::info!(year, file_name = %file_name, "Link verified");
        ValidationResult::Confirmed
    } else {
        tracing::warn!(
            year,
            expected = %expected,
            file_name = %file_name,
            "Link year does not match"
        );
        ValidationResult::Mismatched
    }
}
