//! Minguo (Republic of China) calendar arithmetic.
//!
//! The portal names every calendar by its Minguo year, e.g.
//! `113年中華民國政府行政機關辦公日曆表` for 2024. All year conversions in the
//! crate go through this module.

/// Offset between the Minguo calendar and the western calendar.
pub const MINGUO_OFFSET: i32 = 1911;

/// Text following the Minguo year in a calendar's title and file name.
pub const CALENDAR_TITLE_SUFFIX: &str = "年中華民國政府行政機關辦公日曆表";

/// Convert a Minguo year to a western year.
///
/// # Examples
/// ```
/// use taiwan_holiday_crawler::year::minguo_to_western;
///
/// assert_eq!(minguo_to_western(113), 2024);
/// ```
#[must_use]
pub const fn minguo_to_western(minguo: i32) -> i32 {
    minguo + MINGUO_OFFSET
}

/// Convert a western year to a Minguo year.
#[must_use]
pub const fn western_to_minguo(western: i32) -> i32 {
    western - MINGUO_OFFSET
}

/// Title of the calendar published for a Minguo year.
///
/// # Examples
/// ```
/// use taiwan_holiday_crawler::year::calendar_title;
///
/// assert_eq!(calendar_title(113), "113年中華民國政府行政機關辦公日曆表");
/// ```
#[must_use]
pub fn calendar_title(minguo: i32) -> String {
    format!("{minguo}{CALENDAR_TITLE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minguo_to_western() {
        assert_eq!(minguo_to_western(110), 2021);
        assert_eq!(minguo_to_western(113), 2024);
        assert_eq!(minguo_to_western(114), 2025);
    }

    #[test]
    fn test_conversion_is_inverse() {
        for minguo in [1, 99, 100, 113, 999] {
            assert_eq!(western_to_minguo(minguo_to_western(minguo)), minguo);
        }
    }

    #[test]
    fn test_calendar_title_for_western_year() {
        assert_eq!(
            calendar_title(western_to_minguo(2025)),
            "114年中華民國政府行政機關辦公日曆表"
        );
    }
}
