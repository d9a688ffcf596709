//! Receipt date extraction: an ordered chain of patterns tried until one
//! matches, with a swappable year-inference policy for month-name dates.

use chrono::NaiveDate;
use log::warn;
use regex::Regex;
use std::sync::OnceLock;

use crate::schema::YearInference;

/// Localized month names as printed in receipt headers, in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "януари",
    "февруари",
    "март",
    "април",
    "май",
    "юни",
    "юли",
    "август",
    "септември",
    "октомври",
    "ноември",
    "декември",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `DD.MM.YYYY HH:MM:SS` anywhere in the block (fiscal-printer footer).
    DayMonthYearTime,
    /// `YYYY.MM.DD HH:MM` anywhere in the block.
    YearMonthDayTime,
    /// `D.<month name>` header label; the year is inferred by policy.
    DayMonthName,
}

/// Priority order. The first pattern to produce a valid date wins.
pub const PATTERN_PRIORITY: [DatePattern; 3] = [
    DatePattern::DayMonthYearTime,
    DatePattern::YearMonthDayTime,
    DatePattern::DayMonthName,
];

fn dmy_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})\s+\d{2}:\d{2}:\d{2}")
            .expect("invalid dmy timestamp regex")
    })
}

fn ymd_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{4})\.(\d{2})\.(\d{2})\s+\d{2}:\d{2}").expect("invalid ymd timestamp regex")
    })
}

fn day_month_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternatives = MONTH_NAMES.join("|");
        Regex::new(&format!(r"(\d{{1,2}})\.({alternatives})"))
            .expect("invalid month name regex")
    })
}

pub struct DateResolver {
    year_inference: YearInference,
}

impl DateResolver {
    pub fn new(year_inference: YearInference) -> Self {
        Self { year_inference }
    }

    /// Tries each pattern in [`PATTERN_PRIORITY`] and returns the first
    /// successful match, or None when the block carries no recognizable date.
    pub fn resolve(&self, text: &str) -> Option<NaiveDate> {
        PATTERN_PRIORITY
            .iter()
            .find_map(|pattern| self.try_pattern(*pattern, text))
    }

    fn try_pattern(&self, pattern: DatePattern, text: &str) -> Option<NaiveDate> {
        match pattern {
            DatePattern::DayMonthYearTime => {
                let caps = dmy_timestamp_re().captures(text)?;
                build_date(&caps[3], &caps[2], &caps[1])
            }
            DatePattern::YearMonthDayTime => {
                let caps = ymd_timestamp_re().captures(text)?;
                build_date(&caps[1], &caps[2], &caps[3])
            }
            DatePattern::DayMonthName => {
                let lowered = text.to_lowercase();
                let caps = day_month_name_re().captures(&lowered)?;
                let day: u32 = caps[1].parse().ok()?;
                let month = month_number(&caps[2])?;
                let year = self.year_inference.year_for_month(month);
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                warn!(
                    "Inferred year {} for month-name date {}.{} via {:?}",
                    year, day, &caps[2], self.year_inference
                );
                Some(date)
            }
        }
    }
}

fn build_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DateResolver {
        DateResolver::new(YearInference::default())
    }

    #[test]
    fn test_full_timestamp() {
        let date = resolver().resolve("ОБЩА СУМА  12,34\n15.03.2025 20:00:00\nУНП: ...");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 15));
    }

    #[test]
    fn test_year_first_timestamp() {
        let date = resolver().resolve("касова бележка\n2025.12.26 17:24\n");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 26));
    }

    #[test]
    fn test_month_name_with_inferred_year() {
        let date = resolver().resolve("Покупка от 13.януари\n");
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 13));

        // December maps to the previous year of the window.
        let date = resolver().resolve("Покупка от 30.декември\n");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 30));
    }

    #[test]
    fn test_month_name_is_case_insensitive() {
        let date = resolver().resolve("5.Март\n");
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 5));
    }

    #[test]
    fn test_full_timestamp_wins_over_month_name() {
        let text = "Покупка от 13.януари\n...\n15.03.2025 20:00:00\n";
        assert_eq!(
            resolver().resolve(text),
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
    }

    #[test]
    fn test_year_first_wins_over_month_name() {
        let text = "Покупка от 13.януари\n2025.12.26 17:24\n";
        assert_eq!(
            resolver().resolve(text),
            NaiveDate::from_ymd_opt(2025, 12, 26)
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(resolver().resolve("МЛЯКО    1,99\nОБЩА СУМА  1,99"), None);
    }

    #[test]
    fn test_invalid_calendar_date_is_rejected() {
        assert_eq!(resolver().resolve("99.13.2025 20:00:00"), None);
    }

    #[test]
    fn test_custom_window_policy() {
        let resolver = DateResolver::new(YearInference::FixedWindow {
            current_year: 2031,
            previous_year: 2030,
        });
        assert_eq!(
            resolver.resolve("1.юни"),
            NaiveDate::from_ymd_opt(2031, 6, 1)
        );
        assert_eq!(
            resolver.resolve("1.декември"),
            NaiveDate::from_ymd_opt(2030, 12, 1)
        );
    }
}
