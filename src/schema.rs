use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ReceiptHistoryError, Result};

fn default_cutover() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn default_peg_rate() -> f64 {
    1.95583
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurrencyPolicy {
    #[serde(default = "default_cutover")]
    #[schemars(
        description = "Redenomination date. Receipts dated strictly before this are always treated as legacy-currency and converted, regardless of any in-text currency marker."
    )]
    pub cutover: NaiveDate,

    #[serde(default = "default_peg_rate")]
    #[schemars(
        description = "Fixed legacy-to-reporting conversion rate. Extracted prices are divided by this rate when the receipt is classified as legacy-currency (1.95583 BGN per EUR)."
    )]
    pub peg_rate: f64,
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self {
            cutover: default_cutover(),
            peg_rate: default_peg_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", tag = "policy")]
pub enum YearInference {
    /// Month-name-only dates carry no year, so one is pinned from a fixed
    /// two-year window: December resolves to `previous_year`, every other
    /// month to `current_year`. Correct only for data captured inside that
    /// window; swap the policy rather than widening the literals.
    FixedWindow {
        #[schemars(description = "Year assigned to months January through November")]
        current_year: i32,
        #[schemars(description = "Year assigned to December")]
        previous_year: i32,
    },
}

impl Default for YearInference {
    fn default() -> Self {
        Self::FixedWindow {
            current_year: 2026,
            previous_year: 2025,
        }
    }
}

impl YearInference {
    pub fn year_for_month(&self, month: u32) -> i32 {
        match self {
            Self::FixedWindow {
                current_year,
                previous_year,
            } => {
                if month == 12 {
                    *previous_year
                } else {
                    *current_year
                }
            }
        }
    }
}

/// Optional calendar window for receipt blocks. A block whose date could not
/// be resolved counts as in-range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzerOptions {
    #[serde(default)]
    #[schemars(description = "Currency normalization policy (cutover date and peg rate)")]
    pub currency: CurrencyPolicy,

    #[serde(default)]
    #[schemars(description = "Year inference policy for month-name-only receipt dates")]
    pub year_inference: YearInference,

    #[serde(default)]
    #[schemars(
        description = "Optional date window; receipt blocks dated outside it are skipped during extraction"
    )]
    pub date_range: DateRange,
}

impl AnalyzerOptions {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyzerOptions)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

pub fn validate_options(options: &AnalyzerOptions) -> Result<()> {
    if !options.currency.peg_rate.is_finite() || options.currency.peg_rate <= 0.0 {
        return Err(ReceiptHistoryError::InvalidPegRate(
            options.currency.peg_rate,
        ));
    }

    if let (Some(start), Some(end)) = (options.date_range.start, options.date_range.end) {
        if start > end {
            return Err(ReceiptHistoryError::InvalidDateRange { start, end });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_currency_policy() {
        let policy = CurrencyPolicy::default();
        assert_eq!(policy.cutover, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!((policy.peg_rate - 1.95583).abs() < 1e-10);
    }

    #[test]
    fn test_year_inference_window() {
        let policy = YearInference::default();
        assert_eq!(policy.year_for_month(12), 2025);
        assert_eq!(policy.year_for_month(1), 2026);
        assert_eq!(policy.year_for_month(11), 2026);
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange {
            start: Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
        };

        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 4, 15)));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 2, 28)));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 7, 1)));
        // Undated blocks are retained by default.
        assert!(range.contains(None));
    }

    #[test]
    fn test_unbounded_range_contains_everything() {
        let range = DateRange::default();
        assert!(range.is_unbounded());
        assert!(range.contains(NaiveDate::from_ymd_opt(1999, 1, 1)));
        assert!(range.contains(None));
    }

    #[test]
    fn test_validate_rejects_bad_peg_rate() {
        let mut options = AnalyzerOptions::default();
        options.currency.peg_rate = 0.0;
        assert!(validate_options(&options).is_err());

        options.currency.peg_rate = f64::NAN;
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut options = AnalyzerOptions::default();
        options.date_range.start = NaiveDate::from_ymd_opt(2026, 1, 1);
        options.date_range.end = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn test_options_serialization_round_trip() {
        let options = AnalyzerOptions::default();
        let json = serde_json::to_string_pretty(&options).unwrap();
        let back: AnalyzerOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);

        // Missing fields fall back to defaults.
        let sparse: AnalyzerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(sparse, AnalyzerOptions::default());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = AnalyzerOptions::schema_as_json().unwrap();
        assert!(schema_json.contains("currency"));
        assert!(schema_json.contains("year_inference"));
        assert!(schema_json.contains("date_range"));
    }
}
