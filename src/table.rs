use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::AggregatedPrices;

pub type ProductPriceSeries = BTreeMap<NaiveDate, f64>;

/// The canonical product × date price matrix: a sorted column axis plus a
/// sparse per-product series. Renderer collaborators (spreadsheet, chart)
/// consume this structure; it carries no presentation detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceHistoryTable {
    #[schemars(description = "Sorted distinct dates across all retained products; the column axis")]
    pub dates: Vec<NaiveDate>,

    #[schemars(
        description = "Per-product date → reporting-currency price series. Only products observed on at least two distinct dates are retained; single-occurrence products carry no trend signal."
    )]
    pub products: BTreeMap<String, ProductPriceSeries>,
}

impl PriceHistoryTable {
    /// Applies the ≥2-distinct-dates retention filter and computes the
    /// column axis as the sorted union of retained dates.
    pub fn build(aggregated: &AggregatedPrices) -> Self {
        let products: BTreeMap<String, ProductPriceSeries> = aggregated
            .iter()
            .filter(|(_, series)| series.len() >= 2)
            .map(|(name, series)| {
                let flat = series.iter().map(|(date, point)| (*date, point.price)).collect();
                (name.clone(), flat)
            })
            .collect();

        let mut dates: Vec<NaiveDate> = products
            .values()
            .flat_map(|series| series.keys())
            .copied()
            .collect();
        dates.sort();
        dates.dedup();

        Self { dates, products }
    }

    /// Cells for one product aligned to the column axis; None where the
    /// product has no observation for that date.
    pub fn row(&self, product: &str) -> Option<Vec<Option<f64>>> {
        let series = self.products.get(product)?;
        Some(
            self.dates
                .iter()
                .map(|date| series.get(date).copied())
                .collect(),
        )
    }

    /// Column headers formatted as ISO dates.
    pub fn date_labels(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::merge_price_maps;
    use crate::parser::ProductPrices;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> AggregatedPrices {
        let mut file = ProductPrices::new();
        let milk = file.entry("МЛЯКО".to_string()).or_default();
        milk.insert(date(2025, 3, 1), 1.00);
        milk.insert(date(2025, 4, 1), 1.10);
        file.entry("СИРЕНЕ".to_string())
            .or_default()
            .insert(date(2025, 3, 15), 4.29);
        merge_price_maps(std::slice::from_ref(&file))
    }

    #[test]
    fn test_single_occurrence_products_are_dropped() {
        let table = PriceHistoryTable::build(&fixture());
        assert_eq!(table.len(), 1);
        assert!(table.products.contains_key("МЛЯКО"));
        assert!(!table.products.contains_key("СИРЕНЕ"));
    }

    #[test]
    fn test_column_axis_covers_retained_dates_only() {
        let table = PriceHistoryTable::build(&fixture());
        // СИРЕНЕ was dropped, so its date must not appear on the axis.
        assert_eq!(table.dates, vec![date(2025, 3, 1), date(2025, 4, 1)]);
        assert_eq!(table.date_labels(), vec!["2025-03-01", "2025-04-01"]);
    }

    #[test]
    fn test_row_alignment() {
        let mut file = ProductPrices::new();
        let milk = file.entry("МЛЯКО".to_string()).or_default();
        milk.insert(date(2025, 3, 1), 1.00);
        milk.insert(date(2025, 5, 1), 1.20);
        let eggs = file.entry("ЯЙЦА".to_string()).or_default();
        eggs.insert(date(2025, 4, 1), 3.49);
        eggs.insert(date(2025, 5, 1), 3.59);

        let table = PriceHistoryTable::build(&merge_price_maps(std::slice::from_ref(&file)));
        assert_eq!(table.dates.len(), 3);

        let milk_row = table.row("МЛЯКО").unwrap();
        assert_eq!(milk_row, vec![Some(1.00), None, Some(1.20)]);
        let eggs_row = table.row("ЯЙЦА").unwrap();
        assert_eq!(eggs_row, vec![None, Some(3.49), Some(3.59)]);

        assert!(table.row("НЯМА ТАКЪВ").is_none());
    }

    #[test]
    fn test_empty_aggregate_builds_empty_table() {
        let table = PriceHistoryTable::build(&AggregatedPrices::new());
        assert!(table.is_empty());
        assert!(table.dates.is_empty());
    }
}
