use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::table::PriceHistoryTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductTrend {
    pub product: String,
    /// Price at the earliest retained date.
    pub first_price: f64,
    /// Price at the latest retained date.
    pub last_price: f64,
    pub min_price: f64,
    pub min_date: NaiveDate,
    pub max_price: f64,
    pub max_date: NaiveDate,
    #[schemars(
        description = "(last − first) / first × 100. None when the first price is zero; such products stay in the table but are excluded from rankings."
    )]
    pub percent_change: Option<f64>,
}

/// Per-product trend figures over the retained price table, plus ranked views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrendSummary {
    /// One entry per retained product, sorted by product name.
    pub products: Vec<ProductTrend>,
}

impl TrendSummary {
    pub fn build(table: &PriceHistoryTable) -> Self {
        let products = table
            .products
            .iter()
            .filter_map(|(name, series)| {
                let (&first_date, &first_price) = series.iter().next()?;
                let (_, &last_price) = series.iter().next_back()?;

                let mut min_price = first_price;
                let mut min_date = first_date;
                let mut max_price = first_price;
                let mut max_date = first_date;
                for (&date, &price) in series {
                    if price < min_price {
                        min_price = price;
                        min_date = date;
                    }
                    if price > max_price {
                        max_price = price;
                        max_date = date;
                    }
                }

                let percent_change =
                    (first_price != 0.0).then(|| (last_price - first_price) / first_price * 100.0);

                Some(ProductTrend {
                    product: name.clone(),
                    first_price,
                    last_price,
                    min_price,
                    min_date,
                    max_price,
                    max_date,
                    percent_change,
                })
            })
            .collect();

        Self { products }
    }

    /// All ranked products by absolute percent change, largest movement first.
    pub fn top_movers(&self, n: usize) -> Vec<&ProductTrend> {
        let mut ranked: Vec<&ProductTrend> = self
            .products
            .iter()
            .filter(|trend| trend.percent_change.is_some())
            .collect();
        ranked.sort_by(|a, b| {
            let a_abs = a.percent_change.unwrap_or(0.0).abs();
            let b_abs = b.percent_change.unwrap_or(0.0).abs();
            b_abs.total_cmp(&a_abs)
        });
        ranked.truncate(n);
        ranked
    }

    /// Products whose price fell, steepest decrease first.
    pub fn top_decreases(&self, n: usize) -> Vec<&ProductTrend> {
        let mut ranked: Vec<&ProductTrend> = self
            .products
            .iter()
            .filter(|trend| trend.percent_change.is_some_and(|change| change < 0.0))
            .collect();
        ranked.sort_by(|a, b| {
            a.percent_change
                .unwrap_or(0.0)
                .total_cmp(&b.percent_change.unwrap_or(0.0))
        });
        ranked.truncate(n);
        ranked
    }
}
