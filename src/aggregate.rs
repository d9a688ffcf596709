use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parser::ProductPrices;

/// One merged (product, date) cell. `price` is the arithmetic mean of every
/// observation for the pair; the raw per-source values are kept alongside so
/// collisions stay inspectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricePoint {
    pub price: f64,
    pub samples: Vec<f64>,
}

impl PricePoint {
    fn observe(&mut self, value: f64) {
        self.samples.push(value);
        self.price = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
    }
}

pub type AggregatedPrices = BTreeMap<String, BTreeMap<NaiveDate, PricePoint>>;

/// Pure fold of per-file price maps into one. A (product, date) pair seen in
/// several files resolves to the mean of all observed values; products absent
/// from a file contribute nothing for that file.
pub fn merge_price_maps(files: &[ProductPrices]) -> AggregatedPrices {
    let mut merged = AggregatedPrices::new();

    for file in files {
        for (product, series) in file {
            let merged_series = merged.entry(product.clone()).or_default();
            for (date, price) in series {
                merged_series
                    .entry(*date)
                    .or_insert_with(|| PricePoint {
                        price: 0.0,
                        samples: Vec::new(),
                    })
                    .observe(*price);
            }
        }
    }

    merged
}
