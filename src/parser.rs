use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency;
use crate::dates::DateResolver;
use crate::extract;
use crate::schema::{AnalyzerOptions, CurrencyPolicy, DateRange};
use crate::segmenter;

/// Per-product date → reporting-currency price map for one corpus.
pub type ProductPrices = BTreeMap<String, BTreeMap<NaiveDate, f64>>;

/// Skip and throughput counters for one corpus (or, summed, for a whole run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParseStats {
    pub blocks_seen: usize,
    /// Blocks that passed the date gates and went through line extraction.
    pub blocks_parsed: usize,
    pub blocks_skipped_no_date: usize,
    pub blocks_skipped_out_of_range: usize,
    pub entries_extracted: usize,
}

impl ParseStats {
    pub fn absorb(&mut self, other: &ParseStats) {
        self.blocks_seen += other.blocks_seen;
        self.blocks_parsed += other.blocks_parsed;
        self.blocks_skipped_no_date += other.blocks_skipped_no_date;
        self.blocks_skipped_out_of_range += other.blocks_skipped_out_of_range;
        self.entries_extracted += other.entries_extracted;
    }

    pub fn blocks_skipped(&self) -> usize {
        self.blocks_skipped_no_date + self.blocks_skipped_out_of_range
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCorpus {
    pub prices: ProductPrices,
    pub stats: ParseStats,
}

pub struct ReceiptParser {
    resolver: DateResolver,
    currency: CurrencyPolicy,
    date_range: DateRange,
}

impl ReceiptParser {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            resolver: DateResolver::new(options.year_inference.clone()),
            currency: options.currency.clone(),
            date_range: options.date_range.clone(),
        }
    }

    /// Runs segmentation, date and currency resolution, and line extraction
    /// over one corpus. Blocks without a resolvable date (or outside the date
    /// window) contribute nothing and are counted, never fatal.
    pub fn parse_corpus(&self, corpus: &str) -> ParsedCorpus {
        let mut prices = ProductPrices::new();
        let mut stats = ParseStats::default();

        for mut block in segmenter::segment_corpus(corpus) {
            stats.blocks_seen += 1;
            block.date = self.resolver.resolve(&block.text);

            if !self.date_range.contains(block.date) {
                debug!(
                    "Receipt block #{} dated {:?} is outside the requested range, skipping",
                    block.index, block.date
                );
                stats.blocks_skipped_out_of_range += 1;
                continue;
            }

            let Some(date) = block.date else {
                debug!(
                    "Receipt block #{} has no resolvable date, skipping",
                    block.index
                );
                stats.blocks_skipped_no_date += 1;
                continue;
            };

            block.conversion_factor =
                currency::conversion_factor(&self.currency, block.date, &block.text);

            let lines = extract::extract_product_lines(&block.text);
            for line in &lines {
                prices
                    .entry(line.name.clone())
                    .or_default()
                    .insert(date, line.raw_price / block.conversion_factor);
            }

            stats.entries_extracted += lines.len();
            stats.blocks_parsed += 1;
            debug!(
                "Receipt block #{} ({}): {} product line(s)",
                block.index,
                date,
                lines.len()
            );
        }

        ParsedCorpus { prices, stats }
    }
}
