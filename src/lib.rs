//! # Receipt Price History
//!
//! A library for converting raw retail receipt text (captured from a personal
//! purchase-history account) into a normalized, date-indexed product price
//! table with derived trend analytics.
//!
//! ## Core Concepts
//!
//! - **Corpus**: one UTF-8 text file of receipt blocks, delimited by a fixed
//!   literal marker written by the acquisition layer
//! - **Receipt block**: the text of one purchase transaction; its date is
//!   resolved through an ordered chain of patterns
//! - **Reporting currency**: every stored price is normalized to EUR; legacy
//!   BGN prices are converted at the fixed peg rate around the
//!   redenomination cutover
//! - **Retained product**: a product observed on at least two distinct
//!   dates, eligible for the price table and trend rankings
//!
//! The acquisition layer (browser automation), GUI shell, and
//! spreadsheet/chart renderers are external collaborators: this crate
//! consumes text and produces serializable structures.
//!
//! ## Example
//!
//! ```rust,ignore
//! use receipt_price_history::*;
//!
//! let analysis = analyze_files(&[
//!     "lidl_receipts_20260113.txt".into(),
//!     "lidl_receipts_20260201.txt".into(),
//! ]);
//!
//! for trend in analysis.trends.top_movers(10) {
//!     println!("{}: {:+.1}%", trend.product, trend.percent_change.unwrap());
//! }
//! ```

pub mod aggregate;
pub mod currency;
pub mod dates;
pub mod error;
pub mod extract;
pub mod ingestion;
pub mod parser;
pub mod schema;
pub mod segmenter;
pub mod table;
pub mod trends;

pub use aggregate::{merge_price_maps, AggregatedPrices, PricePoint};
pub use dates::{DatePattern, DateResolver, MONTH_NAMES, PATTERN_PRIORITY};
pub use error::{ReceiptHistoryError, Result};
pub use ingestion::{read_corpora, read_corpus, FailedFile};
pub use parser::{ParseStats, ParsedCorpus, ProductPrices, ReceiptParser};
pub use schema::*;
pub use segmenter::{segment_corpus, ReceiptBlock, RECEIPT_DELIMITER};
pub use table::{PriceHistoryTable, ProductPriceSeries};
pub use trends::{ProductTrend, TrendSummary};

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Counts and failures for one analysis run, suitable for a user-facing
/// summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub files_processed: usize,
    pub failed_files: Vec<FailedFile>,
    pub stats: ParseStats,
    /// Distinct products observed before the retention filter.
    pub products_observed: usize,
    pub products_retained: usize,
    /// Products dropped for appearing on fewer than two distinct dates.
    pub products_dropped_single: usize,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceAnalysis {
    pub table: PriceHistoryTable,
    pub trends: TrendSummary,
    pub report: RunReport,
}

impl PriceAnalysis {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PriceAnalysis)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

pub struct ReceiptHistoryProcessor {
    parser: ReceiptParser,
}

impl ReceiptHistoryProcessor {
    pub fn new(options: AnalyzerOptions) -> Result<Self> {
        validate_options(&options)?;
        Ok(Self {
            parser: ReceiptParser::new(&options),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            parser: ReceiptParser::new(&AnalyzerOptions::default()),
        }
    }

    /// Runs the full pipeline over a batch of corpus files. An unreadable
    /// file fails alone: it is recorded in the report and the rest of the
    /// batch still processes.
    pub fn process_files(&self, paths: &[PathBuf]) -> PriceAnalysis {
        let (loaded, failed) = read_corpora(paths);

        let parsed: Vec<ParsedCorpus> = loaded
            .iter()
            .map(|(path, corpus)| {
                let result = self.parser.parse_corpus(corpus);
                debug!(
                    "{}: {} block(s), {} entr(ies)",
                    path.display(),
                    result.stats.blocks_seen,
                    result.stats.entries_extracted
                );
                result
            })
            .collect();

        self.assemble(parsed, loaded.len(), failed)
    }

    /// Same pipeline over in-memory corpora; no I/O failures are possible.
    pub fn process_corpora<S: AsRef<str>>(&self, corpora: &[S]) -> PriceAnalysis {
        let parsed: Vec<ParsedCorpus> = corpora
            .iter()
            .map(|corpus| self.parser.parse_corpus(corpus.as_ref()))
            .collect();
        self.assemble(parsed, corpora.len(), Vec::new())
    }

    fn assemble(
        &self,
        parsed: Vec<ParsedCorpus>,
        files_processed: usize,
        failed_files: Vec<FailedFile>,
    ) -> PriceAnalysis {
        let mut stats = ParseStats::default();
        for corpus in &parsed {
            stats.absorb(&corpus.stats);
        }

        let maps: Vec<ProductPrices> = parsed.into_iter().map(|corpus| corpus.prices).collect();
        let aggregated = merge_price_maps(&maps);
        let products_observed = aggregated.len();

        let table = PriceHistoryTable::build(&aggregated);
        let trends = TrendSummary::build(&table);

        let report = RunReport {
            files_processed,
            failed_files,
            products_observed,
            products_retained: table.len(),
            products_dropped_single: products_observed - table.len(),
            stats,
        };

        info!(
            "Analyzed {} file(s) ({} failed): {} block(s) parsed, {} skipped; {} of {} product(s) retained",
            report.files_processed,
            report.failed_files.len(),
            report.stats.blocks_parsed,
            report.stats.blocks_skipped(),
            report.products_retained,
            report.products_observed
        );

        PriceAnalysis {
            table,
            trends,
            report,
        }
    }
}

/// Convenience wrapper: default policies, batch of files.
pub fn analyze_files(paths: &[PathBuf]) -> PriceAnalysis {
    ReceiptHistoryProcessor::with_defaults().process_files(paths)
}

/// Convenience wrapper: default policies, in-memory corpora.
pub fn analyze_corpora<S: AsRef<str>>(corpora: &[S]) -> PriceAnalysis {
    ReceiptHistoryProcessor::with_defaults().process_corpora(corpora)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS_A: &str = "\
КАСОВИ БЕЛЕЖКИ ОТ LIDL.BG
Общо бележки: 2

БЕЛЕЖКА #1
Страница: 1

МЛЯКО 3.2%    1,02
БАНАНИ    2,05
ОБЩА СУМА    3,07
10.01.2026 09:30:00

БЕЛЕЖКА #2
Страница: 1

МЛЯКО 3.2%    1,08
20.01.2026 18:45:12
";

    const CORPUS_B: &str = "\
БЕЛЕЖКА #1

БАНАНИ    2,15
25.01.2026 12:00:00
";

    #[test]
    fn test_process_corpora_end_to_end() {
        let analysis = analyze_corpora(&[CORPUS_A, CORPUS_B]);

        assert_eq!(analysis.report.files_processed, 2);
        assert!(analysis.report.failed_files.is_empty());
        assert_eq!(analysis.report.stats.blocks_seen, 3);
        assert_eq!(analysis.report.stats.blocks_parsed, 3);
        assert_eq!(analysis.report.products_observed, 2);
        assert_eq!(analysis.report.products_retained, 2);
        assert_eq!(analysis.report.products_dropped_single, 0);

        let milk = analysis.table.products.get("МЛЯКО 3.2%").unwrap();
        assert_eq!(milk.len(), 2);
        let bananas = analysis.table.products.get("БАНАНИ").unwrap();
        assert_eq!(bananas.len(), 2);
    }

    #[test]
    fn test_single_occurrence_product_is_dropped_and_counted() {
        let corpus = "\
БЕЛЕЖКА #1
МЛЯКО    1,02
САМОТЕН ПРОДУКТ    9,99
10.01.2026 09:30:00

БЕЛЕЖКА #2
МЛЯКО    1,08
20.01.2026 18:45:12
";
        let analysis = analyze_corpora(&[corpus]);
        assert_eq!(analysis.report.products_observed, 2);
        assert_eq!(analysis.report.products_retained, 1);
        assert_eq!(analysis.report.products_dropped_single, 1);
        assert!(!analysis.table.products.contains_key("САМОТЕН ПРОДУКТ"));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut options = AnalyzerOptions::default();
        options.currency.peg_rate = -1.0;
        assert!(ReceiptHistoryProcessor::new(options).is_err());
    }

    #[test]
    fn test_analysis_serializes() {
        let analysis = analyze_corpora(&[CORPUS_A]);
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("МЛЯКО 3.2%"));

        let schema_json = PriceAnalysis::schema_as_json().unwrap();
        assert!(schema_json.contains("percent_change"));
    }
}
