use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Literal marker the acquisition layer writes at the start of each receipt
/// body. Everything before the first occurrence is corpus-level header.
pub const RECEIPT_DELIMITER: &str = "БЕЛЕЖКА #";

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptBlock {
    /// 1-based ordinal in corpus order.
    pub index: usize,
    /// Purchase-history page the block was captured from, when labeled.
    pub page: Option<u32>,
    pub text: String,
    /// Resolved calendar date; None when no date pattern matched.
    pub date: Option<NaiveDate>,
    /// Divisor applied to every raw price in this block to reach the
    /// reporting currency.
    pub conversion_factor: f64,
}

fn page_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Страница:\s*(\d+)").expect("invalid page label regex"))
}

/// Splits one corpus into receipt blocks. A corpus without any delimiter
/// yields zero blocks.
pub fn segment_corpus(corpus: &str) -> Vec<ReceiptBlock> {
    corpus
        .split(RECEIPT_DELIMITER)
        .skip(1)
        .enumerate()
        .map(|(i, segment)| ReceiptBlock {
            index: i + 1,
            page: page_label(segment),
            text: segment.to_string(),
            date: None,
            conversion_factor: 1.0,
        })
        .collect()
}

fn page_label(text: &str) -> Option<u32> {
    page_label_re()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}
