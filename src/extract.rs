//! Per-line product and price extraction. Receipt lines are noisy: totals,
//! payment records, coupons and register markers interleave with product
//! lines, and weighed products print their computed total on the product line
//! while the authoritative unit price sits on the line above.

use regex::Regex;
use std::sync::OnceLock;

/// A line containing any of these markers is discarded before pattern
/// matching (totals, payments, coupons, separator rules, register metadata).
pub const NOISE_MARKERS: [&str; 13] = [
    "#Lidl Plus купон",
    "#Акция",
    "ОТСТЪПКИ",
    "МЕЖДИННА СУМА",
    "ОБЩА СУМА",
    "В БРОЙ",
    "КРЕДИТНА/ДЕБИТНА",
    "РЕСТО",
    "-----",
    "Ти спести",
    "#Ном:",
    "#Z-отчет:",
    "#Каса:",
];

/// Second-pass blocklist applied to the matched product name (uppercased).
/// Catches total/payment/register synonyms that survive the line filter
/// because the line happens to fit the product pattern.
pub const NAME_BLOCKLIST: [&str; 24] = [
    "ОБЩА",
    "ОБЩО",
    "ПЛАТЕНО",
    "СУМА",
    "TOTAL",
    "PAID",
    "НАЛИЧНОСТ",
    "МЕЖДИННА",
    "ОТСТЪПКИ",
    "DISCOUNT",
    "БАНКОВА",
    "КАРТА",
    "ВАУЧЕР",
    "VOUCHER",
    "СДАЧА",
    "CHANGE",
    "РЕСТО",
    "В БРОЙ",
    "НОМ:",
    "Z-ОТЧЕТ",
    "КАСА:",
    "КАСИЕР:",
    "АРТИКУЛА",
    "КОПИЕ",
];

const MIN_NAME_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLine {
    /// Normalized product name, used verbatim as the matching key downstream.
    pub name: String,
    /// Price before currency conversion. Already replaced by the preceding
    /// quantity line's unit price when one was present.
    pub raw_price: f64,
    pub line_index: usize,
}

fn product_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^([А-ЯA-Z][А-Яа-яA-Z0-9%\s.,'"()/-]+?)\s{2,}(\d+[.,]\d{2})\s*[BDлв]*\s*$"#)
            .expect("invalid product line regex")
    })
}

fn quantity_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+[.,]\d+)\s*[xх]\s*(\d+[.,]\d{2})").expect("invalid quantity line regex")
    })
}

/// Parses a receipt decimal, accepting both comma and dot separators.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// Extracts (product, raw price) pairs from one receipt block, in line order.
/// Unrecognized and noise lines are skipped, never an error.
pub fn extract_product_lines(text: &str) -> Vec<ExtractedLine> {
    let lines: Vec<&str> = text.lines().collect();
    let mut extracted = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if is_noise_line(line) {
            continue;
        }

        let Some(caps) = product_line_re().captures(line.trim()) else {
            continue;
        };

        let name = caps[1].trim().to_string();
        let Some(line_price) = parse_decimal(&caps[2]) else {
            continue;
        };

        if is_blocklisted_name(&name) {
            continue;
        }
        if name.chars().count() < MIN_NAME_CHARS {
            continue;
        }
        if is_quantity_name(&name) {
            continue;
        }

        let raw_price = resolve_unit_price(&lines, index, line_price);
        extracted.push(ExtractedLine {
            name,
            raw_price,
            line_index: index,
        });
    }

    extracted
}

pub fn is_noise_line(line: &str) -> bool {
    NOISE_MARKERS.iter().any(|marker| line.contains(marker))
}

fn is_blocklisted_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    NAME_BLOCKLIST.iter().any(|keyword| upper.contains(keyword))
}

/// Names carrying a multiplication mark belong to quantity lines, not
/// products.
fn is_quantity_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains('x') || lower.contains('х')
}

/// Weighed and multi-unit products print `<quantity> x <unit price>` on the
/// line immediately above the product line; when present, that unit price
/// supersedes the line's own total. Applies to every product line.
pub fn resolve_unit_price(lines: &[&str], index: usize, line_price: f64) -> f64 {
    if index == 0 {
        return line_price;
    }
    let Some(caps) = quantity_line_re().captures(lines[index - 1].trim()) else {
        return line_price;
    };
    parse_decimal(&caps[2]).unwrap_or(line_price)
}
