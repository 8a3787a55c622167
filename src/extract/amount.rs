//! Raw amount strings ("$2M", "Rs 5 crore", "1.2bn") to whole numbers.

use std::sync::LazyLock;

use regex::Regex;

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([a-z]*)").unwrap());

/// Currency markers that may precede the number.
const PREFIXES: [&str; 8] = ["usd", "inr", "rs.", "rs", "us$", "$", "₹", "€"];

/// Parses the first number in `raw` and applies a scale suffix.
///
/// Currency is ignored: the value is in whatever unit the source used.
/// Returns `None` when no leading number is found.
pub fn parse_amount(raw: &str) -> Option<u64> {
    let mut s = raw.to_lowercase().replace(',', "");
    s = s.trim().to_string();
    loop {
        let before = s.len();
        for prefix in PREFIXES {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.trim_start().to_string();
            }
        }
        if s.len() == before {
            break;
        }
    }

    let caps = AMOUNT.captures(&s)?;
    if caps.get(0)?.start() != 0 {
        return None;
    }

    let number: f64 = caps[1].parse().ok()?;
    let value = number * multiplier(&caps[2]) as f64;
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value.round() as u64)
}

fn multiplier(suffix: &str) -> u64 {
    match suffix {
        "k" | "thousand" => 1_000,
        "l" | "lac" | "lakh" | "lakhs" => 100_000,
        "m" | "mn" | "mm" | "million" | "millions" => 1_000_000,
        "cr" | "crore" | "crores" => 10_000_000,
        "b" | "bn" | "billion" | "billions" => 1_000_000_000,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_millions() {
        assert_eq!(parse_amount("$2M"), Some(2_000_000));
        assert_eq!(parse_amount("USD 3.5 million"), Some(3_500_000));
    }

    #[test]
    fn indian_units() {
        assert_eq!(parse_amount("5 crore"), Some(50_000_000));
        assert_eq!(parse_amount("Rs. 8 Cr"), Some(80_000_000));
        assert_eq!(parse_amount("₹40 lakh"), Some(4_000_000));
    }

    #[test]
    fn billions_and_plain_numbers() {
        assert_eq!(parse_amount("1.5bn"), Some(1_500_000_000));
        assert_eq!(parse_amount("2,50,000"), Some(250_000));
        assert_eq!(parse_amount("500k"), Some(500_000));
    }

    #[test]
    fn unknown_suffix_counts_as_units() {
        assert_eq!(parse_amount("12 units"), Some(12));
    }

    #[test]
    fn not_an_amount() {
        assert_eq!(parse_amount("undisclosed"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("about $2M"), None);
    }
}
