/*
[INPUT]:  String field values from decoded records
[OUTPUT]: Decimal values for numeric or currency-prefixed strings
[POS]:    Data layer - numeric coercion for record field access
[UPDATE]: When the accepted number/currency shapes change
*/

use rust_decimal::Decimal;
use std::str::FromStr;

/// Whether `value` looks like a plain or currency-prefixed number
///
/// Accepted shape: at most one leading character of any kind (a currency
/// sign or minus), optional whitespace, digits and thousands commas, at most
/// one `.`, then digits. `"$ 1,234.56"`, `"-5"` and `"฿ 1.2"` match; `"hello"`
/// and `"2015-01-01"` do not.
pub fn looks_numeric(value: &str) -> bool {
    if number_body_matches(value) {
        return true;
    }
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first != '\n' => number_body_matches(chars.as_str()),
        _ => false,
    }
}

fn number_body_matches(value: &str) -> bool {
    let rest = value.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == ',');
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    rest.chars().all(|c| c.is_ascii_digit())
}

/// Coerce a numeric-looking string to a decimal
///
/// Returns `None` when the string does not look numeric, or when what is
/// left after stripping currency signs and separators is not a number
/// (`""`, `"."`, values beyond decimal precision).
pub fn coerce_str(value: &str) -> Option<Decimal> {
    if !looks_numeric(value) {
        return None;
    }
    let digits: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&digits).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case("123456.789", "123456.789")]
    #[case("฿ 1.23456789", "1.23456789")]
    #[case("$ 1,234,567.89", "1234567.89")]
    #[case("£ 1,234,567.89", "1234567.89")]
    #[case("€ 1,234,567.89", "1234567.89")]
    #[case("1,234.56", "1234.56")]
    #[case("-5", "-5")]
    #[case("0.00000001", "0.00000001")]
    #[case("42", "42")]
    fn test_coerces_numbers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(coerce_str(input), Some(Decimal::from_str(expected).unwrap()));
    }

    #[rstest]
    #[case("hello")]
    #[case("test 123")]
    #[case("BTC-USD")]
    #[case("2015-01-01")]
    #[case("5d41402a-bc4b-2a76-b971-9d911017c592")]
    #[case("1.2.3")]
    fn test_leaves_text_alone(#[case] input: &str) {
        assert!(!looks_numeric(input));
        assert_eq!(coerce_str(input), None);
    }

    #[test]
    fn test_degenerate_matches_stay_text() {
        assert!(looks_numeric(""));
        assert_eq!(coerce_str(""), None);
        assert!(looks_numeric("."));
        assert_eq!(coerce_str("."), None);
        assert_eq!(coerce_str("$"), None);
    }
}
