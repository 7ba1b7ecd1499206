//! Number parsing and formatting for the `es-CL` locale.
//!
//! Chilean sources write `38.123,45` for 38123.45: `.` groups thousands and
//! `,` separates decimals.

use super::error::{DashboardError, Result};

/// Parses a locale-formatted decimal string such as `"38.123,45"`.
pub fn parse_locale_number(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if digits.is_empty() {
        return Err(DashboardError::Parse(format!(
            "empty numeric value: '{input}'"
        )));
    }
    if let Some(bad) = digits
        .chars()
        .find(|c| !c.is_ascii_digit() && *c != '.' && *c != ',')
    {
        return Err(DashboardError::Parse(format!(
            "unexpected character '{bad}' in numeric value: '{input}'"
        )));
    }
    if digits.matches(',').count() > 1 {
        return Err(DashboardError::Parse(format!(
            "more than one decimal separator in: '{input}'"
        )));
    }

    let normalized = digits.replace('.', "").replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|e| DashboardError::Parse(format!("invalid numeric value '{input}': {e}")))?;
    if !value.is_finite() {
        return Err(DashboardError::Parse(format!(
            "numeric value out of range: '{input}'"
        )));
    }

    Ok(if negative { -value } else { value })
}

/// Formats a number with `.` thousands separators and `,` decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Clp,
    Usd,
}

/// Formats a monetary amount. CLP carries no decimals, USD carries two.
pub fn format_currency(value: f64, currency: Currency) -> String {
    match currency {
        Currency::Clp => prefix_sign("$", &format_number(value, 0)),
        Currency::Usd => prefix_sign("US$", &format_number(value, 2)),
    }
}

fn prefix_sign(symbol: &str, number: &str) -> String {
    match number.strip_prefix('-') {
        Some(rest) => format!("-{symbol}{rest}"),
        None => format!("{symbol}{number}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thousands_and_decimals() {
        let value = parse_locale_number("38.123,45").unwrap();
        assert!((value - 38123.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_without_grouping() {
        assert!((parse_locale_number("950,12").unwrap() - 950.12).abs() < 1e-9);
        assert_eq!(parse_locale_number("1.000").unwrap(), 1000.0);
        assert_eq!(parse_locale_number(" 42 ").unwrap(), 42.0);
        assert_eq!(parse_locale_number("-3,5").unwrap(), -3.5);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["", "   ", "-", "abc", "12,34,56", "1e5", "12.3a", ","] {
            let result = parse_locale_number(input);
            assert!(
                matches!(result, Err(DashboardError::Parse(_))),
                "expected parse error for '{input}', got {result:?}"
            );
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(6500.0, 2), "6.500,00");
        assert_eq!(format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(0.171053, 6), "0,171053");
        assert_eq!(format_number(-1500.5, 1), "-1.500,5");
        assert_eq!(format_number(-0.001, 2), "0,00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(6500.0, Currency::Clp), "$6.500");
        assert_eq!(format_currency(38000.4, Currency::Clp), "$38.000");
        assert_eq!(format_currency(6.842105, Currency::Usd), "US$6,84");
        assert_eq!(format_currency(-12.5, Currency::Usd), "-US$12,50");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_formatted_numbers_parse_back(
                value in -1.0e12f64..1.0e12f64,
                decimals in 0usize..=6
            ) {
                let formatted = format_number(value, decimals);
                let parsed = parse_locale_number(&formatted).unwrap();
                let expected: f64 = format!("{:.*}", decimals, value).parse().unwrap();
                prop_assert!(
                    (parsed - expected).abs() <= 1e-9 * expected.abs().max(1.0),
                    "{formatted} parsed to {parsed}, expected {expected}"
                );
            }
        }
    }
}
