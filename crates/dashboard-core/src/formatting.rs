use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Number-formatting convention for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// `1.234,56`
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// `1,234.56`
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn thousands_separator(self) -> char {
        match self {
            Locale::PtBr => '.',
            Locale::EnUs => ',',
        }
    }

    pub fn decimal_separator(self) -> char {
        match self {
            Locale::PtBr => ',',
            Locale::EnUs => '.',
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::PtBr => f.write_str("pt-BR"),
            Locale::EnUs => f.write_str("en-US"),
        }
    }
}

impl FromStr for Locale {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(DashboardError::Config(format!("unknown locale: {other}"))),
        }
    }
}

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places, using the separators of `locale`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::{format_number, Locale};
///
/// assert_eq!(format_number(1234.5, 1, Locale::EnUs), "1,234.5");
/// assert_eq!(format_number(1234.5, 1, Locale::PtBr), "1.234,5");
/// assert_eq!(format_number(1234567.0, 0, Locale::PtBr), "1.234.567");
/// assert_eq!(format_number(-9876.5, 1, Locale::EnUs), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32, locale: Locale) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a few ULPs so exact binary midpoints such as 1.005 round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string(), locale.thousands_separator());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}{}", grouped, locale.decimal_separator(), &frac_str[2..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a distinct-count with thousands separators and no decimals.
///
/// ```
/// use dashboard_core::formatting::{format_count, Locale};
///
/// assert_eq!(format_count(15320, Locale::PtBr), "15.320");
/// assert_eq!(format_count(7, Locale::EnUs), "7");
/// ```
pub fn format_count(value: usize, locale: Locale) -> String {
    group_thousands(&value.to_string(), locale.thousands_separator())
}

/// Format a ratio or average with two decimals.
pub fn format_ratio(value: f64, locale: Locale) -> String {
    format_number(value, 2, locale)
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// ```
/// use dashboard_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert `sep` every three digits from the right of an integer string.
fn group_thousands(s: &str, sep: char) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(sep);
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0, Locale::PtBr), "0");
        assert_eq!(format_number(0.0, 2, Locale::PtBr), "0,00");
        assert_eq!(format_number(0.0, 2, Locale::EnUs), "0.00");
    }

    #[test]
    fn test_format_number_no_thousands() {
        assert_eq!(format_number(123.456, 2, Locale::EnUs), "123.46");
        assert_eq!(format_number(123.456, 2, Locale::PtBr), "123,46");
    }

    #[test]
    fn test_format_number_millions_pt_br() {
        assert_eq!(format_number(1_234_567.891, 2, Locale::PtBr), "1.234.567,89");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1, Locale::PtBr), "-9.876,5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2, Locale::EnUs), "0.00");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2, Locale::EnUs), "1.01");
    }

    #[test]
    fn test_format_number_carry_into_integer() {
        assert_eq!(format_number(999.999, 2, Locale::PtBr), "1.000,00");
    }

    // ── format_count / format_ratio ──────────────────────────────────────────

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0, Locale::PtBr), "0");
        assert_eq!(format_count(1_000, Locale::PtBr), "1.000");
        assert_eq!(format_count(1_234_567, Locale::EnUs), "1,234,567");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(1.5, Locale::PtBr), "1,50");
        assert_eq!(format_ratio(1.5, Locale::EnUs), "1.50");
    }

    // ── Locale ───────────────────────────────────────────────────────────────

    #[test]
    fn test_locale_parse() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("fr-FR".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_display_round_trips() {
        for locale in [Locale::PtBr, Locale::EnUs] {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-2, "percentage = {p}");
    }
}
