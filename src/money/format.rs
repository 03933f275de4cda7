//! Locale-aware amount formatting and parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::currency::{
    self, currency_info, locale_conventions, LocaleConventions, SymbolPosition,
    DEFAULT_DECIMALS, FALLBACK_CONVENTIONS,
};
use super::to_minor_units;
use crate::error::{EngineError, Result};

/// Which currency marker to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyDisplay {
    #[default]
    Symbol,
    Code,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub display: CurrencyDisplay,
    /// Print `$50` rather than `$50.00` when the minor part is zero.
    pub trim_zero_fraction: bool,
}

/// Resolved formatting rules for one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    code: String,
    symbol: String,
    decimals: u32,
    position: SymbolPosition,
    spaced: bool,
    conventions: LocaleConventions,
    /// False when the manual fallback separators are in use.
    localized: bool,
}

impl CurrencyFormat {
    pub fn for_currency(code: &str) -> Self {
        let code = currency::normalize_code(code);
        let Some(info) = currency_info(&code) else {
            warn!(currency = %code, "unknown currency, formatting with code and 2 decimals");
            return Self {
                symbol: code.clone(),
                code,
                decimals: DEFAULT_DECIMALS,
                position: SymbolPosition::Before,
                spaced: true,
                conventions: FALLBACK_CONVENTIONS,
                localized: false,
            };
        };

        let (conventions, localized) = match locale_conventions(info.locale) {
            Some(conventions) => (*conventions, true),
            None => {
                debug!(currency = %code, locale = info.locale, "no locale conventions, using manual formatter");
                (FALLBACK_CONVENTIONS, false)
            }
        };

        Self {
            code,
            symbol: info.symbol.to_string(),
            decimals: info.decimals,
            position: info.symbol_position,
            spaced: info.spaced,
            conventions,
            localized,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_localized(&self) -> bool {
        self.localized
    }

    /// Render `amount`, rounded to the currency's minor unit.
    pub fn format(&self, amount: Decimal, options: FormatOptions) -> Result<String> {
        let minor = to_minor_units(amount, &self.code)?;
        let negative = minor < 0;
        let minor = minor.unsigned_abs();
        let scale = 10u64.pow(self.decimals);
        let (whole, fraction) = (minor / scale, minor % scale);

        let mut number = group_digits(whole, self.conventions.group_separator);
        if self.decimals > 0 && !(options.trim_zero_fraction && fraction == 0) {
            number.push(self.conventions.decimal_separator);
            number.push_str(&format!("{:0width$}", fraction, width = self.decimals as usize));
        }

        let sign = if negative { "-" } else { "" };
        let (marker, spaced) = match options.display {
            CurrencyDisplay::Symbol => (self.symbol.as_str(), self.spaced),
            CurrencyDisplay::Code => (self.code.as_str(), true),
            CurrencyDisplay::None => return Ok(format!("{sign}{number}")),
        };
        let gap = if spaced { " " } else { "" };

        Ok(match self.position {
            SymbolPosition::Before => format!("{sign}{marker}{gap}{number}"),
            SymbolPosition::After => format!("{sign}{number}{gap}{marker}"),
        })
    }

    /// Parse text produced by [`CurrencyFormat::format`] (or typed by a user
    /// in the same locale) back into a major-unit amount.
    pub fn parse(&self, text: &str) -> Result<Decimal> {
        let invalid = || EngineError::Validation(format!("cannot parse '{text}' as a {} amount", self.code));

        let mut cleaned = text.replace(self.symbol.as_str(), "");
        cleaned = replace_ignore_case(&cleaned, &self.code);
        cleaned.retain(|c| !c.is_whitespace());

        let negative = cleaned.starts_with('-')
            || (cleaned.starts_with('(') && cleaned.ends_with(')'));
        let cleaned = cleaned.trim_matches(|c| c == '-' || c == '(' || c == ')');

        let digits = canonical_digits(
            cleaned,
            self.conventions.group_separator.trim(),
            self.conventions.decimal_separator,
        )
        .ok_or_else(invalid)?;

        let value = Decimal::from_str(&digits).map_err(|_| invalid())?;
        Ok(if negative { -value } else { value })
    }
}

/// Rewrite a locale amount as `1234.56`. Groups must be three digits after
/// the first, so text written for another locale is rejected, not misread.
fn canonical_digits(text: &str, group: &str, decimal: char) -> Option<String> {
    let (whole, fraction) = match text.split_once(decimal) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    let whole = if !group.is_empty() && whole.contains(group) {
        let mut groups = whole.split(group);
        let first = groups.next()?;
        if !all_digits(first) || first.len() > 3 {
            return None;
        }
        let mut joined = first.to_string();
        for g in groups {
            if g.len() != 3 || !all_digits(g) {
                return None;
            }
            joined.push_str(g);
        }
        joined
    } else if all_digits(whole) {
        whole.to_string()
    } else {
        return None;
    };

    match fraction {
        Some(f) if all_digits(f) => Some(format!("{whole}.{f}")),
        Some(_) => None,
        None => Some(whole),
    }
}

fn group_digits(value: u64, separator: &str) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }
    grouped
}

fn replace_ignore_case(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0;
    for (start, _) in lower.match_indices(&needle) {
        out.push_str(&haystack[rest..start]);
        rest = start + needle.len();
    }
    out.push_str(&haystack[rest..]);
    out
}

/// Format `amount` in `currency`.
pub fn format(amount: Decimal, currency: &str, options: FormatOptions) -> Result<String> {
    CurrencyFormat::for_currency(currency).format(amount, options)
}

/// Parse a formatted `currency` amount.
pub fn parse(text: &str, currency: &str) -> Result<Decimal> {
    CurrencyFormat::for_currency(currency).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fmt(amount: Decimal, currency: &str) -> String {
        format(amount, currency, FormatOptions::default()).unwrap()
    }

    // ==================== format tests ====================

    #[test]
    fn test_format_symbol_before() {
        assert_eq!(fmt(dec!(1234.5), "USD"), "$1,234.50");
        assert_eq!(fmt(dec!(0.5), "USD"), "$0.50");
        assert_eq!(fmt(dec!(-1234.5), "USD"), "-$1,234.50");
        assert_eq!(fmt(dec!(1234567.891), "MXN"), "$1,234,567.89");
    }

    #[test]
    fn test_format_symbol_after_with_locale_separators() {
        assert_eq!(fmt(dec!(1234.5), "EUR"), "1.234,50 €");
        assert_eq!(fmt(dec!(-9.99), "EUR"), "-9,99 €");
        assert_eq!(fmt(dec!(1500000), "HUF"), "1 500 000 Ft");
    }

    #[test]
    fn test_format_zero_decimal_currencies() {
        assert_eq!(fmt(dec!(1500), "JPY"), "¥1,500");
        assert_eq!(fmt(dec!(1500.6), "JPY"), "¥1,501");
        assert_eq!(fmt(dec!(250000), "IDR"), "Rp 250.000");
    }

    #[test]
    fn test_format_three_decimal_currency_uses_fallback() {
        let f = CurrencyFormat::for_currency("BHD");
        assert!(!f.is_localized());
        assert_eq!(f.decimals(), 3);
        assert_eq!(fmt(dec!(1234.5), "BHD"), "BD 1,234.500");
    }

    #[test]
    fn test_format_unknown_currency() {
        assert_eq!(fmt(dec!(12), "XTS"), "XTS 12.00");
    }

    #[test]
    fn test_format_options() {
        let code = FormatOptions {
            display: CurrencyDisplay::Code,
            ..FormatOptions::default()
        };
        assert_eq!(format(dec!(50), "USD", code).unwrap(), "USD 50.00");

        let bare = FormatOptions {
            display: CurrencyDisplay::None,
            trim_zero_fraction: true,
        };
        assert_eq!(format(dec!(50), "USD", bare).unwrap(), "50");
        assert_eq!(format(dec!(50.25), "USD", bare).unwrap(), "50.25");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0, ","), "0");
        assert_eq!(group_digits(999, ","), "999");
        assert_eq!(group_digits(1000, ","), "1,000");
        assert_eq!(group_digits(1234567, "."), "1.234.567");
    }

    // ==================== parse tests ====================

    #[test]
    fn test_parse_strips_symbol_and_groups() {
        assert_eq!(parse("$1,234.50", "USD").unwrap(), dec!(1234.50));
        assert_eq!(parse("USD 1,234.50", "USD").unwrap(), dec!(1234.50));
        assert_eq!(parse("-$12.00", "USD").unwrap(), dec!(-12));
        assert_eq!(parse("($12.00)", "USD").unwrap(), dec!(-12));
    }

    #[test]
    fn test_parse_comma_decimal_locale() {
        assert_eq!(parse("1.234,50 €", "EUR").unwrap(), dec!(1234.50));
        assert_eq!(parse("12,5", "EUR").unwrap(), dec!(12.5));
        assert_eq!(parse("1 500 000 Ft", "HUF").unwrap(), dec!(1500000));
        assert_eq!(parse("R$ 1.999,90", "BRL").unwrap(), dec!(1999.90));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("", "USD").is_err());
        assert!(parse("$abc", "USD").is_err());
        // Swedish groups with spaces, so a period has no meaning
        assert!(parse("12.50 kr", "SEK").is_err());
        // US-style text in a comma-decimal locale
        assert!(parse("1,234.50", "EUR").is_err());
        assert!(parse("R$ 1,999.90", "BRL").is_err());
        assert!(parse("1.23,4", "EUR").is_err());
        assert!(parse("1,2,3", "USD").is_err());
        assert!(parse("12,34,567.00", "USD").is_err());
    }

    #[test]
    fn test_parse_inverts_format() {
        for (amount, currency) in [
            (dec!(1234.56), "USD"),
            (dec!(98765.43), "EUR"),
            (dec!(1500), "JPY"),
            (dec!(12.345), "KWD"),
            (dec!(4200.10), "SEK"),
        ] {
            let text = fmt(amount, currency);
            assert_eq!(parse(&text, currency).unwrap(), amount, "{text}");
        }
    }
}
