//! Per-currency and per-locale formatting data.

use serde::Serialize;

/// Where the currency marker sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Before,
    After,
}

/// Static facts about one ISO-4217 currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    /// Minor-unit exponent: 0, 2 or 3.
    pub decimals: u32,
    /// Locale whose separators the currency is rendered with.
    pub locale: &'static str,
    pub symbol_position: SymbolPosition,
    /// Space between marker and number.
    pub spaced: bool,
}

/// Digit grouping and decimal separators for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConventions {
    pub locale: &'static str,
    pub group_separator: &'static str,
    pub decimal_separator: char,
}

const fn currency(
    code: &'static str,
    symbol: &'static str,
    decimals: u32,
    locale: &'static str,
    symbol_position: SymbolPosition,
    spaced: bool,
) -> CurrencyInfo {
    CurrencyInfo {
        code,
        symbol,
        decimals,
        locale,
        symbol_position,
        spaced,
    }
}

use SymbolPosition::{After, Before};

const CURRENCIES: &[CurrencyInfo] = &[
    currency("USD", "$", 2, "en-US", Before, false),
    currency("EUR", "€", 2, "de-DE", After, true),
    currency("GBP", "£", 2, "en-GB", Before, false),
    currency("CAD", "CA$", 2, "en-CA", Before, false),
    currency("AUD", "A$", 2, "en-AU", Before, false),
    currency("NZD", "NZ$", 2, "en-NZ", Before, false),
    currency("MXN", "$", 2, "es-MX", Before, false),
    currency("BRL", "R$", 2, "pt-BR", Before, true),
    currency("CHF", "CHF", 2, "de-CH", Before, true),
    currency("SEK", "kr", 2, "sv-SE", After, true),
    currency("THB", "฿", 2, "th-TH", Before, false),
    currency("JPY", "¥", 0, "ja-JP", Before, false),
    currency("KRW", "₩", 0, "ko-KR", Before, false),
    currency("IDR", "Rp", 0, "id-ID", Before, true),
    currency("HUF", "Ft", 0, "hu-HU", After, true),
    currency("BHD", "BD", 3, "ar-BH", Before, true),
    currency("KWD", "KD", 3, "ar-KW", Before, true),
    currency("OMR", "OMR", 3, "ar-OM", Before, true),
];

const LOCALES: &[LocaleConventions] = &[
    LocaleConventions { locale: "en-US", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "en-GB", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "en-CA", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "en-AU", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "en-NZ", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "es-MX", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "de-DE", group_separator: ".", decimal_separator: ',' },
    LocaleConventions { locale: "pt-BR", group_separator: ".", decimal_separator: ',' },
    LocaleConventions { locale: "de-CH", group_separator: "’", decimal_separator: '.' },
    LocaleConventions { locale: "sv-SE", group_separator: " ", decimal_separator: ',' },
    LocaleConventions { locale: "th-TH", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "ja-JP", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "ko-KR", group_separator: ",", decimal_separator: '.' },
    LocaleConventions { locale: "id-ID", group_separator: ".", decimal_separator: ',' },
    LocaleConventions { locale: "hu-HU", group_separator: " ", decimal_separator: ',' },
];

/// Separators used when a currency's locale has no conventions on file.
pub const FALLBACK_CONVENTIONS: LocaleConventions = LocaleConventions {
    locale: "und",
    group_separator: ",",
    decimal_separator: '.',
};

/// Minor-unit exponent assumed for currencies not in the table.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Canonical upper-case form of a currency code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    let code = normalize_code(code);
    CURRENCIES.iter().find(|c| c.code == code)
}

pub fn locale_conventions(locale: &str) -> Option<&'static LocaleConventions> {
    LOCALES.iter().find(|l| l.locale.eq_ignore_ascii_case(locale))
}

/// Decimal places for `code`: 0 (JPY, IDR, HUF...), 3 (BHD, KWD, OMR) or 2.
pub fn get_decimal_places(code: &str) -> u32 {
    currency_info(code).map_or(DEFAULT_DECIMALS, |c| c.decimals)
}

/// Whether `code` looks like an ISO-4217 code (three ASCII letters).
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}
