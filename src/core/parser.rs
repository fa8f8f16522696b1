//! Reads amounts such as `USD 100`, `eur12.50` or a bare `100` from free text.

use crate::core::currency::CurrencyCode;
use crate::core::error::ParseError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Supported currencies in match priority order: `(code, display symbol)`.
pub const SUPPORTED_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("INR", "₹"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("AUD", "A$"),
    ("CAD", "C$"),
    ("CHF", "CHF"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
    ("NZD", "NZ$"),
    ("SEK", "kr"),
    ("ZAR", "R"),
];

const EXPECTED_FORMATS: &str = "'<CODE> <amount>' (e.g. 'USD 100.00'), '<amount>' (e.g. '100'), or '<CODE>' (e.g. 'EUR')";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub amount: f64,
    pub currency: CurrencyCode,
    pub symbol: String,
}

struct CurrencyPattern {
    matcher: Regex,
    code: &'static str,
    symbol: &'static str,
}

static PATTERNS: LazyLock<Vec<CurrencyPattern>> = LazyLock::new(|| {
    SUPPORTED_CURRENCIES
        .iter()
        .map(|&(code, symbol)| CurrencyPattern {
            matcher: Regex::new(&format!(r"(?i)^{code}\s*(\d+(?:\.\d{{2}})?)$"))
                .expect("Invalid currency pattern"),
            code,
            symbol,
        })
        .collect()
});

static BARE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("Invalid decimal pattern"));

/// Display symbol for a currency, or the code itself when it has none.
pub fn symbol_for(code: &CurrencyCode) -> String {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|(c, _)| *c == code.as_str())
        .map_or_else(|| code.to_string(), |(_, symbol)| symbol.to_string())
}

/// Stateless; all behavior comes from [`SUPPORTED_CURRENCIES`].
pub struct CurrencyAmountParser;

impl CurrencyAmountParser {
    /// Tries, in order: a supported code followed by an amount, a bare amount
    /// tagged with `preferred`, and a lone supported code (amount zero).
    pub fn parse(text: &str, preferred: &CurrencyCode) -> Option<ParsedAmount> {
        let trimmed = text.trim();

        for pattern in PATTERNS.iter() {
            if let Some(caps) = pattern.matcher.captures(trimmed) {
                let amount = caps.get(1)?.as_str().parse::<f64>().ok()?;
                return Some(ParsedAmount {
                    amount,
                    currency: CurrencyCode::parse(pattern.code).ok()?,
                    symbol: pattern.symbol.to_string(),
                });
            }
        }

        if BARE_DECIMAL.is_match(trimmed) {
            let amount = trimmed.parse::<f64>().ok()?;
            return Some(ParsedAmount {
                amount,
                currency: preferred.clone(),
                symbol: symbol_for(preferred),
            });
        }

        let upper = trimmed.to_uppercase();
        SUPPORTED_CURRENCIES
            .iter()
            .find(|(code, _)| *code == upper)
            .and_then(|(code, symbol)| {
                Some(ParsedAmount {
                    amount: 0.0,
                    currency: CurrencyCode::parse(code).ok()?,
                    symbol: symbol.to_string(),
                })
            })
    }

    /// [`CurrencyAmountParser::parse`] with a descriptive error for unreadable input.
    pub fn parse_or_error(
        text: &str,
        preferred: &CurrencyCode,
    ) -> Result<ParsedAmount, ParseError> {
        Self::parse(text, preferred).ok_or_else(|| ParseError {
            input: text.to_string(),
            hint: EXPECTED_FORMATS.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::parse(c).unwrap()
    }

    #[test]
    fn test_code_prefixed_amount() {
        let parsed = CurrencyAmountParser::parse("USD 100.00", &code("INR")).unwrap();
        assert_eq!(parsed.amount, 100.0);
        assert_eq!(parsed.currency, code("USD"));
        assert_eq!(parsed.symbol, "$");
    }

    #[test]
    fn test_code_prefix_is_case_insensitive_and_spacing_optional() {
        let parsed = CurrencyAmountParser::parse("eur12.50", &code("USD")).unwrap();
        assert_eq!(parsed.amount, 12.5);
        assert_eq!(parsed.currency, code("EUR"));
        assert_eq!(parsed.symbol, "€");

        let parsed = CurrencyAmountParser::parse("  gbp   7 ", &code("USD")).unwrap();
        assert_eq!(parsed.amount, 7.0);
        assert_eq!(parsed.currency, code("GBP"));
    }

    #[test]
    fn test_code_prefix_requires_zero_or_two_fraction_digits() {
        assert!(CurrencyAmountParser::parse("USD 100.5", &code("USD")).is_none());
        assert!(CurrencyAmountParser::parse("USD 100.505", &code("USD")).is_none());
        assert!(CurrencyAmountParser::parse("USD 100.", &code("USD")).is_none());
    }

    #[test]
    fn test_bare_amount_uses_preferred_currency() {
        let parsed = CurrencyAmountParser::parse("100", &code("INR")).unwrap();
        assert_eq!(parsed.amount, 100.0);
        assert_eq!(parsed.currency, code("INR"));
        assert_eq!(parsed.symbol, "₹");

        let parsed = CurrencyAmountParser::parse("12.345", &code("EUR")).unwrap();
        assert_eq!(parsed.amount, 12.345);
        assert_eq!(parsed.currency, code("EUR"));
    }

    #[test]
    fn test_bare_amount_with_unlisted_preferred_currency() {
        let parsed = CurrencyAmountParser::parse("5", &code("BRL")).unwrap();
        assert_eq!(parsed.currency, code("BRL"));
        assert_eq!(parsed.symbol, "BRL");
    }

    #[test]
    fn test_lone_code_yields_zero_amount() {
        let parsed = CurrencyAmountParser::parse(" jpy ", &code("USD")).unwrap();
        assert_eq!(parsed.amount, 0.0);
        assert_eq!(parsed.currency, code("JPY"));
        assert_eq!(parsed.symbol, "¥");
    }

    #[test]
    fn test_unrecognized_input() {
        for input in ["xyz", "", "BRL 100", "USD -5", "inf", "NaN", "1e5", "100 USD"] {
            assert!(
                CurrencyAmountParser::parse(input, &code("USD")).is_none(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_error_carries_hint() {
        let err = CurrencyAmountParser::parse_or_error("xyz", &code("USD")).unwrap_err();
        assert_eq!(err.input, "xyz");
        assert!(err.to_string().contains("USD 100.00"));
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(symbol_for(&code("INR")), "₹");
        assert_eq!(symbol_for(&code("XAU")), "XAU");
    }
}
