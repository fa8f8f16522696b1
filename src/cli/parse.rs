use super::ui;
use crate::core::{CurrencyAmountParser, CurrencyCode, ParsedAmount};
use anyhow::Result;

fn describe(parsed: &ParsedAmount) -> String {
    format!(
        "{} {} ({}{:.2})",
        ui::style_text(parsed.currency.as_str(), ui::StyleType::TotalLabel),
        parsed.amount,
        parsed.symbol,
        parsed.amount
    )
}

/// Parses free text, using `preferred` for bare amounts.
pub fn run(text: &str, preferred: &CurrencyCode) -> Result<ParsedAmount> {
    let parsed = CurrencyAmountParser::parse_or_error(text, preferred)?;
    println!("{}", describe(&parsed));
    Ok(parsed)
}
