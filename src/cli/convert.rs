use super::ui;
use crate::core::conversion::{ConversionResult, ConversionService};
use crate::core::parser::symbol_for;
use crate::core::CurrencyCode;
use anyhow::Result;

fn format_success(result: &ConversionResult) -> String {
    let rate_line = format!("1 {} = {:.6} {}", result.from, result.rate, result.to);
    match (result.amount, result.converted_amount) {
        (Some(amount), Some(converted)) => format!(
            "{}{amount:.2} {} → {}\n{}",
            symbol_for(&result.from),
            result.from,
            ui::style_text(
                &format!("{}{converted:.2} {}", symbol_for(&result.to), result.to),
                ui::StyleType::TotalValue
            ),
            ui::style_text(&rate_line, ui::StyleType::Subtle)
        ),
        _ => rate_line,
    }
}

/// Converts a single amount and prints the result.
///
/// A failed conversion is printed inline next to the unconverted source
/// amount and returned as an error.
pub async fn run(
    conversion: &ConversionService,
    from: &str,
    to: &str,
    amount: Option<f64>,
) -> Result<()> {
    match conversion.convert_str(from, to, amount).await {
        Ok(result) => {
            println!("{}", format_success(&result));
            Ok(())
        }
        Err(e) => {
            let source = match (CurrencyCode::parse(from), amount) {
                (Ok(code), Some(a)) => format!("{}{a:.2} {code}", symbol_for(&code)),
                (_, Some(a)) => format!("{a:.2} {from}"),
                (_, None) => from.to_string(),
            };
            println!(
                "{} {}",
                source,
                ui::style_text(&format!("(not converted: {e})"), ui::StyleType::Error)
            );
            Err(e.into())
        }
    }
}
