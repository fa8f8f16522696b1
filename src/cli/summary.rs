use super::ui;
use crate::core::config::Portfolio;
use crate::core::{AggregatedTotals, CurrencyCode, Valuation, ValuationAggregator};
use anyhow::Result;
use comfy_table::Cell;
use console::style;
use futures::future::join_all;

impl AggregatedTotals {
    pub fn display_as_table(&self, name: &str) -> String {
        let target = &self.target;

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Invested"),
            ui::header_cell("Value"),
            ui::header_cell("Rate"),
            ui::header_cell(&format!("Invested ({target})")),
            ui::header_cell(&format!("Value ({target})")),
            ui::header_cell("Status"),
        ]);

        for group in &self.groups {
            table.add_row(vec![
                Cell::new(group.currency.as_str()),
                ui::amount_cell(group.invested),
                ui::amount_cell(group.value),
                ui::format_optional_cell(group.rate, |r| format!("{r:.4}")),
                ui::amount_cell(group.converted_invested),
                ui::amount_cell(group.converted_value),
                ui::conversion_status_cell(group.converted),
            ]);
        }

        let mut output = format!(
            "Portfolio: {}\n\n",
            ui::style_text(name, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let value_style = if self.is_degraded() {
            ui::StyleType::Warning
        } else {
            ui::StyleType::TotalValue
        };
        output.push_str(&format!(
            "\n\nTotal Invested ({}): {}",
            ui::style_text(target.as_str(), ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_invested), ui::StyleType::TotalLabel)
        ));
        output.push_str(&format!(
            "\nTotal Value ({}): {}",
            ui::style_text(target.as_str(), ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_value), value_style)
        ));

        let mut returns = ui::new_styled_table();
        returns.set_header(vec![ui::header_cell("Return"), ui::header_cell("Return (%)")]);
        returns.add_row(vec![
            ui::amount_cell(self.total_return),
            ui::change_cell(self.total_return_percent),
        ]);
        output.push_str(&format!("\n\n{returns}"));

        for degraded in &self.degraded {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "{} shown unconverted: {}",
                        degraded.currency, degraded.reason
                    ),
                    ui::StyleType::Error
                )
            ));
        }

        output
    }
}

/// Aggregates each portfolio into `target` and prints one table per portfolio,
/// followed by a grand total when there is more than one.
///
/// Returns the grand total across all portfolios.
pub async fn run(
    portfolios: &[Portfolio],
    aggregator: &ValuationAggregator,
    default_currency: &CurrencyCode,
    target: &CurrencyCode,
) -> Result<AggregatedTotals> {
    let valuations = portfolios
        .iter()
        .map(|p| p.valuations(default_currency))
        .collect::<Result<Vec<Vec<Valuation>>>>()?;

    let pb = ui::new_progress_bar(portfolios.len() as u64);
    pb.set_message("Converting holdings...");

    let futures = valuations.iter().map(|portfolio_valuations| {
        let pb_clone = pb.clone();
        async move {
            let totals = aggregator.aggregate(portfolio_valuations, target).await;
            pb_clone.inc(1);
            totals
        }
    });
    let summaries = join_all(futures).await;
    pb.finish_and_clear();

    let num_summaries = summaries.len();
    for (i, (portfolio, totals)) in portfolios.iter().zip(&summaries).enumerate() {
        println!("{}", totals.display_as_table(&portfolio.name));
        if i + 1 < num_summaries {
            ui::print_separator();
        }
    }

    let grand = AggregatedTotals::merge(target.clone(), &summaries);

    if num_summaries > 1 {
        let term_width = console::Term::stdout()
            .size_checked()
            .map(|(_, w)| w as usize)
            .unwrap_or(80);
        println!("\n{}", "=".repeat(term_width));
        let total_str = format!(
            "Grand Total ({target}): {:.2} ({:+.2}%)",
            grand.total_value, grand.total_return_percent
        );
        let styled_total = if grand.is_degraded() {
            style(&total_str).bold().yellow()
        } else {
            style(&total_str).bold().green()
        };
        println!("{styled_total:>term_width$}");
    }

    Ok(grand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregation::{DegradedGroup, GroupTotals};

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::parse(c).unwrap()
    }

    fn totals(degraded: bool) -> AggregatedTotals {
        AggregatedTotals {
            target: code("USD"),
            total_invested: 300.0,
            total_value: 330.0,
            total_return: 30.0,
            total_return_percent: 10.0,
            groups: vec![
                GroupTotals {
                    currency: code("EUR"),
                    invested: 100.0,
                    value: 110.0,
                    converted_invested: 100.0,
                    converted_value: 110.0,
                    rate: if degraded { None } else { Some(1.0) },
                    converted: !degraded,
                },
                GroupTotals {
                    currency: code("USD"),
                    invested: 200.0,
                    value: 220.0,
                    converted_invested: 200.0,
                    converted_value: 220.0,
                    rate: Some(1.0),
                    converted: true,
                },
            ],
            degraded: if degraded {
                vec![DegradedGroup {
                    currency: code("EUR"),
                    reason: "Yahoo unavailable (HTTP 503): down".to_string(),
                }]
            } else {
                vec![]
            },
        }
    }

    #[test]
    fn test_display_lists_every_group_and_totals() {
        let output = totals(false).display_as_table("Brokerage");

        assert!(output.contains("Brokerage"));
        assert!(output.contains("EUR"));
        assert!(output.contains("Value (USD)"));
        assert!(output.contains("330.00"));
        assert!(output.contains("10.00%"));
        assert!(!output.contains("unconverted"));
    }

    #[test]
    fn test_display_marks_unconverted_groups() {
        let output = totals(true).display_as_table("Brokerage");

        assert!(output.contains("unconverted"));
        assert!(output.contains("EUR shown unconverted: Yahoo unavailable (HTTP 503): down"));
    }
}
