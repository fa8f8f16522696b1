use super::ui;
use crate::core::CurrencyCode;
use crate::store::{DEFAULT_USER, PreferenceStore};
use anyhow::Result;
use tracing::info;

/// The reporting currency: the stored preference, else the configured default.
pub async fn reporting_currency(
    store: &dyn PreferenceStore,
    configured: &CurrencyCode,
) -> CurrencyCode {
    store
        .preferred_currency(DEFAULT_USER)
        .await
        .unwrap_or_else(|| configured.clone())
}

/// Shows the reporting currency, or stores `code` as the new preference.
pub async fn run(
    store: &dyn PreferenceStore,
    configured: &CurrencyCode,
    code: Option<&str>,
) -> Result<CurrencyCode> {
    match code {
        Some(raw) => {
            let currency = CurrencyCode::parse(raw)?;
            store.set_preferred_currency(DEFAULT_USER, &currency).await?;
            info!("Preferred currency set to {}", currency);
            println!(
                "Preferred currency set to {}",
                ui::style_text(currency.as_str(), ui::StyleType::TotalValue)
            );
            Ok(currency)
        }
        None => {
            let current = reporting_currency(store, configured).await;
            let source = if &current == configured {
                "from config"
            } else {
                "preference"
            };
            println!(
                "Reporting currency: {} {}",
                ui::style_text(current.as_str(), ui::StyleType::TotalLabel),
                ui::style_text(&format!("({source})"), ui::StyleType::Subtle)
            );
            Ok(current)
        }
    }
}
