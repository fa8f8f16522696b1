//! Folds holdings denominated in many currencies into one set of portfolio totals.
use crate::core::conversion::ConversionService;
use crate::core::currency::CurrencyCode;
use crate::core::error::ConversionError;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A single holding as reported by the asset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// `0.0` means the cost basis is not tracked.
    pub cost_basis: f64,
    pub current_value: f64,
    pub currency: CurrencyCode,
}

impl Valuation {
    pub fn new(cost_basis: f64, current_value: f64, currency: CurrencyCode) -> Self {
        Self {
            cost_basis,
            current_value,
            currency,
        }
    }
}

/// Per-currency subtotal, before and after conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub currency: CurrencyCode,
    pub invested: f64,
    pub value: f64,
    pub converted_invested: f64,
    pub converted_value: f64,
    /// Rate applied to `value`. On a cold cache the invested conversion may
    /// have been fetched separately, at a different quote. `None` when the
    /// group is unconverted, or when merged parts used different rates.
    pub rate: Option<f64>,
    /// `false` when the raw figures were used because conversion failed.
    pub converted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedGroup {
    pub currency: CurrencyCode,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTotals {
    pub target: CurrencyCode,
    pub total_invested: f64,
    pub total_value: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
    pub groups: Vec<GroupTotals>,
    pub degraded: Vec<DegradedGroup>,
}

impl AggregatedTotals {
    fn from_groups(
        target: CurrencyCode,
        groups: Vec<GroupTotals>,
        degraded: Vec<DegradedGroup>,
    ) -> Self {
        let total_invested: f64 = groups.iter().map(|g| g.converted_invested).sum();
        let total_value: f64 = groups.iter().map(|g| g.converted_value).sum();
        let total_return = total_value - total_invested;
        let total_return_percent = if total_invested == 0.0 {
            0.0
        } else {
            100.0 * total_return / total_invested
        };
        AggregatedTotals {
            target,
            total_invested,
            total_value,
            total_return,
            total_return_percent,
            groups,
            degraded,
        }
    }

    /// Sums totals already expressed in `target` without converting again.
    ///
    /// Groups of the same currency are added up; a group stays converted only
    /// if it was converted in every part.
    pub fn merge(target: CurrencyCode, parts: &[AggregatedTotals]) -> Self {
        let mut groups: BTreeMap<CurrencyCode, GroupTotals> = BTreeMap::new();
        let mut degraded: BTreeMap<CurrencyCode, DegradedGroup> = BTreeMap::new();

        for part in parts {
            for group in &part.groups {
                groups
                    .entry(group.currency.clone())
                    .and_modify(|merged| {
                        merged.invested += group.invested;
                        merged.value += group.value;
                        merged.converted_invested += group.converted_invested;
                        merged.converted_value += group.converted_value;
                        merged.converted &= group.converted;
                        if merged.rate != group.rate {
                            merged.rate = None;
                        }
                    })
                    .or_insert_with(|| group.clone());
            }
            for failure in &part.degraded {
                degraded
                    .entry(failure.currency.clone())
                    .or_insert_with(|| failure.clone());
            }
        }

        Self::from_groups(
            target,
            groups.into_values().collect(),
            degraded.into_values().collect(),
        )
    }

    /// True when at least one currency group is reported unconverted.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[derive(Default)]
struct RawGroup {
    invested: f64,
    value: f64,
}

/// Groups valuations by currency and converts each group with at most two
/// conversions (invested and value), whatever the number of holdings.
#[derive(Clone)]
pub struct ValuationAggregator {
    conversion: ConversionService,
}

impl ValuationAggregator {
    pub fn new(conversion: ConversionService) -> Self {
        Self { conversion }
    }

    /// Aggregates `valuations` into `target`.
    ///
    /// Never fails: a group whose conversion fails contributes its raw,
    /// unconverted figures and is listed in [`AggregatedTotals::degraded`].
    pub async fn aggregate(
        &self,
        valuations: &[Valuation],
        target: &CurrencyCode,
    ) -> AggregatedTotals {
        let mut raw_groups: BTreeMap<CurrencyCode, RawGroup> = BTreeMap::new();
        for valuation in valuations {
            let group = raw_groups.entry(valuation.currency.clone()).or_default();
            if valuation.cost_basis > 0.0 {
                group.invested += valuation.cost_basis;
            }
            group.value += valuation.current_value;
        }
        debug!(
            "Aggregating {} valuations in {} currency groups into {}",
            valuations.len(),
            raw_groups.len(),
            target
        );

        let conversions = raw_groups
            .into_iter()
            .map(|(currency, raw)| self.convert_group(currency, raw, target));
        let results = join_all(conversions).await;

        let mut groups = Vec::with_capacity(results.len());
        let mut degraded = Vec::new();
        for (group, failure) in results {
            if let Some(reason) = failure {
                degraded.push(DegradedGroup {
                    currency: group.currency.clone(),
                    reason,
                });
            }
            groups.push(group);
        }

        AggregatedTotals::from_groups(target.clone(), groups, degraded)
    }

    async fn convert_group(
        &self,
        currency: CurrencyCode,
        raw: RawGroup,
        target: &CurrencyCode,
    ) -> (GroupTotals, Option<String>) {
        if &currency == target {
            return (
                GroupTotals {
                    currency,
                    invested: raw.invested,
                    value: raw.value,
                    converted_invested: raw.invested,
                    converted_value: raw.value,
                    rate: Some(1.0),
                    converted: true,
                },
                None,
            );
        }

        let invested = async {
            if raw.invested > 0.0 {
                self.conversion
                    .convert(&currency, target, Some(raw.invested))
                    .await
                    .map(|r| (r.converted_amount.unwrap_or(0.0), Some(r.rate)))
            } else {
                Ok((0.0, None))
            }
        };
        let value = self.conversion.convert(&currency, target, Some(raw.value));
        let (invested, value) = futures::join!(invested, value);

        match (invested, value) {
            (Ok((converted_invested, _)), Ok(value)) => (
                GroupTotals {
                    currency,
                    invested: raw.invested,
                    value: raw.value,
                    converted_invested,
                    converted_value: value.converted_amount.unwrap_or(0.0),
                    rate: Some(value.rate),
                    converted: true,
                },
                None,
            ),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    error = %e,
                    "Using unconverted {} figures in {} totals", currency, target
                );
                (
                    GroupTotals {
                        currency,
                        invested: raw.invested,
                        value: raw.value,
                        converted_invested: raw.invested,
                        converted_value: raw.value,
                        rate: None,
                        converted: false,
                    },
                    Some(describe_failure(&e)),
                )
            }
        }
    }
}

fn describe_failure(error: &ConversionError) -> String {
    match error {
        ConversionError::ConversionFailed { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
