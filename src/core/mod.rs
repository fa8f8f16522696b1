//! Core conversion and valuation logic

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod log;
pub mod parser;

// Re-export main types for cleaner imports
pub use aggregation::{AggregatedTotals, Valuation, ValuationAggregator};
pub use cache::RateCache;
pub use conversion::{ConversionResult, ConversionService};
pub use currency::{CurrencyCode, CurrencyRateProvider};
pub use error::{ConversionError, ParseError, ProviderError};
pub use parser::{CurrencyAmountParser, ParsedAmount};
