//! Persistence for per-user preferences.

pub mod disk;
pub mod memory;

use crate::core::currency::CurrencyCode;
use anyhow::Result;
use async_trait::async_trait;

pub use disk::DiskPreferences;
pub use memory::MemoryPreferences;

/// Key used by the single-user CLI.
pub const DEFAULT_USER: &str = "default";

/// Get/set access to the reporting currency each user prefers.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn preferred_currency(&self, user: &str) -> Option<CurrencyCode>;

    async fn set_preferred_currency(&self, user: &str, currency: &CurrencyCode) -> Result<()>;
}
