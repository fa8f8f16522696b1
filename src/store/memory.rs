use crate::core::currency::CurrencyCode;
use crate::store::PreferenceStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Non-persistent preference store for tests and embedding callers.
#[derive(Default)]
pub struct MemoryPreferences {
    inner: Mutex<HashMap<String, CurrencyCode>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn preferred_currency(&self, user: &str) -> Option<CurrencyCode> {
        let prefs = self.inner.lock().await;
        let currency = prefs.get(user).cloned();
        debug!("Preferred currency for {}: {:?}", user, currency);
        currency
    }

    async fn set_preferred_currency(&self, user: &str, currency: &CurrencyCode) -> Result<()> {
        let mut prefs = self.inner.lock().await;
        debug!("Setting preferred currency for {} to {}", user, currency);
        prefs.insert(user.to_string(), currency.clone());
        Ok(())
    }
}
