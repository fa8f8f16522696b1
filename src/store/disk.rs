use crate::core::currency::CurrencyCode;
use crate::store::PreferenceStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "preferences";

/// Preference store backed by a fjall keyspace under the data directory.
pub struct DiskPreferences {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskPreferences {
    pub fn open(data_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_path).with_context(|| {
            format!("Failed to create data directory: {}", data_path.display())
        })?;

        let keyspace = Config::new(data_path.join("store"))
            .open()
            .context("Failed to open preference store")?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open preference partition")?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl PreferenceStore for DiskPreferences {
    async fn preferred_currency(&self, user: &str) -> Option<CurrencyCode> {
        let res: Result<Option<CurrencyCode>> = (|| {
            let Some(value) = self.partition.get(user.as_bytes())? else {
                debug!("No stored preference for {}", user);
                return Ok(None);
            };
            let raw = std::str::from_utf8(&value)?;
            Ok(Some(CurrencyCode::parse(raw)?))
        })();

        match res {
            Ok(currency) => currency,
            Err(e) => {
                debug!("Preference read error for {}: {}", user, e);
                None
            }
        }
    }

    async fn set_preferred_currency(&self, user: &str, currency: &CurrencyCode) -> Result<()> {
        self.partition
            .insert(user.as_bytes(), currency.as_str().as_bytes())
            .context("Failed to write preference")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist preference")?;
        debug!("Stored preferred currency {} for {}", currency, user);
        Ok(())
    }
}
