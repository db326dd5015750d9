use std::sync::Arc;

use glean_common::{GleanError, Result};
use serde_json::Value;

use crate::kv::KeyValueStore;

pub const API_KEYS: &str = "apiKeys";
pub const SELECTED_API_KEY: &str = "selectedApiKey";
/// Single-key slot written by the older settings path. Not reconciled with
/// [`API_KEYS`] except through [`KeyStore::migrate_legacy`].
pub const LEGACY_API_KEY: &str = "openRouterApiKey";

/// Saved API keys (in insertion order) and the currently selected one.
#[derive(Clone)]
pub struct KeyStore {
    store: Arc<dyn KeyValueStore>,
}

impl KeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All saved keys; empty when nothing has been stored yet.
    pub async fn list(&self) -> Result<Vec<String>> {
        match self.store.get(API_KEYS).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v)
                .map_err(|e| GleanError::Storage(format!("{API_KEYS} is not a list of strings: {e}"))),
        }
    }

    /// Append `key` and select it. Returns false, changing nothing, when the
    /// key is empty or already saved.
    pub async fn add(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let mut keys = self.list().await?;
        if keys.iter().any(|k| k == key) {
            tracing::debug!("keys.add.duplicate");
            return Ok(false);
        }
        keys.push(key.to_string());
        self.store.set(API_KEYS, Value::from(keys)).await?;
        self.store.set(SELECTED_API_KEY, Value::from(key)).await?;
        tracing::info!(key = %mask_key(key), "keys.added");
        Ok(true)
    }

    /// Forget `key`, clearing the selection if it pointed at it. Absent keys
    /// are ignored.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let keys: Vec<String> = self
            .list()
            .await?
            .into_iter()
            .filter(|k| k != key)
            .collect();
        self.store.set(API_KEYS, Value::from(keys)).await?;

        if self.selected().await? == key {
            self.store.remove(SELECTED_API_KEY).await?;
            tracing::info!(key = %mask_key(key), "keys.removed.selection_cleared");
        } else {
            tracing::info!(key = %mask_key(key), "keys.removed");
        }
        Ok(())
    }

    /// The selected key, or `""` when none is selected.
    pub async fn selected(&self) -> Result<String> {
        Ok(self
            .store
            .get(SELECTED_API_KEY)
            .await?
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    /// Point the selection at `key` without checking that it is saved.
    pub async fn set_selected(&self, key: &str) -> Result<()> {
        self.store.set(SELECTED_API_KEY, Value::from(key)).await
    }

    pub async fn legacy_key(&self) -> Result<String> {
        Ok(self
            .store
            .get(LEGACY_API_KEY)
            .await?
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    pub async fn set_legacy_key(&self, key: &str) -> Result<()> {
        self.store
            .set(LEGACY_API_KEY, Value::from(key.trim()))
            .await
    }

    /// Credential for an outbound request: the selected key, else `explicit`
    /// (flag or environment), else the legacy slot. `""` when all are blank.
    pub async fn resolve_credential(&self, explicit: Option<&str>) -> Result<String> {
        let selected = self.selected().await?;
        if !selected.is_empty() {
            return Ok(selected);
        }
        if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        Ok(self.legacy_key().await?.trim().to_string())
    }

    /// Copy a legacy key into the saved list (selecting it) when it is not
    /// there yet. The legacy slot is left untouched.
    pub async fn migrate_legacy(&self) -> Result<bool> {
        let legacy = self.legacy_key().await?;
        let migrated = self.add(legacy.trim()).await?;
        if migrated {
            tracing::info!(key = %mask_key(&legacy), "keys.legacy.migrated");
        }
        Ok(migrated)
    }
}

/// First and last four characters around an ellipsis; short keys are fully hidden.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
