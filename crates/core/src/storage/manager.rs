use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::config::{AUTO_BACKUP_INTERVAL_HOURS, STORAGE_KEY_PREFIX};
use crate::errors::CoreError;

use super::envelope::{KdfParams, SealedEnvelope};
use super::store::KeyValueStore;

/// Typed access to a [`KeyValueStore`]: JSON values under `JBP_`-prefixed
/// keys, optionally sealed with a password.
#[derive(Debug)]
pub struct StorageManager<S: KeyValueStore> {
    store: S,
    kdf_params: KdfParams,
}

impl<S: KeyValueStore> StorageManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_kdf_params(store, KdfParams::default())
    }

    /// Use explicit key-derivation costs for values sealed by this manager.
    pub fn with_kdf_params(store: S, kdf_params: KdfParams) -> Self {
        Self { store, kdf_params }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Serialize `value` to JSON and store it under `key`.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        self.store.set(&prefixed(key), &json)?;
        info!(key, bytes = json.len(), "saved value");
        Ok(())
    }

    /// Load and deserialize the value under `key`. `Ok(None)` if absent.
    ///
    /// Sealed values are rejected here; use [`load_sealed`](Self::load_sealed).
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let Some(bytes) = self.store.get(&prefixed(key))? else {
            return Ok(None);
        };
        if SealedEnvelope::is_sealed(&bytes) {
            return Err(CoreError::ValidationError(format!(
                "value for '{key}' is sealed; a password is required"
            )));
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize '{key}': {e}")))?;
        Ok(Some(value))
    }

    /// Serialize `value`, seal it under `password` and store it.
    pub fn save_sealed<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        password: &str,
    ) -> Result<(), CoreError> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        let envelope = SealedEnvelope::seal_with(&json, password, self.kdf_params)?;
        self.store.set(&prefixed(key), &envelope.to_bytes())?;
        info!(key, "saved sealed value");
        Ok(())
    }

    /// Load a value stored by [`save_sealed`](Self::save_sealed).
    /// Plain JSON values are accepted too, so encryption can be switched on later.
    pub fn load_sealed<T: DeserializeOwned>(
        &self,
        key: &str,
        password: &str,
    ) -> Result<Option<T>, CoreError> {
        let Some(bytes) = self.store.get(&prefixed(key))? else {
            return Ok(None);
        };
        let json = if SealedEnvelope::is_sealed(&bytes) {
            SealedEnvelope::from_bytes(&bytes)?.open(password)?
        } else {
            warn!(key, "expected a sealed value, found plain JSON");
            bytes
        };
        let value = serde_json::from_slice(&json)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize '{key}': {e}")))?;
        Ok(Some(value))
    }

    /// Delete the value under `key`. Returns `true` if it existed.
    pub fn remove(&mut self, key: &str) -> Result<bool, CoreError> {
        self.store.remove(&prefixed(key))
    }

    /// Unprefixed keys of every value this manager owns.
    pub fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(STORAGE_KEY_PREFIX).map(str::to_string))
            .collect())
    }

    /// Build a JSON backup of every plain value.
    ///
    /// Returns `(file_name, json)`. The object maps each prefixed key to its
    /// stored JSON value; sealed values are left out since they cannot be read
    /// without the password.
    pub fn backup_snapshot(&self, now: DateTime<Utc>) -> Result<(String, String), CoreError> {
        let mut entries = serde_json::Map::new();
        for key in self.store.keys()? {
            if !key.starts_with(STORAGE_KEY_PREFIX) {
                continue;
            }
            let Some(bytes) = self.store.get(&key)? else {
                continue;
            };
            if SealedEnvelope::is_sealed(&bytes) {
                continue;
            }
            let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                CoreError::Deserialization(format!("Stored value '{key}' is not valid JSON: {e}"))
            })?;
            entries.insert(key, value);
        }

        let file_name = backup_file_name(now);
        let json = serde_json::to_string_pretty(&serde_json::Value::Object(entries))
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize backup: {e}")))?;
        info!(file = %file_name, "created backup snapshot");
        Ok((file_name, json))
    }
}

/// `jibajeti_pro_backup_<timestamp>.json`, timestamp in UTC without separators
/// that are unsafe in file names.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("jibajeti_pro_backup_{}.json", now.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Whether an automatic backup should run: never backed up, or the interval has elapsed.
pub fn is_backup_due(last_backup: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_backup {
        None => true,
        Some(last) => now - last >= Duration::hours(AUTO_BACKUP_INTERVAL_HOURS),
    }
}

fn prefixed(key: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{key}")
}
