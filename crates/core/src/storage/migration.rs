use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::info;

use crate::errors::CoreError;
use crate::models::settings::Settings;

use super::store::KeyValueStore;

/// Key (without namespace) recording the data layout version.
pub const APP_VERSION_KEY: &str = "appVersion";

/// Upgrade stored data from layout `from` to layout `to`.
///
/// Only `1.0 → 1.1` changes data: records missing `createdAt`/`updatedAt`
/// get the current time. Every call records `to` as the current version.
/// Returns the number of records touched.
pub fn migrate(
    store: &KeyValueStore,
    settings: &Settings,
    from: &str,
    to: &str,
) -> Result<usize, CoreError> {
    let mut touched = 0;

    if from == "1.0" && to == "1.1" {
        let mut records: Vec<Value> = store.get_or(&settings.transactions_key, Vec::new());
        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        for record in records.iter_mut() {
            let Some(fields) = record.as_object_mut() else {
                continue;
            };
            let mut changed = false;
            for field in ["createdAt", "updatedAt"] {
                if fields.get(field).map_or(true, Value::is_null) {
                    fields.insert(field.to_string(), now.clone());
                    changed = true;
                }
            }
            if changed {
                touched += 1;
            }
        }

        if touched > 0 && !store.put(&settings.transactions_key, &records) {
            return Err(CoreError::StorageWrite(format!(
                "Failed to write {} migrated transactions",
                records.len()
            )));
        }
    }

    if !store.put(APP_VERSION_KEY, to) {
        return Err(CoreError::StorageWrite("Failed to record app version".into()));
    }

    info!(from, to, touched, "Migrated stored data");
    Ok(touched)
}

/// Layout version recorded by the last migration, if any.
pub fn current_version(store: &KeyValueStore) -> Option<String> {
    store.get(APP_VERSION_KEY)
}
