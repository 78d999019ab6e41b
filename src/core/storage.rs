//! Storage collaborator - load and save the session's two records.
//!
//! The engine never touches storage itself. After each mutation the caller
//! saves the collection record `{ splits, selectedId }` and the settlement
//! registry as separate JSON documents, each under its own key. Saving is
//! best-effort: no retries, no conflict resolution.

use crate::{
    config::app::StorageKeys,
    core::{
        collection::{CollectionRecord, SplitCollection},
        session::Session,
        settlement::SettlementRegistry,
        split::Split,
    },
    entities::{StoredRecord, stored_record},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde_json::Value;
use tracing::{debug, warn};

/// Reads the raw document stored under `key`.
pub async fn get_record<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let record = StoredRecord::find()
        .filter(stored_record::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(record.map(|r| r.value))
}

/// Writes `value` under `key`, replacing any previous document.
pub async fn put_record<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = StoredRecord::find()
        .filter(stored_record::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(record) = existing {
        let mut active_model: stored_record::ActiveModel = record.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_record = stored_record::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_record.insert(db).await?;
    }

    debug!(key, "Saved record");
    Ok(())
}

/// Saves the collection record. A selection that no longer names a split is
/// written as `null`.
pub async fn save_collection<C>(db: &C, keys: &StorageKeys, collection: &SplitCollection) -> Result<()>
where
    C: ConnectionTrait,
{
    let json = serde_json::to_string(&collection.to_record())?;
    put_record(db, &keys.collection_key, json).await
}

/// Saves the settlement registry.
pub async fn save_settlements<C>(db: &C, keys: &StorageKeys, registry: &SettlementRegistry) -> Result<()>
where
    C: ConnectionTrait,
{
    let json = serde_json::to_string(registry)?;
    put_record(db, &keys.settlements_key, json).await
}

/// Saves both records.
pub async fn save_session<C>(db: &C, keys: &StorageKeys, session: &Session) -> Result<()>
where
    C: ConnectionTrait,
{
    save_collection(db, keys, &session.collection).await?;
    save_settlements(db, keys, &session.settlements).await
}

/// Loads the session, hydrating slugs and resolving the selection from the
/// inbound path segment.
///
/// Missing records yield an empty collection or registry. A record that is not
/// valid JSON, or a collection whose `splits` is not an array, is logged and
/// treated as absent.
pub async fn load_session<C>(db: &C, keys: &StorageKeys, segment: Option<&str>) -> Result<Session>
where
    C: ConnectionTrait,
{
    let record = match get_record(db, &keys.collection_key).await? {
        Some(raw) => parse_collection(&raw),
        None => CollectionRecord::default(),
    };
    let collection = SplitCollection::hydrate(record.splits, record.selected_id, segment);

    let settlements = match get_record(db, &keys.settlements_key).await? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Failed to read saved settlements: {}", e);
            SettlementRegistry::default()
        }),
        None => SettlementRegistry::default(),
    };

    debug!(
        splits = collection.len(),
        selected = ?collection.selected_id(),
        settlements = settlements.len(),
        "Loaded session"
    );
    Ok(Session::new(collection, settlements))
}

fn parse_collection(raw: &str) -> CollectionRecord {
    let document: Value = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to read saved splits: {}", e);
            return CollectionRecord::default();
        }
    };

    let splits = match document.get("splits") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                serde_json::from_value::<Split>(item.clone())
                    .inspect_err(|e| warn!("Skipping unreadable saved split: {}", e))
                    .ok()
            })
            .collect(),
        _ => Vec::new(),
    };

    CollectionRecord {
        splits,
        selected_id: document.get("selectedId").and_then(Value::as_i64),
    }
}
