//! crates/bloodreach_core/src/kv.rs
//!
//! Key-value backed storage: an in-memory `KeyValueStore` and the
//! `DonorStore` that keeps the whole donor collection as one JSON array under
//! a single key, rewriting it on every mutation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::domain::Donor;
use crate::ports::{DonorStore, KeyValueStore, PortResult};

/// Key under which the donor collection is stored.
pub fn donors_key(app_name: &str) -> String {
    format!("{app_name}_donors")
}

/// Key of a persisted session. `None` is the single-client slot; a token
/// gives each connection its own slot.
pub fn session_key(app_name: &str, token: Option<&str>) -> String {
    match token {
        Some(token) => format!("{}{token}", session_key_prefix(app_name)),
        None => format!("{app_name}_user"),
    }
}

/// Common prefix of every token-keyed session slot.
pub fn session_key_prefix(app_name: &str) -> String {
    format!("{app_name}_user:")
}

//=========================================================================================
// In-memory KeyValueStore
//=========================================================================================

/// A process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

//=========================================================================================
// Whole-collection DonorStore
//=========================================================================================

/// Stores every donor as one JSON array under `<app>_donors`.
///
/// Each mutation reads the full array, edits it in memory and writes it back.
/// Callers must serialize mutations; the repository does so with its write lock.
#[derive(Clone)]
pub struct KvDonorStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvDonorStore {
    pub fn new(store: Arc<dyn KeyValueStore>, app_name: &str) -> Self {
        Self {
            store,
            key: donors_key(app_name),
        }
    }

    async fn load(&self) -> PortResult<Vec<Donor>> {
        Ok(self.load_all().await?.unwrap_or_default())
    }

    async fn save(&self, donors: &[Donor]) -> PortResult<()> {
        let raw = serde_json::to_string(donors)?;
        self.store.set(&self.key, raw).await
    }
}

#[async_trait]
impl DonorStore for KvDonorStore {
    async fn load_all(&self) -> PortResult<Option<Vec<Donor>>> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn replace_all(&self, donors: &[Donor]) -> PortResult<()> {
        self.save(donors).await
    }

    async fn insert(&self, donor: &Donor) -> PortResult<()> {
        let mut donors = self.load().await?;
        donors.push(donor.clone());
        self.save(&donors).await
    }

    async fn replace(&self, donor: &Donor) -> PortResult<bool> {
        let mut donors = self.load().await?;
        match donors.iter_mut().find(|stored| stored.id == donor.id) {
            Some(stored) => {
                *stored = donor.clone();
                self.save(&donors).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        let mut donors = self.load().await?;
        let before = donors.len();
        donors.retain(|stored| stored.id != id);
        if donors.len() != before {
            self.save(&donors).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use crate::seed::seed_donors;
    use chrono::NaiveDate;

    fn store() -> (Arc<InMemoryKeyValueStore>, KvDonorStore) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let donors = KvDonorStore::new(kv.clone(), "bloodreach");
        (kv, donors)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn keys_follow_app_prefix() {
        assert_eq!(donors_key("bloodreach"), "bloodreach_donors");
        assert_eq!(session_key("bloodreach", None), "bloodreach_user");
        assert_eq!(session_key("bloodreach", Some("abc")), "bloodreach_user:abc");
        assert!(session_key("bloodreach", Some("abc")).starts_with(&session_key_prefix("bloodreach")));
    }

    #[tokio::test]
    async fn prefix_listing_is_sorted_and_exact() {
        let kv = InMemoryKeyValueStore::new();
        for key in ["bloodreach_user:b", "bloodreach_user", "bloodreach_donors", "bloodreach_user:a"] {
            kv.set(key, "{}".to_string()).await.unwrap();
        }

        let keys = kv.keys_with_prefix("bloodreach_user:").await.unwrap();
        assert_eq!(keys, vec!["bloodreach_user:a", "bloodreach_user:b"]);
    }

    #[tokio::test]
    async fn absent_collection_loads_as_none() {
        let (_, donors) = store();
        assert!(donors.load_all().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collection_is_one_json_array_under_donors_key() {
        let (kv, donors) = store();
        donors.replace_all(&seed_donors(today())).await.unwrap();

        let raw = kv.get("bloodreach_donors").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["id"], "admin-1");
    }

    #[tokio::test]
    async fn replace_keeps_position_and_reports_missing_ids() {
        let (_, donors) = store();
        donors.replace_all(&seed_donors(today())).await.unwrap();

        let mut edited = seed_donors(today())[1].clone();
        edited.name = "Fatima".to_string();
        assert!(donors.replace(&edited).await.unwrap());

        let mut ghost = edited.clone();
        ghost.id = "missing".to_string();
        assert!(!donors.replace(&ghost).await.unwrap());

        let stored = donors.load_all().await.unwrap().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[1].name, "Fatima");
    }

    #[tokio::test]
    async fn corrupt_collection_is_reported() {
        let (kv, donors) = store();
        kv.set("bloodreach_donors", "{not json".to_string()).await.unwrap();

        let err = donors.load_all().await.unwrap_err();
        assert!(matches!(err, PortError::Corrupt(_)));
    }
}
