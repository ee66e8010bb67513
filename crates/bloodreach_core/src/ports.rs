//! crates/bloodreach_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic depends on.
//! Storage and time sit behind these traits so the repository and session
//! context stay independent of any concrete backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::Donor;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    Storage(String),
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for PortError {
    fn from(err: serde_json::Error) -> Self {
        PortError::Corrupt(err.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports
//=========================================================================================

/// A durable string key-value store, the equivalent of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> PortResult<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;

    /// Every stored key starting with `prefix`, in ascending order.
    async fn keys_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>>;
}

/// Keyed storage of the donor collection.
///
/// Implementations keep insertion order: `load_all` returns donors in the
/// order they were first stored, and `replace` keeps a donor's position.
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// Returns `None` when no collection has ever been written.
    async fn load_all(&self) -> PortResult<Option<Vec<Donor>>>;

    /// Overwrites the whole collection.
    async fn replace_all(&self, donors: &[Donor]) -> PortResult<()>;

    async fn insert(&self, donor: &Donor) -> PortResult<()>;

    /// Replaces the donor with the same id. Returns `false` without writing
    /// anything when no such donor exists.
    async fn replace(&self, donor: &Donor) -> PortResult<bool>;

    async fn remove(&self, id: &str) -> PortResult<()>;
}

//=========================================================================================
// Clock
//=========================================================================================

/// Source of "now" for the cooldown rule, the donated-today action and session expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
