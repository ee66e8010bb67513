//! crates/bloodreach_core/src/session.rs
//!
//! The identity context of one client: which donor, if any, is logged in,
//! persisted in a `KeyValueStore` slot so it survives restarts.
//!
//! A stored session is the donor's JSON record with an extra `issuedAt`
//! field. Under an expiring `SessionLifetime` a record older than the max
//! age is treated as absent and removed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::domain::{Donor, Role};
use crate::ports::{Clock, KeyValueStore, PortResult, SystemClock};
use crate::seed::SEED_ADMIN_EMAIL;

/// E-mail addresses granted admin privilege regardless of stored role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    privileged_emails: HashSet<String>,
}

impl AdminPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_privileged(&self, email: &str) -> bool {
        self.privileged_emails.contains(email)
    }

    /// Admin by stored role, or by a privileged e-mail address.
    pub fn grants_admin(&self, donor: &Donor) -> bool {
        donor.role == Role::Admin
            || donor
                .email
                .as_deref()
                .is_some_and(|email| self.is_privileged(email))
    }
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new([SEED_ADMIN_EMAIL])
    }
}

//=========================================================================================
// Session Lifetime
//=========================================================================================

/// How long a persisted session stays valid, measured on `clock`.
#[derive(Clone)]
pub struct SessionLifetime {
    clock: Arc<dyn Clock>,
    max_age: Option<Duration>,
}

impl SessionLifetime {
    /// Sessions never expire.
    pub fn unlimited() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            max_age: None,
        }
    }

    pub fn expiring(clock: Arc<dyn Clock>, max_age: Duration) -> Self {
        Self {
            clock,
            max_age: Some(max_age),
        }
    }

    /// A record without an issue time cannot be shown to be fresh.
    fn is_expired(&self, issued_at: Option<DateTime<Utc>>) -> bool {
        match (self.max_age, issued_at) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(max_age), Some(issued_at)) => self.clock.now() - issued_at >= max_age,
        }
    }
}

impl Default for SessionLifetime {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    #[serde(flatten)]
    donor: Donor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issued_at: Option<DateTime<Utc>>,
}

enum Slot {
    Live(Donor),
    Stale,
    Empty,
}

async fn read_slot(
    store: &dyn KeyValueStore,
    key: &str,
    lifetime: &SessionLifetime,
) -> PortResult<Slot> {
    let Some(raw) = store.get(key).await? else {
        return Ok(Slot::Empty);
    };
    match serde_json::from_str::<SessionRecord>(&raw) {
        Ok(record) if lifetime.is_expired(record.issued_at) => Ok(Slot::Stale),
        Ok(record) => Ok(Slot::Live(record.donor)),
        Err(e) => {
            warn!(session_key = %key, error = %e, "Ignoring malformed session record");
            Ok(Slot::Stale)
        }
    }
}

/// Removes every expired or unreadable session whose key starts with `prefix`.
/// Returns the number of records removed.
pub async fn purge_expired_sessions(
    store: &dyn KeyValueStore,
    prefix: &str,
    lifetime: &SessionLifetime,
) -> PortResult<usize> {
    let mut removed = 0;
    for key in store.keys_with_prefix(prefix).await? {
        if let Slot::Stale = read_slot(store, &key, lifetime).await? {
            store.remove(&key).await?;
            removed += 1;
        }
    }
    if removed > 0 {
        info!(removed, "Purged expired sessions");
    }
    Ok(removed)
}

//=========================================================================================
// Session Context
//=========================================================================================

/// The session of one client.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    key: String,
    policy: Arc<AdminPolicy>,
    lifetime: SessionLifetime,
    user: Option<Donor>,
}

impl SessionContext {
    /// Loads the session stored under `key`, which never expires. A missing
    /// or malformed record yields an empty session; only a failing store is
    /// an error.
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        key: String,
        policy: Arc<AdminPolicy>,
    ) -> PortResult<Self> {
        Self::restore_with(store, key, policy, SessionLifetime::unlimited()).await
    }

    /// Like `restore`, but an expired record is removed and yields an empty session.
    pub async fn restore_with(
        store: Arc<dyn KeyValueStore>,
        key: String,
        policy: Arc<AdminPolicy>,
        lifetime: SessionLifetime,
    ) -> PortResult<Self> {
        let user = match read_slot(store.as_ref(), &key, &lifetime).await? {
            Slot::Live(donor) => Some(donor),
            Slot::Stale if lifetime.max_age.is_some() => {
                debug!(session_key = %key, "Removing stale session");
                store.remove(&key).await?;
                None
            }
            Slot::Stale | Slot::Empty => None,
        };
        Ok(Self {
            store,
            key,
            policy,
            lifetime,
            user,
        })
    }

    /// Makes `donor` the active user and persists the session, stamped with
    /// the current time.
    pub async fn login(&mut self, donor: Donor) -> PortResult<()> {
        let record = SessionRecord {
            donor,
            issued_at: Some(self.lifetime.clock.now()),
        };
        let raw = serde_json::to_string(&record)?;
        self.store.set(&self.key, raw).await?;
        self.user = Some(record.donor);
        Ok(())
    }

    pub async fn logout(&mut self) -> PortResult<()> {
        self.store.remove(&self.key).await?;
        self.user = None;
        Ok(())
    }

    pub fn user(&self) -> Option<&Donor> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|donor| self.policy.grants_admin(donor))
    }
}
