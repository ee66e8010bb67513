//! crates/bloodreach_core/src/repository.rs
//!
//! The donor repository: seeding, lookup, search, registration, login and
//! administrative edits over a `DonorStore`.
//!
//! Reads and registration wait for a configurable artificial latency before
//! touching storage. Mutations are serialized through one async mutex that is
//! held until the store write completes.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;
use crate::domain::{BloodGroup, District, Donor, NewDonor, Role, Stats};
use crate::eligibility::matches_search;
use crate::ports::{Clock, DonorStore, PortResult};
use crate::seed::seed_donors;

/// Artificial delays applied before repository operations complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Applied to `search`, `login`, `get_all` and `filter_for_admin`.
    pub read: Duration,
    /// Applied to `register`.
    pub register: Duration,
}

impl Latency {
    pub const fn none() -> Self {
        Self {
            read: Duration::ZERO,
            register: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(500),
            register: Duration::from_millis(800),
        }
    }
}

/// Constants added to the live counts reported by `get_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOffsets {
    pub total_donors: u64,
    pub lives_saved: u64,
}

impl Default for StatsOffsets {
    fn default() -> Self {
        Self {
            total_donors: 12_400,
            lives_saved: 35_000,
        }
    }
}

pub struct DonorRepository {
    store: Arc<dyn DonorStore>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    offsets: StatsOffsets,
    write_lock: Mutex<()>,
}

impl DonorRepository {
    pub fn new(store: Arc<dyn DonorStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            latency: Latency::default(),
            offsets: StatsOffsets::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_stats_offsets(mut self, offsets: StatsOffsets) -> Self {
        self.offsets = offsets;
        self
    }

    async fn simulate_latency(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Loads the collection, seeding it first if it has never been written.
    /// Caller must hold the write lock.
    async fn load_or_seed_locked(&self) -> PortResult<Vec<Donor>> {
        if let Some(donors) = self.store.load_all().await? {
            return Ok(donors);
        }
        let seed = seed_donors(self.clock.today());
        self.store.replace_all(&seed).await?;
        info!(count = seed.len(), "Seeded donor collection");
        Ok(seed)
    }

    async fn collection(&self) -> PortResult<Vec<Donor>> {
        if let Some(donors) = self.store.load_all().await? {
            return Ok(donors);
        }
        let _guard = self.write_lock.lock().await;
        self.load_or_seed_locked().await
    }

    /// Seeds the store if it is empty, otherwise loads it unchanged.
    pub async fn initialize(&self) -> PortResult<Vec<Donor>> {
        let _guard = self.write_lock.lock().await;
        self.load_or_seed_locked().await
    }

    /// Eligible donors of the given group in the given district, in storage order.
    pub async fn search(
        &self,
        blood_group: BloodGroup,
        district: District,
    ) -> PortResult<Vec<Donor>> {
        self.simulate_latency(self.latency.read).await;
        let today = self.clock.today();
        let results: Vec<Donor> = self
            .collection()
            .await?
            .into_iter()
            .filter(|donor| matches_search(donor, blood_group, district, today))
            .collect();
        debug!(%blood_group, %district, found = results.len(), "Donor search");
        Ok(results)
    }

    /// Stores a new donor under a freshly minted id. The role is always `user`.
    pub async fn register(&self, new_donor: NewDonor) -> PortResult<Donor> {
        self.simulate_latency(self.latency.register).await;
        let _guard = self.write_lock.lock().await;
        let existing = self.load_or_seed_locked().await?;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !existing.iter().any(|donor| donor.id == candidate) {
                break candidate;
            }
        };
        let mut donor = new_donor.with_id(id);
        donor.role = Role::User;

        self.store.insert(&donor).await?;
        info!(donor_id = %donor.id, "Registered donor");
        Ok(donor)
    }

    /// First donor whose email and password both match exactly.
    pub async fn login(&self, email: &str, password: &str) -> PortResult<Option<Donor>> {
        self.simulate_latency(self.latency.read).await;
        let found = self.collection().await?.into_iter().find(|donor| {
            donor.email.as_deref() == Some(email) && donor.password.as_deref() == Some(password)
        });
        Ok(found)
    }

    pub async fn get_all(&self) -> PortResult<Vec<Donor>> {
        self.simulate_latency(self.latency.read).await;
        self.collection().await
    }

    /// Replaces the stored donor with the same id. Returns `false` when the id is unknown.
    pub async fn update(&self, donor: &Donor) -> PortResult<bool> {
        let _guard = self.write_lock.lock().await;
        self.load_or_seed_locked().await?;
        let updated = self.store.replace(donor).await?;
        if updated {
            info!(donor_id = %donor.id, "Updated donor");
        } else {
            debug!(donor_id = %donor.id, "Update skipped, donor not found");
        }
        Ok(updated)
    }

    /// Removes the donor if present. Always reports success.
    pub async fn delete(&self, id: &str) -> PortResult<bool> {
        let _guard = self.write_lock.lock().await;
        self.load_or_seed_locked().await?;
        self.store.remove(id).await?;
        info!(donor_id = %id, "Deleted donor");
        Ok(true)
    }

    pub async fn get_stats(&self) -> PortResult<Stats> {
        let count = self.collection().await?.len() as u64;
        Ok(Stats {
            total_donors: count + self.offsets.total_donors,
            lives_saved: count * 3 + self.offsets.lives_saved,
        })
    }

    /// Records a donation today and hides the donor from search.
    /// Returns the stored record, or `None` if the donor no longer exists.
    pub async fn mark_donated_today(&self, donor: &Donor) -> PortResult<Option<Donor>> {
        let mut updated = donor.clone();
        updated.last_donation_date = Some(self.clock.today());
        updated.is_available = false;
        Ok(self.update(&updated).await?.then_some(updated))
    }

    /// Flips the donor's availability flag.
    pub async fn toggle_availability(&self, donor: &Donor) -> PortResult<Option<Donor>> {
        let mut updated = donor.clone();
        updated.is_available = !updated.is_available;
        Ok(self.update(&updated).await?.then_some(updated))
    }

    /// All donors whose name or district contains `term` (case-insensitive)
    /// or whose phone contains it verbatim.
    pub async fn filter_for_admin(&self, term: &str) -> PortResult<Vec<Donor>> {
        let needle = term.to_lowercase();
        let donors = self.get_all().await?;
        Ok(donors
            .into_iter()
            .filter(|donor| {
                donor.name.to_lowercase().contains(&needle)
                    || donor.phone.contains(term)
                    || donor.district.as_str().to_lowercase().contains(&needle)
            })
            .collect())
    }
}
