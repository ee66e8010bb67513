pub mod domain;
pub mod eligibility;
pub mod kv;
pub mod ports;
pub mod repository;
pub mod seed;
pub mod session;

pub use domain::{BloodGroup, District, Donor, Gender, NewDonor, Role, Stats};
pub use kv::{donors_key, session_key, session_key_prefix, InMemoryKeyValueStore, KvDonorStore};
pub use ports::{Clock, DonorStore, FixedClock, KeyValueStore, PortError, PortResult, SystemClock};
pub use repository::{DonorRepository, Latency, StatsOffsets};
pub use session::{purge_expired_sessions, AdminPolicy, SessionContext, SessionLifetime};
