//! crates/bloodreach_core/src/eligibility.rs
//!
//! The donation cooldown and the search predicate built on it.
//!
//! Elapsed time is counted in whole calendar days between the donation date
//! and today's UTC date, so the time of day never shifts the result. The
//! distance is absolute: a date in the future counts the same as a date
//! equally far in the past.

use chrono::NaiveDate;
use crate::domain::{BloodGroup, District, Donor};

/// Minimum whole days between donations before a donor is surfaced again.
pub const COOLDOWN_DAYS: i64 = 120;

/// Calendar days between `last_donation` and `today`.
pub fn days_since_donation(last_donation: NaiveDate, today: NaiveDate) -> i64 {
    (today - last_donation).num_days().abs()
}

/// True when no donation is on record or the cooldown has fully elapsed.
pub fn cooldown_elapsed(last_donation: Option<NaiveDate>, today: NaiveDate) -> bool {
    match last_donation {
        None => true,
        Some(date) => days_since_donation(date, today) >= COOLDOWN_DAYS,
    }
}

/// A donor is eligible when opted in and out of cooldown.
pub fn is_eligible(donor: &Donor, today: NaiveDate) -> bool {
    donor.is_available && cooldown_elapsed(donor.last_donation_date, today)
}

/// Exact match on group and district, then eligibility.
pub fn matches_search(
    donor: &Donor,
    blood_group: BloodGroup,
    district: District,
    today: NaiveDate,
) -> bool {
    donor.blood_group == blood_group && donor.district == district && is_eligible(donor, today)
}
