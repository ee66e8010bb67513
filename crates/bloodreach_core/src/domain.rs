//! crates/bloodreach_core/src/domain.rs
//!
//! Defines the core data structures of the donor directory.
//! The serde representation is the persisted and wire format: camelCase field
//! names, canonical group/district spellings, and `lastDonationDate` as a
//! `YYYY-MM-DD` string that is empty when unknown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Enumerations
//=========================================================================================

/// Error returned when a string does not name a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// One of the eight ABO/Rh blood groups.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("blood group", s))
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of districts the directory covers.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum District {
    Dhaka,
    Chittagong,
    Sylhet,
    Rajshahi,
    Khulna,
    Barisal,
    Rangpur,
    Mymensingh,
    Comilla,
    Narayanganj,
    Gazipur,
}

impl District {
    pub const ALL: [District; 11] = [
        District::Dhaka,
        District::Chittagong,
        District::Sylhet,
        District::Rajshahi,
        District::Khulna,
        District::Barisal,
        District::Rangpur,
        District::Mymensingh,
        District::Comilla,
        District::Narayanganj,
        District::Gazipur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            District::Dhaka => "Dhaka",
            District::Chittagong => "Chittagong",
            District::Sylhet => "Sylhet",
            District::Rajshahi => "Rajshahi",
            District::Khulna => "Khulna",
            District::Barisal => "Barisal",
            District::Rangpur => "Rangpur",
            District::Mymensingh => "Mymensingh",
            District::Comilla => "Comilla",
            District::Narayanganj => "Narayanganj",
            District::Gazipur => "Gazipur",
        }
    }

    /// Bengali display label.
    pub fn label(&self) -> &'static str {
        match self {
            District::Dhaka => "ঢাকা",
            District::Chittagong => "চট্টগ্রাম",
            District::Sylhet => "সিলেট",
            District::Rajshahi => "রাজশাহী",
            District::Khulna => "খুলনা",
            District::Barisal => "বরিশাল",
            District::Rangpur => "রংপুর",
            District::Mymensingh => "ময়মনসিংহ",
            District::Comilla => "কুমিল্লা",
            District::Narayanganj => "নারায়ণগঞ্জ",
            District::Gazipur => "গাজীপুর",
        }
    }
}

impl FromStr for District {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        District::ALL
            .into_iter()
            .find(|district| district.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("district", s))
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "পুরুষ",
            Gender::Female => "মহিলা",
            Gender::Other => "অন্যান্য",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("gender", s))
    }
}

/// Stored privilege level. Records written without a role are plain users.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

//=========================================================================================
// Records
//=========================================================================================

/// A registered donor.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Plaintext; compared for equality at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub district: District,
    pub gender: Gender,
    #[serde(default, with = "optional_date")]
    pub last_donation_date: Option<NaiveDate>,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,

    // Relocation plans. Stored and returned, nothing acts on them yet.
    #[serde(default)]
    pub will_change_location: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_until_change: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_district: Option<District>,
}

/// A donor as submitted for registration, before an id is minted.
///
/// `role` is accepted so that payloads carrying it still parse, but
/// registration always overrides it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub district: District,
    pub gender: Gender,
    #[serde(default, with = "optional_date")]
    pub last_donation_date: Option<NaiveDate>,
    pub is_available: bool,
    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default)]
    pub will_change_location: bool,
    #[serde(default)]
    pub years_until_change: Option<u32>,
    #[serde(default)]
    pub target_district: Option<District>,
}

impl NewDonor {
    /// Attaches an id, keeping every other field as supplied.
    pub fn with_id(self, id: String) -> Donor {
        Donor {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role,
            phone: self.phone,
            blood_group: self.blood_group,
            district: self.district,
            gender: self.gender,
            last_donation_date: self.last_donation_date,
            is_available: self.is_available,
            institute: self.institute,
            will_change_location: self.will_change_location,
            years_until_change: self.years_until_change,
            target_district: self.target_district,
        }
    }
}

/// Landing-page counters.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_donors: u64,
    pub lives_saved: u64,
}

/// Serde adapter for `lastDonationDate`: `YYYY-MM-DD`, with `""` or `null` meaning unknown.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
