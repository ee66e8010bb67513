//! Initial donor collection written the first time the store is opened.

use chrono::NaiveDate;
use crate::domain::{BloodGroup, District, Donor, Gender, Role};

/// Address of the seeded administrator, also the default break-glass admin.
pub const SEED_ADMIN_EMAIL: &str = "iyeasin44@gmail.com";

const SEED_PASSWORD: &str = "password123";

/// Builds the seed set. `today` is the donation date of the one donor that
/// must start inside the cooldown window.
pub fn seed_donors(today: NaiveDate) -> Vec<Donor> {
    vec![
        Donor {
            id: "admin-1".to_string(),
            name: "Admin User".to_string(),
            email: Some(SEED_ADMIN_EMAIL.to_string()),
            password: Some(SEED_PASSWORD.to_string()),
            role: Role::Admin,
            phone: "+8801711000000".to_string(),
            blood_group: BloodGroup::AbPositive,
            district: District::Dhaka,
            gender: Gender::Male,
            last_donation_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            is_available: true,
            institute: None,
            will_change_location: false,
            years_until_change: None,
            target_district: None,
        },
        Donor {
            id: "2".to_string(),
            name: "ফাতিমা আক্তার".to_string(),
            email: Some("fatima@example.com".to_string()),
            password: Some(SEED_PASSWORD.to_string()),
            role: Role::User,
            phone: "+8801811000000".to_string(),
            blood_group: BloodGroup::OPositive,
            district: District::Dhaka,
            gender: Gender::Female,
            last_donation_date: Some(today),
            is_available: true,
            institute: None,
            will_change_location: false,
            years_until_change: None,
            target_district: None,
        },
        Donor {
            id: "3".to_string(),
            name: "করিম রহমান".to_string(),
            email: Some("karim@example.com".to_string()),
            password: Some(SEED_PASSWORD.to_string()),
            role: Role::User,
            phone: "+8801911000000".to_string(),
            blood_group: BloodGroup::AbPositive,
            district: District::Chittagong,
            gender: Gender::Male,
            last_donation_date: NaiveDate::from_ymd_opt(2023, 5, 20),
            is_available: true,
            institute: None,
            will_change_location: false,
            years_until_change: None,
            target_district: None,
        },
        Donor {
            id: "4".to_string(),
            name: "সুমাইয়া ইসলাম".to_string(),
            email: Some("sumaiya@example.com".to_string()),
            password: Some(SEED_PASSWORD.to_string()),
            role: Role::User,
            phone: "+8801611000000".to_string(),
            blood_group: BloodGroup::BPositive,
            district: District::Sylhet,
            gender: Gender::Female,
            last_donation_date: NaiveDate::from_ymd_opt(2024, 2, 15),
            is_available: false,
            institute: None,
            will_change_location: true,
            years_until_change: Some(2),
            target_district: Some(District::Dhaka),
        },
    ]
}
