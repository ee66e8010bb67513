//! services/api/src/adapters/db.rs
//!
//! The PostgreSQL adapter, a keyed implementation of the `DonorStore` port.
//! Unlike the key-value store it touches only the affected row on each
//! mutation. Donor order is the `position` column assigned on first insert.

use async_trait::async_trait;
use bloodreach_core::domain::{District, Donor, UnknownVariant};
use bloodreach_core::ports::{DonorStore, PortError, PortResult};
use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DonorStore` port.
#[derive(Clone)]
pub struct PgDonorStore {
    pool: PgPool,
}

impl PgDonorStore {
    /// Creates a new `PgDonorStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Struct
//=========================================================================================

#[derive(FromRow)]
struct DonorRecord {
    id: String,
    name: String,
    email: Option<String>,
    password: Option<String>,
    role: String,
    phone: String,
    blood_group: String,
    district: String,
    gender: String,
    last_donation_date: Option<NaiveDate>,
    is_available: bool,
    institute: Option<String>,
    will_change_location: bool,
    years_until_change: Option<i64>,
    target_district: Option<String>,
}

impl DonorRecord {
    fn to_domain(self) -> PortResult<Donor> {
        let years_until_change = self
            .years_until_change
            .map(u32::try_from)
            .transpose()
            .map_err(|e| {
                PortError::Corrupt(format!("donor {}: years_until_change {}", self.id, e))
            })?;
        let corrupt = |e: UnknownVariant| {
            PortError::Corrupt(format!("donor {}: {}", self.id, e))
        };
        Ok(Donor {
            role: self.role.parse().map_err(corrupt)?,
            blood_group: self.blood_group.parse().map_err(corrupt)?,
            district: self.district.parse().map_err(corrupt)?,
            gender: self.gender.parse().map_err(corrupt)?,
            target_district: self
                .target_district
                .as_deref()
                .map(str::parse::<District>)
                .transpose()
                .map_err(corrupt)?,
            years_until_change,
            id: self.id.clone(),
            name: self.name,
            email: self.email,
            password: self.password,
            phone: self.phone,
            last_donation_date: self.last_donation_date,
            is_available: self.is_available,
            institute: self.institute,
            will_change_location: self.will_change_location,
        })
    }
}

const SELECT_DONORS: &str = "SELECT id, name, email, password, role, phone, blood_group, district, \
     gender, last_donation_date, is_available, institute, will_change_location, \
     years_until_change, target_district FROM donors ORDER BY position ASC";

const INSERT_DONOR: &str = "INSERT INTO donors (id, name, email, password, role, phone, \
     blood_group, district, gender, last_donation_date, is_available, institute, \
     will_change_location, years_until_change, target_district) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)";

const UPDATE_DONOR: &str = "UPDATE donors SET name = $2, email = $3, password = $4, role = $5, \
     phone = $6, blood_group = $7, district = $8, gender = $9, last_donation_date = $10, \
     is_available = $11, institute = $12, will_change_location = $13, \
     years_until_change = $14, target_district = $15 WHERE id = $1";

/// Binds every donor column in the `$1..$15` order used by the statements above.
fn bind_donor<'q>(
    query: Query<'q, Postgres, PgArguments>,
    donor: &'q Donor,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(donor.id.as_str())
        .bind(donor.name.as_str())
        .bind(donor.email.as_deref())
        .bind(donor.password.as_deref())
        .bind(donor.role.as_str())
        .bind(donor.phone.as_str())
        .bind(donor.blood_group.as_str())
        .bind(donor.district.as_str())
        .bind(donor.gender.as_str())
        .bind(donor.last_donation_date)
        .bind(donor.is_available)
        .bind(donor.institute.as_deref())
        .bind(donor.will_change_location)
        .bind(donor.years_until_change.map(i64::from))
        .bind(donor.target_district.map(|district| district.as_str()))
}

fn db_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// `DonorStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DonorStore for PgDonorStore {
    async fn load_all(&self) -> PortResult<Option<Vec<Donor>>> {
        let initialized: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM donor_collection_state)")
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        if !initialized {
            return Ok(None);
        }

        let records = sqlx::query_as::<_, DonorRecord>(SELECT_DONORS)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let donors = records
            .into_iter()
            .map(DonorRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(Some(donors))
    }

    async fn replace_all(&self, donors: &[Donor]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM donors")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        for donor in donors {
            bind_donor(sqlx::query(INSERT_DONOR), donor)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        sqlx::query("INSERT INTO donor_collection_state DEFAULT VALUES ON CONFLICT DO NOTHING")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)
    }

    async fn insert(&self, donor: &Donor) -> PortResult<()> {
        bind_donor(sqlx::query(INSERT_DONOR), donor)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn replace(&self, donor: &Donor) -> PortResult<bool> {
        let result = bind_donor(sqlx::query(UPDATE_DONOR), donor)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM donors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
