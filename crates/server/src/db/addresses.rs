//! `PostgreSQL` address store.
//!
//! Uses runtime-checked queries so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use address_api_core::RecordId;

use super::{AddressStore, RepositoryError};
use crate::models::Address;

/// Row shape of the `address` table.
#[derive(Debug, FromRow)]
struct AddressRow {
    id: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let id = RecordId::parse(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid id in database: {e}"))
        })?;

        Ok(Self::from_stored(
            id,
            row.created,
            row.updated,
            row.street,
            row.city,
            row.state,
            row.zip_code,
            row.country,
        ))
    }
}

/// Timestamps returned by insert and update statements.
#[derive(Debug, FromRow)]
struct Stamps {
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

/// Address store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

impl PgAddressStore {
    /// Create a new store over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, address: &mut Address) -> Result<(), RepositoryError> {
        let id = address.id().cloned().unwrap_or_else(RecordId::generate);

        let stamps = sqlx::query_as::<_, Stamps>(
            r"
            INSERT INTO address (id, created, updated, street, city, state, zip_code, country)
            VALUES ($1, now(), now(), $2, $3, $4, $5, $6)
            RETURNING created, updated
            ",
        )
        .bind(&id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("address id already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        address.mark_persisted(id, stamps.created, stamps.updated);
        Ok(())
    }

    async fn update(&self, address: &mut Address) -> Result<(), RepositoryError> {
        let id = address.id().cloned().ok_or_else(|| {
            RepositoryError::DataCorruption("persisted address without id".to_owned())
        })?;

        let stamps = sqlx::query_as::<_, Stamps>(
            r"
            UPDATE address
            SET updated = now(),
                street = $2,
                city = $3,
                state = $4,
                zip_code = $5,
                country = $6
            WHERE id = $1
            RETURNING created, updated
            ",
        )
        .bind(&id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        address.mark_persisted(id, stamps.created, stamps.updated);
        Ok(())
    }
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn save(&self, address: &mut Address) -> Result<(), RepositoryError> {
        if address.is_new() {
            self.insert(address).await
        } else {
            self.update(address).await
        }
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, created, updated, street, city, state, zip_code, country
            FROM address
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Address::try_from).transpose()
    }

    async fn id_exists(&self, id: &RecordId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM address WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
