//! Address persistence.
//!
//! # Database
//!
//! ## Tables
//!
//! - `address` - Address records (see `migrations/0001_create_address.sql`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p address-api-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and forms only see the [`AddressStore`] trait. Two
//! implementations exist: [`PgAddressStore`] for `PostgreSQL` and
//! [`MemoryAddressStore`] for tests and database-less runs.

pub mod addresses;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use address_api_core::RecordId;

use crate::models::Address;

pub use addresses::PgAddressStore;
pub use memory::MemoryAddressStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Data-access interface for address records.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Insert a new record or update an existing one.
    ///
    /// New records without an id get a generated one. On success the record
    /// is marked persisted and carries its stored timestamps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a new record's id is taken,
    /// `RepositoryError::NotFound` if an existing record has vanished, or
    /// `RepositoryError::Database` for other failures.
    async fn save(&self, address: &mut Address) -> Result<(), RepositoryError>;

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Address>, RepositoryError>;

    /// Check whether a record with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn id_exists(&self, id: &RecordId) -> Result<bool, RepositoryError>;

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store cannot be reached.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
