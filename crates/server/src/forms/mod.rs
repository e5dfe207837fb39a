//! Forms that validate client input and apply it to records.
//!
//! A form wraps a target record, holds the raw submitted values, validates
//! them, and on success copies them onto the record and persists it.
//! The save step can be wrapped by [`Interceptor`]s.

pub mod address_upsert;

use async_trait::async_trait;
use thiserror::Error;

use address_api_core::ValidationErrors;

use crate::db::{AddressStore, RepositoryError};
use crate::models::Address;

pub use address_upsert::{AddressUpsert, AddressUpsertRequest};

/// Errors returned from submitting a form.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// One or more fields failed validation; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Wraps the save step of a form submission.
///
/// Interceptors run in the order given; the first one is outermost. Each one
/// must call [`Next::run`] to continue the chain, and may do work before or
/// after it, or return early to skip the save.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Handle the record, delegating to `next` to continue.
    async fn intercept(&self, address: &mut Address, next: Next<'_>) -> Result<(), SubmitError>;
}

/// The remainder of an interceptor chain, ending in the store save.
pub struct Next<'a> {
    chain: &'a [&'a dyn Interceptor],
    store: &'a dyn AddressStore,
}

impl<'a> Next<'a> {
    pub(crate) const fn new(chain: &'a [&'a dyn Interceptor], store: &'a dyn AddressStore) -> Self {
        Self { chain, store }
    }

    /// Run the rest of the chain.
    ///
    /// # Errors
    ///
    /// Returns whatever an interceptor or the store returns.
    pub async fn run(self, address: &mut Address) -> Result<(), SubmitError> {
        match self.chain.split_first() {
            Some((first, rest)) => {
                first
                    .intercept(address, Next::new(rest, self.store))
                    .await
            }
            None => Ok(self.store.save(address).await?),
        }
    }
}
