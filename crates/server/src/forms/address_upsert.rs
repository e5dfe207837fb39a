//! Create-or-update form for [`Address`] records.

use serde::Deserialize;

use address_api_core::validation::{self, FieldError};
use address_api_core::{RecordId, ValidationErrors};

use super::{Interceptor, Next, SubmitError};
use crate::db::AddressStore;
use crate::models::Address;

/// Maximum length of street, city and state.
const MAX_TEXT_LENGTH: usize = 255;
/// Maximum length of zip code and country.
const MAX_CODE_LENGTH: usize = 6;

/// Raw request body for creating or updating an address.
///
/// Every field is optional so that a partial body only overrides the fields
/// it names; anything missing keeps the record's current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpsertRequest {
    pub id: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Upsert (create/update) form for an [`Address`].
///
/// The form starts out holding the record's current values. Load a request
/// on top of them, then [`submit`](Self::submit).
pub struct AddressUpsert<'a> {
    store: &'a dyn AddressStore,
    address: &'a mut Address,

    pub id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl<'a> AddressUpsert<'a> {
    /// Create a form for `address`, prefilled with its current values.
    pub fn new(store: &'a dyn AddressStore, address: &'a mut Address) -> Self {
        Self {
            id: address.id().map(ToString::to_string).unwrap_or_default(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
            store,
            address,
        }
    }

    /// Overwrite form fields with the values present in `request`.
    pub fn load(&mut self, request: AddressUpsertRequest) {
        let AddressUpsertRequest {
            id,
            street,
            city,
            state,
            zip_code,
            country,
        } = request;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(street) = street {
            self.street = street;
        }
        if let Some(city) = city {
            self.city = city;
        }
        if let Some(state) = state {
            self.state = state;
        }
        if let Some(zip_code) = zip_code {
            self.zip_code = zip_code;
        }
        if let Some(country) = country {
            self.country = country;
        }
    }

    /// Validate the form fields.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Validation` with the first failure of each
    /// field, or `SubmitError::Repository` if the id uniqueness lookup fails.
    pub async fn validate(&self) -> Result<(), SubmitError> {
        let mut errors = ValidationErrors::new();

        errors.check("id", self.validate_id().await?);
        errors.check("street", required_text(&self.street, MAX_TEXT_LENGTH));
        errors.check("city", required_text(&self.city, MAX_TEXT_LENGTH));
        errors.check("state", required_text(&self.state, MAX_TEXT_LENGTH));
        errors.check("zipCode", required_text(&self.zip_code, MAX_CODE_LENGTH));
        errors.check("country", required_text(&self.country, MAX_CODE_LENGTH));

        errors.into_result().map_err(SubmitError::from)
    }

    /// Validate the id field.
    ///
    /// New records accept an optional client id of exactly the default
    /// length that is well formed and not yet taken. Existing records only
    /// accept their own id.
    async fn validate_id(&self) -> Result<Result<(), FieldError>, SubmitError> {
        if self.id.is_empty() {
            return Ok(Ok(()));
        }

        if !self.address.is_new() {
            let current = self.address.id().map(RecordId::as_str).unwrap_or_default();
            return Ok(validation::one_of(&self.id, &[current]));
        }

        let format = validation::length(
            &self.id,
            RecordId::DEFAULT_LENGTH,
            RecordId::DEFAULT_LENGTH,
        )
        .and_then(|()| validation::id_format(&self.id));
        if format.is_err() {
            return Ok(format);
        }

        let id = RecordId::parse(&self.id).map_err(|_| SubmitError::from(invalid_id()))?;
        if self.store.id_exists(&id).await? {
            return Ok(Err(FieldError::InvalidId));
        }

        Ok(Ok(()))
    }

    /// Validate the form and persist the record.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Validation` without touching the record if any
    /// field is invalid, or `SubmitError::Repository` if the store fails.
    pub async fn submit(self) -> Result<(), SubmitError> {
        self.submit_with(&[]).await
    }

    /// Validate the form and persist the record through `interceptors`.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit), plus any error an interceptor returns.
    pub async fn submit_with(self, interceptors: &[&dyn Interceptor]) -> Result<(), SubmitError> {
        self.validate().await?;

        // Custom ids can only be set on create
        if self.address.is_new() && !self.id.is_empty() {
            let id = RecordId::parse(&self.id).map_err(|_| SubmitError::from(invalid_id()))?;
            self.address.set_id(id);
        }

        self.address.street = self.street;
        self.address.city = self.city;
        self.address.state = self.state;
        self.address.zip_code = self.zip_code;
        self.address.country = self.country;

        tracing::debug!(
            id = ?self.address.id(),
            is_new = self.address.is_new(),
            "Saving address"
        );

        Next::new(interceptors, self.store).run(self.address).await
    }
}

/// Required field with a length limit.
fn required_text(value: &str, max: usize) -> Result<(), FieldError> {
    validation::required(value).and_then(|()| validation::length(value, 1, max))
}

/// Validation errors flagging the id field.
fn invalid_id() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check("id", Err(FieldError::InvalidId));
    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::db::{MemoryAddressStore, RepositoryError};

    fn valid_request() -> AddressUpsertRequest {
        AddressUpsertRequest {
            id: None,
            street: Some("742 Evergreen Terrace".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("Oregon".to_string()),
            zip_code: Some("97403".to_string()),
            country: Some("US".to_string()),
        }
    }

    async fn submit(
        store: &MemoryAddressStore,
        address: &mut Address,
        request: AddressUpsertRequest,
    ) -> Result<(), SubmitError> {
        let mut form = AddressUpsert::new(store, address);
        form.load(request);
        form.submit().await
    }

    fn field_errors(err: SubmitError) -> ValidationErrors {
        match err {
            SubmitError::Validation(errors) => errors,
            SubmitError::Repository(e) => panic!("expected validation error, got {e}"),
        }
    }

    #[tokio::test]
    async fn test_create_valid() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();

        submit(&store, &mut address, valid_request()).await.unwrap();

        assert!(!address.is_new());
        assert_eq!(address.street, "742 Evergreen Terrace");
        assert_eq!(address.city, "Springfield");
        assert_eq!(address.state, "Oregon");
        assert_eq!(address.zip_code, "97403");
        assert_eq!(address.country, "US");
        let stored = store.find_by_id(address.id().unwrap()).await.unwrap();
        assert_eq!(stored, Some(address));
    }

    #[tokio::test]
    async fn test_create_missing_fields() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();

        let err = submit(&store, &mut address, AddressUpsertRequest::default())
            .await
            .unwrap_err();

        let errors = field_errors(err);
        for field in ["street", "city", "state", "zipCode", "country"] {
            assert_eq!(errors.get(field), Some(&FieldError::Required), "{field}");
        }
        assert!(errors.get("id").is_none());
    }

    #[tokio::test]
    async fn test_create_empty_string_fields() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            country: Some(String::new()),
            ..valid_request()
        };

        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("country"), Some(&FieldError::Required));
    }

    #[tokio::test]
    async fn test_create_zip_too_long() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            zip_code: Some("1234567".to_string()),
            ..valid_request()
        };

        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());
        assert_eq!(
            errors.get("zipCode"),
            Some(&FieldError::LengthOutOfRange { min: 1, max: 6 })
        );
    }

    #[tokio::test]
    async fn test_create_street_too_long() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            street: Some("a".repeat(256)),
            ..valid_request()
        };

        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());
        assert_eq!(
            errors.get("street"),
            Some(&FieldError::LengthOutOfRange { min: 1, max: 255 })
        );
    }

    #[tokio::test]
    async fn test_create_custom_id() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            id: Some("abcdefghij12345".to_string()),
            ..valid_request()
        };

        submit(&store, &mut address, request).await.unwrap();

        assert_eq!(address.id().unwrap().as_str(), "abcdefghij12345");
    }

    #[tokio::test]
    async fn test_create_custom_id_wrong_length() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            id: Some("short".to_string()),
            ..valid_request()
        };

        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());
        assert_eq!(
            errors.get("id"),
            Some(&FieldError::LengthInvalid { len: 15 })
        );
    }

    #[tokio::test]
    async fn test_create_custom_id_bad_format() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            id: Some("abcdefg.ij12345".to_string()),
            ..valid_request()
        };

        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());
        assert_eq!(errors.get("id"), Some(&FieldError::MatchInvalid));
    }

    #[tokio::test]
    async fn test_create_custom_id_taken() {
        let store = MemoryAddressStore::new();
        let request = AddressUpsertRequest {
            id: Some("abcdefghij12345".to_string()),
            ..valid_request()
        };
        let mut first = Address::new();
        submit(&store, &mut first, request.clone()).await.unwrap();

        let mut second = Address::new();
        let errors = field_errors(submit(&store, &mut second, request).await.unwrap_err());
        assert_eq!(errors.get("id"), Some(&FieldError::InvalidId));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_validation_failure_leaves_record_untouched() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let request = AddressUpsertRequest {
            zip_code: Some("1234567".to_string()),
            ..valid_request()
        };

        submit(&store, &mut address, request).await.unwrap_err();

        assert_eq!(address, Address::new());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_applies_fields() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        submit(&store, &mut address, valid_request()).await.unwrap();
        let id = address.id().cloned().unwrap();
        let created = address.created();

        let request = AddressUpsertRequest {
            id: Some(id.to_string()),
            city: Some("Shelbyville".to_string()),
            ..AddressUpsertRequest::default()
        };
        submit(&store, &mut address, request).await.unwrap();

        assert_eq!(address.id(), Some(&id));
        assert_eq!(address.created(), created);
        assert_eq!(address.city, "Shelbyville");
        assert_eq!(address.street, "742 Evergreen Terrace");
    }

    #[tokio::test]
    async fn test_update_different_id_rejected() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        submit(&store, &mut address, valid_request()).await.unwrap();
        let before = address.clone();

        let request = AddressUpsertRequest {
            id: Some("zzzzzzzzzzzzzzz".to_string()),
            city: Some("Shelbyville".to_string()),
            ..AddressUpsertRequest::default()
        };
        let errors = field_errors(submit(&store, &mut address, request).await.unwrap_err());

        assert_eq!(errors.get("id"), Some(&FieldError::InInvalid));
        assert_eq!(address, before);
    }

    #[tokio::test]
    async fn test_update_without_id_allowed() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        submit(&store, &mut address, valid_request()).await.unwrap();
        let id = address.id().cloned();

        let request = AddressUpsertRequest {
            id: Some(String::new()),
            country: Some("CA".to_string()),
            ..AddressUpsertRequest::default()
        };
        submit(&store, &mut address, request).await.unwrap();

        assert_eq!(address.id().cloned(), id);
        assert_eq!(address.country, "CA");
    }

    struct Counting(AtomicUsize);

    #[async_trait]
    impl Interceptor for Counting {
        async fn intercept(
            &self,
            address: &mut Address,
            next: Next<'_>,
        ) -> Result<(), SubmitError> {
            assert!(address.is_new());
            next.run(address).await?;
            assert!(!address.is_new());
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Reject;

    #[async_trait]
    impl Interceptor for Reject {
        async fn intercept(
            &self,
            _address: &mut Address,
            _next: Next<'_>,
        ) -> Result<(), SubmitError> {
            Err(RepositoryError::Conflict("rejected".to_owned()).into())
        }
    }

    #[tokio::test]
    async fn test_interceptors_wrap_save() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let outer = Counting(AtomicUsize::new(0));
        let inner = Counting(AtomicUsize::new(0));

        let mut form = AddressUpsert::new(&store, &mut address);
        form.load(valid_request());
        form.submit_with(&[&outer, &inner]).await.unwrap();

        assert_eq!(outer.0.load(Ordering::SeqCst), 1);
        assert_eq!(inner.0.load(Ordering::SeqCst), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_interceptor_can_short_circuit() {
        let store = MemoryAddressStore::new();
        let mut address = Address::new();
        let counting = Counting(AtomicUsize::new(0));

        let mut form = AddressUpsert::new(&store, &mut address);
        form.load(valid_request());
        let err = form.submit_with(&[&Reject, &counting]).await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Repository(RepositoryError::Conflict(_))
        ));
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);
        assert!(store.is_empty().await);
    }
}
