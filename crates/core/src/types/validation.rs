//! Field validation rules and error collection.
//!
//! Rules are plain functions returning `Result<(), FieldError>` so they can be
//! chained with `and_then`; the first failing rule wins. Every rule except
//! [`required`] treats an empty value as valid, so optional fields only need
//! `required` dropped from their chain.
//!
//! ```
//! use address_api_core::validation::{self, ValidationErrors};
//!
//! let zip = "1234567";
//! let mut errors = ValidationErrors::new();
//! errors.check(
//!     "zipCode",
//!     validation::required(zip).and_then(|()| validation::length(zip, 1, 6)),
//! );
//! assert!(errors.into_result().is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::id::RecordId;

/// A single field-level validation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Value is empty but required.
    #[error("Cannot be blank.")]
    Required,
    /// Length falls outside an inclusive range.
    #[error("The length must be between {min} and {max}.")]
    LengthOutOfRange {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// Length differs from the single allowed length.
    #[error("The length must be exactly {len}.")]
    LengthInvalid {
        /// Required length.
        len: usize,
    },
    /// Value does not have the expected format.
    #[error("Must be in a valid format.")]
    MatchInvalid,
    /// Value is not one of the allowed values.
    #[error("Must be a valid value.")]
    InInvalid,
    /// Record id is malformed or already taken.
    #[error("The model id is invalid or already exists.")]
    InvalidId,
}

impl FieldError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required => "validation_required",
            Self::LengthOutOfRange { .. } => "validation_length_out_of_range",
            Self::LengthInvalid { .. } => "validation_length_invalid",
            Self::MatchInvalid => "validation_match_invalid",
            Self::InInvalid => "validation_in_invalid",
            Self::InvalidId => "validation_invalid_id",
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Field errors collected from validating a form, keyed by JSON field name.
///
/// Only the first error for each field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, FieldError>);

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of validating `field`.
    pub fn check(&mut self, field: &'static str, result: Result<(), FieldError>) {
        if let Err(err) = result {
            self.0.entry(field).or_insert(err);
        }
    }

    /// Returns the error recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields that failed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over failing fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.0.iter().map(|(field, err)| (*field, err))
    }

    /// Convert into a `Result`, failing if any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, err)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Fails when the value is empty.
///
/// # Errors
///
/// Returns [`FieldError::Required`] for an empty string.
pub fn required(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

/// Checks that the character count lies within `min..=max`.
///
/// Empty values pass.
///
/// # Errors
///
/// Returns [`FieldError::LengthInvalid`] when `min == max`, otherwise
/// [`FieldError::LengthOutOfRange`].
pub fn length(value: &str, min: usize, max: usize) -> Result<(), FieldError> {
    if value.is_empty() {
        return Ok(());
    }

    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else if min == max {
        Err(FieldError::LengthInvalid { len: min })
    } else {
        Err(FieldError::LengthOutOfRange { min, max })
    }
}

/// Checks that the value is a well-formed [`RecordId`].
///
/// Empty values pass.
///
/// # Errors
///
/// Returns [`FieldError::MatchInvalid`] if the value has a reserved character.
pub fn id_format(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Ok(());
    }
    RecordId::check_format(value).map_err(|_| FieldError::MatchInvalid)
}

/// Checks that the value is one of `allowed`.
///
/// Empty values pass.
///
/// # Errors
///
/// Returns [`FieldError::InInvalid`] when the value is not listed.
pub fn one_of(value: &str, allowed: &[&str]) -> Result<(), FieldError> {
    if value.is_empty() || allowed.contains(&value) {
        Ok(())
    } else {
        Err(FieldError::InInvalid)
    }
}
