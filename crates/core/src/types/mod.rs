//! Core types for the Address API.
//!
//! This module provides type-safe wrappers and validation rules for the
//! address domain.

pub mod id;
pub mod validation;

pub use id::{RecordId, RecordIdError};
pub use validation::{FieldError, ValidationErrors};
