//! Domain models for the address API.

pub mod address;

pub use address::Address;
