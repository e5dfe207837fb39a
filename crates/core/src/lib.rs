//! Address API Core - Shared types library.
//!
//! This crate provides common types used across all Address API components:
//! - `server` - HTTP API serving the `/address` endpoints
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation rules - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Record identifiers and field validation rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
