//! Rolodex Core - Shared types library.
//!
//! This crate provides common types used across all Rolodex components:
//! - `contacts` - Contacts JSON API with token authentication
//! - `quotes` - Server-rendered authors and quotes site
//! - `cli` - Command-line tools for migrations and seeding
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
