//! Cascade Officials Core - Shared types library.
//!
//! This crate provides common types used across all Cascade Officials
//! components:
//! - `site` - Public website and members portal
//! - `cli` - Command-line tools for migrations and member management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, and the
//!   [`types::Role`] privilege hierarchy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
