//! CLI command implementations.

pub mod member;
pub mod migrate;
