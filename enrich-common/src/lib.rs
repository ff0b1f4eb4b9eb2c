//! # Enrich Common Library
//!
//! Shared code for the enrich service crates:
//! - Error type used by storage and configuration code
//! - Bootstrap configuration (TOML file + compiled defaults)
//! - SQLite database initialization
//! - The `Person` row model

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use error::{Error, Result};
