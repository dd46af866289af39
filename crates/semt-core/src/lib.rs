//! # semt-core
//!
//! Core crate for the Semt notification fan-out service. Contains
//! configuration schemas, typed identifiers, the profile-store trait,
//! pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Semt crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
