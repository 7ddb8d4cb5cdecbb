//! # vaultbox-core
//!
//! Core crate for Vaultbox. Contains the unified error system, configuration
//! schemas, typed identifiers, pagination and sorting types, and the object
//! store contract implemented by `vaultbox-storage`.
//!
//! This crate has **no** internal dependencies on other Vaultbox crates.

pub mod config;
pub mod error;
pub mod result;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
