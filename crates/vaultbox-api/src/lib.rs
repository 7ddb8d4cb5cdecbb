//! # vaultbox-api
//!
//! HTTP API layer for Vaultbox built on Axum.
//!
//! Provides the REST endpoints, middleware (logging, CORS), the identity
//! extractors, DTOs, and the mapping from error kinds to status codes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
