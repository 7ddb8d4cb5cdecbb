//! User directory maintenance.

pub mod service;

pub use service::UserService;
