//! Access control resolution for files.

pub mod resolver;

pub use resolver::{AccessDecision, AccessResolver, AccessSource, LinkCredentials};
