//! Route handlers organized by domain.

pub mod activity;
pub mod file;
pub mod folder;
pub mod health;
pub mod link;
pub mod public;
pub mod share;
pub mod tag;
pub mod user;
