//! # vaultbox-entity
//!
//! Domain entity models for Vaultbox. Every struct in this crate represents
//! a database table row or a domain value object. Table rows additionally
//! derive `sqlx::FromRow`.

pub mod activity;
pub mod file;
pub mod folder;
pub mod permission;
pub mod share;
pub mod user;
