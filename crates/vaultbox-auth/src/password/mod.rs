//! Password hashing for share links.

pub mod hasher;

pub use hasher::LinkPasswordHasher;
