//! Permission entities.

pub mod model;

pub use model::{GrantPermission, Permission, PermissionSet};
