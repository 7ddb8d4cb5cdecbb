//! Activity log entities.

pub mod model;

pub use model::{Activity, ActivityAction, CreateActivity, ResourceType};
