//! Activity log recording and queries.

pub mod logger;
pub mod service;

pub use logger::ActivityLogger;
pub use service::ActivityService;
