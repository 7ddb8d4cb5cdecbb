//! File entities.

pub mod model;
pub mod tag;

pub use model::{CreateFile, File, MediaCategory};
pub use tag::TagCount;
