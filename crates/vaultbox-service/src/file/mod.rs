//! File services: records, uploads, search, tags, and content access.

pub mod content;
pub mod delete;
pub mod search;
pub mod service;
pub mod tags;
pub mod upload;

pub use content::ContentService;
pub use delete::FileDeleter;
pub use search::SearchService;
pub use service::{BulkFailure, BulkOutcome, FileService, RecordUpload};
pub use tags::TagService;
pub use upload::UploadService;
