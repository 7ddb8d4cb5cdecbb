//! # vaultbox-service
//!
//! Business logic service layer for Vaultbox. Each service orchestrates the
//! structured stores, the object store, and the access resolver to implement
//! one area of the drive.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. The acting identity is passed
//! explicitly into every call as a [`RequestContext`].

pub mod activity;
pub mod context;
pub mod file;
pub mod folder;
pub mod share;
pub mod user;

pub use activity::{ActivityLogger, ActivityService};
pub use context::RequestContext;
pub use file::{ContentService, FileService, SearchService, TagService, UploadService};
pub use folder::{FolderService, TreeService};
pub use share::{LinkService, ShareService, TokenGenerator};
pub use user::UserService;
