//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod file;
pub mod folder;
pub mod link;
pub mod user;
pub mod user_share;

pub use activity::ActivityRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use link::ShareLinkRepository;
pub use user::UserRepository;
pub use user_share::UserShareRepository;
