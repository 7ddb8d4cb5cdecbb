//! Folder entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolder, Folder, ROOT_PATH};
pub use tree::{FolderNode, FolderTree};
