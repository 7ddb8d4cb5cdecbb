//! Share entities: public links and direct user shares.

pub mod link;
pub mod user_share;

pub use link::{CreateShareLink, LinkUse, ShareLink};
pub use user_share::{SharedFile, UpsertUserShare, UserShare};
