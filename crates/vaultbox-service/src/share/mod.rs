//! Sharing: public links and direct user shares.

pub mod link;
pub mod token;
pub mod user_share;

pub use link::{CreateLinkRequest, LinkService};
pub use token::TokenGenerator;
pub use user_share::ShareService;
