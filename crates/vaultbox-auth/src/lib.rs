//! # vaultbox-auth
//!
//! Identity and authorization for Vaultbox.
//!
//! ## Modules
//!
//! - `jwt`: decoding identity tokens issued by the external identity provider
//! - `password`: Argon2id hashing for share link passwords
//! - `access`: the access control resolver, the single authority deciding
//!   what a requester may do with a file

pub mod access;
pub mod jwt;
pub mod password;

pub use access::{AccessDecision, AccessResolver, AccessSource, LinkCredentials};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::LinkPasswordHasher;
