pub mod base62;
pub mod expiry;

pub use base62::{decode, encode};
pub use expiry::parse_expires;
