//! Service layer
//!
//! `LinkService` ties the codec, id allocation, read cache and storage
//! backend together. Interfaces (CLI today) only talk to this layer.

mod id_source;
mod link_service;

pub use id_source::{IdSource, RandomIdSource};
pub use link_service::*;
