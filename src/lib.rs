//! scanty - URL shortener storage core
//!
//! Turns long URLs into short base62 codes backed by pluggable storage.
//!
//! # Architecture
//! - `utils`: base62 codec and expiry parsing
//! - `storage`: `LinkBackend` trait, relational / Redis / redb backends,
//!   background expiry cleaner
//! - `cache`: lookup-aside read cache
//! - `services`: id allocation and the `LinkService` facade
//! - `config`: TOML + environment configuration
//! - `system`: logging
//! - `interfaces`: CLI commands

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
