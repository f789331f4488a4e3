//! Core domain + application logic for the anonymous comment bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and Postgres
//! live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod targets;

pub use errors::{Error, Result};
