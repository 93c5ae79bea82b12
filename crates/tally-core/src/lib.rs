//! Core types and trait definitions for the Tally classroom point tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod leaderboard;
pub mod rank;
pub mod record;
pub mod seed;
pub mod stats;
pub mod store;
pub mod student;
pub mod template;

pub use error::{DomainError, Error, Result};
