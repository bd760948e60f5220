//! # fitpet
//!
//! The Fitpet application: HTTP API and CLI over `fitpet-core`.

pub mod api;
pub mod catalog;
pub mod cli;
mod error;

pub use error::AppError;
