//! Common utilities shared across services.
//!
//! This crate provides:
//! - Unified error handling for HTTP handlers and services
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
