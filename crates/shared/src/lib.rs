//! Shared types, errors, and configuration for Matchbook.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes and decimal amount formatting
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use crate::config::AppConfig;
pub use crate::error::{AppError, AppResult};
