//! Shared configuration and error types for Filedrop.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, NamingScheme, ServerConfig, StorageSettings};
pub use error::AppError;
