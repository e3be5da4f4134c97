//! Core storage logic for Filedrop.
//!
//! This crate owns the uploads directory and has ZERO web dependencies.
//!
//! # Modules
//!
//! - `storage` - Flat-directory file store: naming, confinement, I/O

pub mod storage;
