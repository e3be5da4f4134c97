//! Flat-directory file storage for uploads.
//!
//! Every uploaded file lives directly inside a single root directory under a
//! server-generated name (`<millis>-<original name>`). The directory listing
//! is the only index: nothing is cached in memory.
//!
//! # Layout
//!
//! ```text
//! uploads/
//! ├── 1718000000000-hello.txt
//! ├── 1718000000042-report.pdf
//! └── 1718000000042-3fa85f64-report.pdf   (same name, same millisecond)
//! ```
//!
//! Names coming back from clients are confined to the root: only a single
//! normal path component is accepted, and the resolved path must stay inside
//! the canonical root.

mod config;
mod error;
mod name;
mod service;

pub use config::StorageConfig;
pub use error::StorageError;
pub use name::{original_basename, stored_name, suffixed_name, validate_stored_name};
pub use service::{FileDownload, FileStore, StoredFile};
