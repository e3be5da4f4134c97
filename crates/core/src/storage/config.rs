//! Storage configuration types.

use std::path::PathBuf;

use filedrop_shared::{NamingScheme, StorageSettings};

/// File store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Uploads directory.
    pub root: PathBuf,
    /// Stored filename scheme.
    pub naming: NamingScheme,
}

impl StorageConfig {
    /// Create a config rooted at `root` with the default naming scheme.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            naming: NamingScheme::default(),
        }
    }

    /// Set the naming scheme.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(&settings.uploads_dir).with_naming(settings.naming)
    }
}
