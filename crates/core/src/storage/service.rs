//! File store implementation over the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use filedrop_shared::NamingScheme;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::config::StorageConfig;
use super::error::StorageError;
use super::name::{
    original_basename, random_suffix, stored_name, suffixed_name, validate_stored_name,
};

/// Read buffer size when copying an upload body to disk.
const COPY_BUF_LEN: usize = 64 * 1024;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated name inside the uploads directory.
    pub name: String,
    /// Number of bytes written.
    pub size: u64,
}

/// An opened file, ready to be streamed to a client.
#[derive(Debug)]
pub struct FileDownload {
    /// Stored name.
    pub name: String,
    /// File size in bytes at open time.
    pub size: u64,
    /// Open handle positioned at the start of the file.
    pub file: File,
}

/// Uploads directory and the operations allowed on it.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    naming: NamingScheme,
}

impl FileStore {
    /// Create the uploads directory if needed and open a store on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or resolved.
    pub async fn open(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.root)
            .await
            .map_err(|e| StorageError::io("create", e))?;
        let root = fs::canonicalize(&config.root)
            .await
            .map_err(|e| StorageError::io("create", e))?;

        info!(root = %root.display(), naming = ?config.naming, "Uploads directory ready");

        Ok(Self {
            root,
            naming: config.naming,
        })
    }

    /// Canonical uploads directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream `body` to disk under a name generated from `original_name`
    /// and the current time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `original_name` has no usable file name,
    /// `Body` if reading `body` fails, or `Io` if the file cannot be written.
    pub async fn save<R>(&self, original_name: &str, body: R) -> Result<StoredFile, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        self.save_at(Utc::now().timestamp_millis(), original_name, body)
            .await
    }

    /// Stream `body` to disk as if uploaded at `millis`.
    ///
    /// Files are created exclusively before any byte is read: when the
    /// generated name is already taken, one retry is made with a random
    /// suffix.
    pub(crate) async fn save_at<R>(
        &self,
        millis: i64,
        original_name: &str,
        body: R,
    ) -> Result<StoredFile, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let original = original_basename(original_name)?;
        let name = match self.naming {
            NamingScheme::Timestamp => stored_name(millis, original),
            NamingScheme::TimestampWithSuffix => suffixed_name(millis, &random_suffix(), original),
        };

        let (name, file) = match self.create_new(&name).await {
            Ok(file) => (name, file),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let retry = suffixed_name(millis, &random_suffix(), original);
                warn!(taken = %name, file = %retry, "Stored name collision, using suffix");
                let file = self
                    .create_new(&retry)
                    .await
                    .map_err(|e| StorageError::classify("write", &retry, e))?;
                (retry, file)
            }
            Err(e) => return Err(StorageError::classify("write", &name, e)),
        };

        let size = self.fill(&name, file, body).await?;

        debug!(file = %name, size, "File written");

        Ok(StoredFile { name, size })
    }

    async fn create_new(&self, name: &str) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(name))
            .await
    }

    /// Copy `body` into the freshly created `file`, removing it on failure.
    async fn fill<R>(&self, name: &str, mut file: File, mut body: R) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let copied = async {
            let mut buf = vec![0u8; COPY_BUF_LEN];
            let mut size = 0u64;
            loop {
                let n = body.read(&mut buf).await.map_err(StorageError::body)?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n])
                    .await
                    .map_err(|e| StorageError::classify("write", name, e))?;
                size += n as u64;
            }
            file.sync_all()
                .await
                .map_err(|e| StorageError::classify("write", name, e))?;
            Ok::<u64, StorageError>(size)
        }
        .await;

        if copied.is_err() {
            drop(file);
            if let Err(cleanup) = fs::remove_file(self.root.join(name)).await {
                warn!(file = %name, error = %cleanup, "Failed to remove partial upload");
            }
        }

        copied
    }

    /// Names of all entries in the uploads directory, in directory order.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io("list", e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io("list", e))?
        {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(name = ?raw, "Skipping non UTF-8 file name"),
            }
        }

        Ok(names)
    }

    /// Open a stored file for reading.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `name` escapes the uploads directory,
    /// `NotFound` if no such file exists, or `Io` on other failures.
    pub async fn open_file(&self, name: &str) -> Result<FileDownload, StorageError> {
        let path = self.resolve(name).await?;

        let file = File::open(&path)
            .await
            .map_err(|e| StorageError::classify("read", name, e))?;
        let meta = file
            .metadata()
            .await
            .map_err(|e| StorageError::classify("read", name, e))?;

        if !meta.is_file() {
            return Err(StorageError::not_found(name));
        }

        Ok(FileDownload {
            name: name.to_string(),
            size: meta.len(),
            file,
        })
    }

    /// Remove a stored file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `name` is not a plain file name, `NotFound` if
    /// no such file exists, or `Io` if removal fails.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let name = validate_stored_name(name)?;

        fs::remove_file(self.root.join(name))
            .await
            .map_err(|e| StorageError::classify("delete", name, e))
    }

    /// Resolve `name` to a canonical path inside the root.
    async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let name = validate_stored_name(name)?;

        let resolved = fs::canonicalize(self.root.join(name))
            .await
            .map_err(|e| StorageError::classify("read", name, e))?;

        if !resolved.starts_with(&self.root) {
            warn!(file = %name, "Rejected path outside uploads directory");
            return Err(StorageError::invalid_name(name));
        }

        Ok(resolved)
    }
}
