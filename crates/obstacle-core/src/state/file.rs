// # File Key-Value Store
//
// File-based implementation of KeyValueStore with crash safety.
//
// ## Layout
//
// One file per key inside a data directory:
//
// ```text
// <dir>/obstacles.json          current value
// <dir>/obstacles.json.tmp      in-flight write (removed by the rename)
// <dir>/obstacles.json.backup   previous value
// ```
//
// ## Crash Safety
//
// - Atomic writes: new value written to a temporary file, flushed, then renamed
// - Backup: the previous value is copied to `.backup` before each replace, so
//   an unreadable blob can still be recovered by hand

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::traits::KeyValueStore;

/// File-based key-value store
///
/// # Example
///
/// ```rust,no_run
/// use obstacle_core::state::FileKeyValueStore;
/// use obstacle_core::traits::KeyValueStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileKeyValueStore::new("/var/lib/obstacles").await?;
///
///     store.set("obstacles", "[]").await?;
///     assert_eq!(store.get("obstacles").await?.as_deref(), Some("[]"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    /// Serializes writes so two callers never share a temp file
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create data directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        tracing::debug!("Opened file store at {}", dir.display());

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the file holding `key`
    fn value_path(&self, key: &str) -> Result<PathBuf, Error> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        read_optional(&self.value_path(key)?).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.value_path(key)?;
        let temp_path = with_suffix(&path, "tmp");
        let _guard = self.write_lock.lock().await;

        // Write to temporary file first
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(value.as_bytes()).await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep the previous value around
        if path.exists() {
            let backup_path = with_suffix(&path, "backup");
            if let Err(e) = fs::copy(&path, &backup_path).await {
                tracing::warn!("Failed to create backup of {}: {}", path.display(), e);
            }
        }

        // Atomic rename (temp -> actual)
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::storage_write(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )));
        }

        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<(), Error> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(Error::config(format!("Invalid storage key: '{key}'")))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

async fn read_optional(path: &Path) -> Result<Option<String>, Error> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No value stored at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(Error::storage_read(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
