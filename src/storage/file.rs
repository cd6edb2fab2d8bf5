//! Directory-backed storage.
//!
//! Layout:
//! ```text
//! <path>/
//!     LOCK            -- held exclusively while a FileStorage is open
//!     <key>.json      -- one file per key, replaced atomically
//! ```

use super::KeyValueStorage;
use crate::error::{CartError, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::fmt::Write as _;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Extension for value files.
const VALUE_EXTENSION: &str = "json";

/// Extension for in-progress writes.
const TEMP_EXTENSION: &str = "tmp";

/// Stores each key in its own file under a directory.
///
/// Only one `FileStorage` may hold a directory at a time, so the cart record
/// has a single writer.
pub struct FileStorage {
    path: PathBuf,

    /// Lock file for exclusive access.
    _lock_file: File,
}

impl FileStorage {
    /// Open (creating if needed) the storage directory at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;

        let lock_file = Self::acquire_lock(&path)?;

        Ok(Self {
            path,
            _lock_file: lock_file,
        })
    }

    /// Base directory of this storage.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the file holding `key`.
    pub fn value_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self
            .path
            .join(format!("{}.{}", encode_key(key)?, VALUE_EXTENSION)))
    }

    /// Write `value` to `temp_path`, then move it over `final_path`.
    fn write_replace(temp_path: &Path, final_path: &Path, value: &str) -> Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        // Rename is atomic on the same filesystem.
        fs::rename(temp_path, final_path)?;
        Ok(())
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_path = path.join("LOCK");
        let lock_file = File::create(lock_path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| CartError::Locked)?;

        Ok(lock_file)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.value_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let final_path = self.value_path(key)?;
        let temp_path = final_path.with_extension(TEMP_EXTENSION);

        let result = Self::write_replace(&temp_path, &final_path, value);
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

/// Map a key onto a portable file name.
///
/// Alphanumerics, `-`, `_` and `@` pass through; every other byte becomes
/// `%XX`.
fn encode_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(CartError::InvalidKey("key is empty".into()));
    }

    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'@') {
            encoded.push(byte as char);
        } else {
            // Writing to a String cannot fail.
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    Ok(encoded)
}
