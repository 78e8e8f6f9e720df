// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! On-disk storage for uploaded territory maps.
//!
//! Files are stored flat under one directory as `<unix-millis>_<name>`, where
//! `<name>` is the uploaded file name reduced to a safe character set. Stored
//! names never contain path separators, and lookups reject any name that does.

use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info};

/// A directory of uploaded map files.
#[derive(Debug, Clone)]
pub struct MapStore {
    root: PathBuf,
}

impl MapStore {
    /// Creates a store rooted at `root`. The directory is created on
    /// [`MapStore::ensure_dir`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Builds the stored name for an upload.
    #[must_use]
    pub fn stored_name(original: &str, now: OffsetDateTime) -> String {
        let millis: i128 = now.unix_timestamp_nanos() / 1_000_000;
        format!("{millis}_{}", sanitize_file_name(original))
    }

    /// Writes an upload and returns its stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(
        &self,
        original: &str,
        contents: &[u8],
        now: OffsetDateTime,
    ) -> io::Result<String> {
        let stored: String = Self::stored_name(original, now);
        tokio::fs::write(self.root.join(&stored), contents).await?;
        info!(file = %stored, bytes = contents.len(), "Stored map upload");
        Ok(stored)
    }

    /// Reads a stored map. Returns `None` for unknown or unsafe names.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn read(&self, file_name: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(file_name) else {
            return Ok(None);
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes a stored map. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unsafe or the file cannot be removed.
    pub async fn remove(&self, file_name: &str) -> io::Result<()> {
        let path: PathBuf = self.resolve(file_name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Refusing to remove '{file_name}'"),
            )
        })?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(file = %file_name, "Removed map file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let safe: bool = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\', '\0']);
        safe.then(|| self.root.join(file_name))
    }
}

/// Reduces a file name to ASCII letters, digits, `.`, `-`, and `_`.
///
/// Any directory part of the name is dropped first.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let base: &str = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned: &str = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        String::from("map")
    } else {
        cleaned.to_string()
    }
}

/// Returns the MIME type served for a stored map.
#[must_use]
pub fn content_type(file_name: &str) -> &'static str {
    let extension: String = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
