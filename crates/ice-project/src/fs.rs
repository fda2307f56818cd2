//! Local file system storage

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::collab::Storage;

/// [`Storage`] on the local file system
///
/// Writes go through a temporary sibling file and a rename, so a crash
/// never leaves a half-written document behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Create file system storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        ensure_parent(path)?;
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        let mut file = File::create(temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(temp_path, path)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        ensure_parent(to)?;
        fs::copy(from, to).map(|_| ())
    }
}
