//! File-backed pointer store.
//!
//! The pointer lives in a single small JSON file. Every call takes a
//! process-wide mutex for its own duration only. Writes go to a temporary
//! file in the same directory that is then renamed over the target, so a
//! reader never observes a half-written pointer.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fl_types::Address;
use tracing::debug;

use crate::error::{PointerError, Result};
use crate::traits::PointerStore;
use crate::types::Pointer;

/// A [`PointerStore`] persisted as `{"address": "..."}` in one file.
///
/// All I/O is synchronous and runs on the calling thread, including the
/// `fsync` on every write. Each call touches one small file.
#[derive(Debug)]
pub struct FilePointerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePointerStore {
    /// Use the pointer file at `path`. The file need not exist yet; its
    /// parent directory is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_unlocked(&self) -> Result<Option<Pointer>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let pointer = serde_json::from_slice(&raw).map_err(|e| PointerError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(pointer))
    }

    fn write_unlocked(&self, pointer: &Pointer) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut encoded = serde_json::to_vec(pointer)
            .map_err(|e| PointerError::Serialization(e.to_string()))?;
        encoded.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PointerError::Io(e.error))?;

        debug!(path = %self.path.display(), address = %pointer.address, "pointer written");
        Ok(())
    }
}

impl PointerStore for FilePointerStore {
    fn read(&self) -> Result<Option<Pointer>> {
        let _guard = self.lock.lock().map_err(|_| PointerError::LockPoisoned)?;
        self.read_unlocked()
    }

    fn write(&self, pointer: &Pointer) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| PointerError::LockPoisoned)?;
        self.write_unlocked(pointer)
    }

    fn compare_and_swap(&self, expected: Option<&Address>, new: &Pointer) -> Result<bool> {
        let _guard = self.lock.lock().map_err(|_| PointerError::LockPoisoned)?;
        let current = self.read_unlocked()?;
        if current.as_ref().map(Pointer::address) != expected {
            debug!(
                expected = ?expected,
                current = ?current.as_ref().map(Pointer::address),
                "pointer moved; swap refused"
            );
            return Ok(false);
        }
        self.write_unlocked(new)?;
        Ok(true)
    }
}
