use crate::error::SnapshotError;
use crate::models::SanctionRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::info;

/// Single-slot byte store backing the record snapshot.
///
/// `write` must replace the slot atomically: a concurrent `read` sees either
/// the previous content or the new content in full, never a partial write.
pub trait SnapshotStore: Send + Sync {
    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError>;
    fn read(&self) -> Result<Vec<u8>, SnapshotError>;
    fn exists(&self) -> bool;
    fn age(&self) -> Result<Duration, SnapshotError>;
    fn delete(&self) -> Result<(), SnapshotError>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        write_atomically(&self.path, bytes)
    }

    fn read(&self) -> Result<Vec<u8>, SnapshotError> {
        fs::read(&self.path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => SnapshotError::Missing,
            _ => SnapshotError::Io(error),
        })
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn age(&self) -> Result<Duration, SnapshotError> {
        let modified = fs::metadata(&self.path)?.modified()?;
        // An mtime in the future counts as brand new.
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }

    fn delete(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(SnapshotError::InvalidPath(path.to_path_buf())),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    file.persist(path).map_err(|error| SnapshotError::Io(error.error))?;
    Ok(())
}

#[derive(Debug, Clone)]
struct MemorySlot {
    bytes: Vec<u8>,
    written_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<MemorySlot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_written_at(&self, written_at: DateTime<Utc>) {
        if let Some(slot) = self.lock().as_mut() {
            slot.written_at = written_at;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<MemorySlot>> {
        // A panicking writer never leaves a half-filled slot behind.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let slot = MemorySlot {
            bytes: bytes.to_vec(),
            written_at: Utc::now(),
        };
        *self.lock() = Some(slot);
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>, SnapshotError> {
        self.lock()
            .as_ref()
            .map(|slot| slot.bytes.clone())
            .ok_or(SnapshotError::Missing)
    }

    fn exists(&self) -> bool {
        self.lock().is_some()
    }

    fn age(&self) -> Result<Duration, SnapshotError> {
        let written_at = self
            .lock()
            .as_ref()
            .map(|slot| slot.written_at)
            .ok_or(SnapshotError::Missing)?;
        Ok((Utc::now() - written_at).to_std().unwrap_or(Duration::ZERO))
    }

    fn delete(&self) -> Result<(), SnapshotError> {
        *self.lock() = None;
        Ok(())
    }
}

pub struct SnapshotCache<S: SnapshotStore> {
    store: Arc<S>,
    freshness_window: Duration,
}

impl<S: SnapshotStore> Clone for SnapshotCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            freshness_window: self.freshness_window,
        }
    }
}

impl<S: SnapshotStore> SnapshotCache<S> {
    pub fn new(store: Arc<S>, freshness_window: Duration) -> Self {
        Self {
            store,
            freshness_window,
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    pub fn is_valid(&self) -> bool {
        if !self.store.exists() {
            return false;
        }

        self.store
            .age()
            .map(|age| age < self.freshness_window)
            .unwrap_or(false)
    }

    pub fn load(&self) -> Result<Vec<SanctionRecord>, SnapshotError> {
        let bytes = self.store.read()?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn clear(&self) -> Result<(), SnapshotError> {
        self.store.delete()?;
        info!("sdn snapshot cleared");
        Ok(())
    }
}

pub(crate) fn persist_records<S: SnapshotStore + ?Sized>(
    store: &S,
    records: &[SanctionRecord],
) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec_pretty(records)?;
    store.write(&bytes)?;
    info!(record_count = records.len(), bytes = bytes.len(), "sdn snapshot written");
    Ok(())
}
