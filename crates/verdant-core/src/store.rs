//! JSON state files holding one plant's [`Snapshot`].
//!
//! A state file is the CLI's stand-in for the backend: every mutation runs
//! under an exclusive lock as load → one mutator → save, mirroring the
//! "one confirmed response, one mutator call" rule hosts follow.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::datekey::DateKeyer;
use crate::lock::StateLock;
use crate::model::Snapshot;
use crate::timeline::Timeline;

/// Default time to wait for another writer.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Read a snapshot. A missing file is an empty plant.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        debug!(path = %path.display(), "state file missing, starting empty");
        return Ok(Snapshot::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a snapshot atomically (temp file + rename).
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp = sibling(path, ".tmp");
    let body = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!(path = %path.display(), "state file saved");
    Ok(())
}

/// Lock file path for a state file: `<name>.lock` beside it.
#[must_use]
pub fn lock_path(path: &Path) -> PathBuf {
    sibling(path, ".lock")
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map_or_else(OsString::new, OsString::from);
    name.push(suffix);
    path.with_file_name(name)
}

/// A plant state file plus the settings needed to open it.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    keyer: DateKeyer,
    lock_timeout: Duration,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>, keyer: DateKeyer) -> Self {
        Self {
            path: path.into(),
            keyer,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn keyer(&self) -> &DateKeyer {
        &self.keyer
    }

    /// Load without locking, for read-only commands.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be read or parsed.
    pub fn open(&self) -> Result<Timeline> {
        Ok(Timeline::from_snapshot(self.keyer, load_snapshot(&self.path)?))
    }

    /// Apply one mutation under the write lock and persist the result.
    ///
    /// If `mutate` fails nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the mutator's error (usually a
    /// [`TimelineError`](crate::error::TimelineError)), a lock
    /// timeout, or any load/save failure.
    pub fn update<T, E>(&self, mutate: impl FnOnce(&mut Timeline) -> Result<T, E>) -> Result<T>
    where
        E: Into<anyhow::Error>,
    {
        let lock = StateLock::acquire(&lock_path(&self.path), self.lock_timeout)?;
        let mut timeline = self.open()?;
        let out = mutate(&mut timeline).map_err(Into::<anyhow::Error>::into)?;
        save_snapshot(&self.path, &timeline.snapshot())?;
        lock.release();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, TimelineError};
    use crate::model::{EventType, Note, parse_timestamp};
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().expect("tempdir");
        let snapshot = load_snapshot(&dir.path().join("none.json")).expect("load");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write");
        let err = load_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn update_persists_mutation() {
        let dir = TempDir::new().expect("tempdir");
        let state = StateFile::new(dir.path().join("plant.json"), DateKeyer::utc());
        let at = parse_timestamp("2024-03-01T20:00:00Z").expect("ts");

        state
            .update(|timeline| {
                timeline.add_event(EventType::Water, at);
                Ok::<_, TimelineError>(())
            })
            .expect("update");

        let reopened = state.open().expect("open");
        assert_eq!(reopened.last_event(EventType::Water), Some(at));
        assert!(!dir.path().join("plant.json.tmp").exists());
    }

    #[test]
    fn failed_mutation_writes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("plant.json");
        let state = StateFile::new(&path, DateKeyer::utc());
        let at = parse_timestamp("2024-03-01T20:00:00Z").expect("ts");

        let err = state
            .update(|timeline| timeline.edit_note(&at, "nothing here"))
            .unwrap_err();
        let err = err.downcast_ref::<TimelineError>().expect("timeline error");
        assert_eq!(err.code(), ErrorCode::NoteNotFound);
        assert!(!path.exists());

        state
            .update(|timeline| timeline.add_note(Note::new(at, "real")))
            .expect("add");
        assert_eq!(state.open().expect("open").notes().len(), 1);
    }

    #[test]
    fn held_lock_blocks_writer() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("plant.json");
        let state = StateFile::new(&path, DateKeyer::utc()).with_lock_timeout(Duration::from_millis(30));
        let _held = StateLock::acquire(&lock_path(&path), Duration::from_millis(50)).expect("lock");

        let err = state
            .update(|_| Ok::<_, TimelineError>(()))
            .unwrap_err();
        assert!(err.downcast_ref::<crate::lock::LockError>().is_some());
    }

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(lock_path(Path::new("/tmp/fern.json")), PathBuf::from("/tmp/fern.json.lock"));
    }
}
