//! [`SnapshotStore`] backed by a JSON file.
//!
//! Saves go to a sibling temporary file that is then renamed over the real
//! one, so a crash mid-write leaves the previous snapshot intact.

use crate::snapshot::Snapshot;
use crate::traits::SnapshotStore;
use chrono::Local;
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A snapshot stored as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

/// Errors produced by the JSON file store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `$XDG_DATA_HOME/launchgrid/board.json`, falling back to
    /// `~/.local/share`.
    pub fn default_path() -> PathBuf {
        let base = std::env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            format!("{}/.local/share", home)
        });
        PathBuf::from(base).join("launchgrid").join("board.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the stored snapshot, if any.
    pub fn reset(&self) -> Result<(), StoreError> {
        if self.exists() {
            fs::remove_file(&self.path)?;
            info!("removed {}", self.path.display());
        }
        Ok(())
    }

    /// Copy the stored snapshot next to itself as
    /// `<stem>_backup_<YYYYmmdd_HHMMSS>.json`, numbering backups taken within
    /// the same second.
    ///
    /// Returns the backup path, or `None` when there is nothing to back up.
    pub fn backup(&self) -> Result<Option<PathBuf>, StoreError> {
        if !self.exists() {
            return Ok(None);
        }
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "board".into());
        let base = format!("{}_backup_{}", stem, stamp);
        let mut target = self.path.with_file_name(format!("{}.json", base));
        let mut n = 1;
        while target.exists() {
            target = self.path.with_file_name(format!("{}-{}.json", base, n));
            n += 1;
        }
        fs::copy(&self.path, &target)?;
        info!("backed up snapshot to {}", target.display());
        Ok(Some(target))
    }

    fn read(&self) -> Result<Snapshot, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "board.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    type Error = StoreError;

    fn load(&self) -> Snapshot {
        if !self.exists() {
            info!("no snapshot at {}, starting empty", self.path.display());
            return Snapshot::default();
        }
        match self.read() {
            Ok(snapshot) => {
                info!(
                    "loaded {} item(s), {} group(s) from {}",
                    snapshot.apps.len(),
                    snapshot.groups.len(),
                    self.path.display()
                );
                snapshot
            }
            Err(e) => {
                warn!("unreadable snapshot {}: {}", self.path.display(), e);
                Snapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("saved snapshot to {}", self.path.display());
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::item::{GridPosition, Group, Item};

    fn sample() -> Snapshot {
        let item = Item::new("Mail", "Mail", "com.apple.mail", "/Applications/Mail.app");
        let grouped = Item::new("Notes", "Notes", "com.apple.notes", "/Applications/Notes.app");
        let board = Board::new(
            vec![item],
            vec![Group::new("Work", vec![grouped], GridPosition::new(0, 3, 0))],
        );
        Snapshot::capture(&board, 1)
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("board.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.load(), Snapshot::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("board.json"));
        let snapshot = sample();
        store.save(&snapshot).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.groups[0].items[0].name, "Notes");
        assert!(!store.temp_path().exists(), "temporary file renamed away");
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("board.json"));
        store.save(&sample()).unwrap();
        store.save(&Snapshot::default()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn reset_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("board.json"));
        assert_eq!(store.backup().unwrap(), None);
        store.save(&sample()).unwrap();

        let backup = store.backup().unwrap().expect("backup path");
        assert!(backup.exists());
        assert_eq!(JsonFileStore::new(&backup).load(), store.load());

        store.reset().unwrap();
        assert!(!store.exists());
        store.reset().unwrap();
    }

    #[test]
    fn backups_in_quick_succession_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("board.json"));
        store.save(&sample()).unwrap();
        let first = store.backup().unwrap().expect("first backup");
        store.save(&Snapshot::default()).unwrap();
        let second = store.backup().unwrap().expect("second backup");
        let third = store.backup().unwrap().expect("third backup");

        assert_ne!(first, second);
        assert_ne!(second, third);
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("board_backup_"), "{name}");
        assert_eq!(JsonFileStore::new(&first).load().apps.len(), 1);
        assert!(JsonFileStore::new(&second).load().is_empty());
    }
}
