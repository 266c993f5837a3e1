//! Key-value persistence for portal state.
//!
//! Each slot holds one JSON document that is rewritten whole whenever the
//! matching collection changes.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Named storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    User,
    Activities,
    Submissions,
    Messages,
    Events,
    Theme,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::User,
        Slot::Activities,
        Slot::Submissions,
        Slot::Messages,
        Slot::Events,
        Slot::Theme,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::User => "user",
            Slot::Activities => "activities",
            Slot::Submissions => "submissions",
            Slot::Messages => "messages",
            Slot::Events => "events",
            Slot::Theme => "theme",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage backend for the portal's slots.
pub trait SlotStore: Send + Sync {
    /// Read a slot; `None` if it was never written.
    fn load(&self, slot: Slot) -> Result<Option<String>>;

    /// Overwrite a slot.
    fn save(&self, slot: Slot, value: &str) -> Result<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    fn remove(&self, slot: Slot) -> Result<()>;

    /// Copy the current contents of a slot aside before it gets replaced.
    /// Returns a description of where the copy went.
    fn backup(&self, slot: Slot) -> Result<String>;
}

/// In-process store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
    backups: Mutex<Vec<(Slot, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a slot, for assertions.
    pub fn get(&self, slot: Slot) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&slot)
            .cloned()
    }

    /// Every backup taken of `slot`, oldest first.
    pub fn backups(&self, slot: Slot) -> Vec<String> {
        self.backups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, raw)| raw.clone())
            .collect()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, slot: Slot) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(slots.get(&slot).cloned())
    }

    fn save(&self, slot: Slot, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        slots.remove(&slot);
        Ok(())
    }

    fn backup(&self, slot: Slot) -> Result<String> {
        let raw = self.load(slot)?.unwrap_or_default();
        let mut backups = self
            .backups
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        backups.push((slot, raw));
        Ok(format!("memory backup #{} of `{slot}`", backups.len()))
    }
}

/// One `<slot>.json` file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }
}

impl SlotStore for FileStore {
    fn load(&self, slot: Slot) -> Result<Option<String>> {
        let path = self.path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn save(&self, slot: Slot, value: &str) -> Result<()> {
        let path = self.path(slot);
        // Write then rename so a crash never leaves a half-written slot
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        let path = self.path(slot);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
        }
    }

    /// Copies `<slot>.json` to `<slot>.<timestamp>.json.bak`, keeping older backups.
    fn backup(&self, slot: Slot) -> Result<String> {
        let path = self.path(slot);
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f");
        let target = self.dir.join(format!("{}.{stamp}.json.bak", slot.key()));
        std::fs::copy(&path, &target).with_context(|| {
            format!("failed to back up {} to {}", path.display(), target.display())
        })?;
        Ok(target.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.load(Slot::Theme).unwrap(), None);
        store.save(Slot::Theme, "\"dark\"").unwrap();
        assert_eq!(store.load(Slot::Theme).unwrap().as_deref(), Some("\"dark\""));
        store.remove(Slot::Theme).unwrap();
        assert_eq!(store.load(Slot::Theme).unwrap(), None);
    }

    #[test]
    fn file_store_writes_one_file_per_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        store.save(Slot::Submissions, "[]").unwrap();
        store.save(Slot::Messages, "[1]").unwrap();

        assert!(dir.path().join("data/submissions.json").exists());
        assert_eq!(store.load(Slot::Messages).unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.load(Slot::Events).unwrap(), None);
        assert!(!dir.path().join("data/submissions.json.tmp").exists());
    }

    #[test]
    fn file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.remove(Slot::User).unwrap();
        store.save(Slot::User, "{}").unwrap();
        store.remove(Slot::User).unwrap();
        assert_eq!(store.load(Slot::User).unwrap(), None);
    }

    #[test]
    fn memory_store_keeps_backups() {
        let store = MemoryStore::new();
        store.save(Slot::Events, "[broken").unwrap();
        store.backup(Slot::Events).unwrap();
        store.save(Slot::Events, "[]").unwrap();

        assert_eq!(store.backups(Slot::Events), vec!["[broken".to_string()]);
        assert!(store.backups(Slot::Messages).is_empty());
    }

    #[test]
    fn memory_store_get_survives_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.save(Slot::Theme, "\"dark\"").unwrap();

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.slots.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(store.slots.is_poisoned());
        assert_eq!(store.get(Slot::Theme).as_deref(), Some("\"dark\""));
    }

    #[test]
    fn file_store_backup_copies_slot_aside() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.save(Slot::Submissions, "not json").unwrap();

        let target = store.backup(Slot::Submissions).unwrap();
        store.save(Slot::Submissions, "[]").unwrap();

        assert!(target.ends_with(".json.bak"));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "not json");
        assert!(store.backup(Slot::Messages).is_err());
    }

    #[test]
    fn slot_keys() {
        let keys: Vec<&str> = Slot::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            ["user", "activities", "submissions", "messages", "events", "theme"]
        );
    }
}
