//! File-backed key/value storage used to hand the confirmation code from the
//! booking step to the receipt step.
//!
//! The store mirrors browser local storage: string keys, string values,
//! persisted on every write. It is a fallback channel only; an explicitly
//! passed confirmation code always wins (see [`resolve_confirmation_code`]).

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::{Error, Result};

/// Key under which the booking step leaves the confirmation code
pub const CONFIRMATION_CODE_KEY: &str = "bookingConfirmationCode";

#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Error::StorageError(format!("{} is not valid storage: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::StorageError(format!("Failed to read {}: {}", path.display(), e)))
            }
        };
        debug!("opened storage {} ({} items)", path.display(), items.len());
        Ok(Self { path, items })
    }

    /// Platform default location, e.g. `~/.local/share/booking-receipt/storage.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("booking-receipt").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.items.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let text = serde_json::to_string_pretty(&self.items)
            .map_err(|e| Error::StorageError(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| {
            Error::StorageError(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// Pick the confirmation code to show: a non-blank explicit code, else the
/// one stored under [`CONFIRMATION_CODE_KEY`].
pub fn resolve_confirmation_code(
    explicit: Option<&str>,
    storage: Option<&LocalStorage>,
) -> Option<String> {
    if let Some(code) = explicit.filter(|c| !c.trim().is_empty()) {
        return Some(code.to_string());
    }
    storage
        .and_then(|s| s.get_item(CONFIRMATION_CODE_KEY))
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::open(dir.path().join("none.json")).unwrap();
        assert!(store.get_item(CONFIRMATION_CODE_KEY).is_none());
    }

    #[test]
    fn items_persist_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let mut store = LocalStorage::open(&path).unwrap();
        store.set_item(CONFIRMATION_CODE_KEY, "RB-2024-001234").unwrap();

        let reopened = LocalStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item(CONFIRMATION_CODE_KEY), Some("RB-2024-001234"));

        let mut reopened = reopened;
        reopened.remove_item(CONFIRMATION_CODE_KEY).unwrap();
        assert!(LocalStorage::open(&path).unwrap().get_item(CONFIRMATION_CODE_KEY).is_none());
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(LocalStorage::open(&path), Err(Error::StorageError(_))));
    }

    #[test]
    fn explicit_code_wins_over_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStorage::open(dir.path().join("s.json")).unwrap();
        store.set_item(CONFIRMATION_CODE_KEY, "STORED").unwrap();

        let resolve = |explicit: Option<&str>| resolve_confirmation_code(explicit, Some(&store));
        assert_eq!(resolve(Some("EXPLICIT")).as_deref(), Some("EXPLICIT"));
        assert_eq!(resolve(Some("  ")).as_deref(), Some("STORED"));
        assert_eq!(resolve(None).as_deref(), Some("STORED"));
        assert_eq!(resolve_confirmation_code(None, None), None);
    }
}
