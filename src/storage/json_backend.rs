use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use super::{KeyValueStore, Result};
use crate::errors::LedgerError;

const TMP_SUFFIX: &str = "tmp";

/// Key/value store persisted as one JSON object on disk.
///
/// Every write replaces the whole file through a temporary sibling and a rename,
/// so readers see either the previous or the next complete state.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data).map_err(|err| {
                    LedgerError::Storage(format!("store `{}` is corrupt: {err}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn commit(&mut self, staged: BTreeMap<String, String>) -> Result<()> {
        let previous = std::mem::replace(&mut self.entries, staged);
        if let Err(err) = self.persist() {
            self.entries = previous;
            return Err(err);
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut staged = self.entries.clone();
        staged.insert(key.to_string(), value);
        self.commit(staged)
    }

    fn set_many(&mut self, entries: Vec<(&'static str, String)>) -> Result<()> {
        let mut staged = self.entries.clone();
        for (key, value) in entries {
            staged.insert(key.to_string(), value);
        }
        self.commit(staged)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .set_many(vec![("budget", "5000".into()), ("goal18", "7".into())])
            .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("budget").unwrap().as_deref(), Some("5000"));
        assert_eq!(reopened.get("goal18").unwrap().as_deref(), Some("7"));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn failed_write_keeps_previous_state() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("budget", "100".into()).unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir_all(tmp_path(&path)).unwrap();
        assert!(store.set("budget", "200".into()).is_err());
        assert_eq!(store.get("budget").unwrap().as_deref(), Some("100"));

        let on_disk = JsonFileStore::open(&path).unwrap();
        assert_eq!(on_disk.get("budget").unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("corrupt"), "unexpected: {err}");
    }
}
