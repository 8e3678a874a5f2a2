//! TOML-persisted settings store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{Callback, SettingsStore, SubscriptionId, Subscribers};
use crate::config::write_atomic;
use crate::error::{GlyphError, Result};

/// Header comment prepended to saved settings files.
const SETTINGS_HEADER: &str = "# Glyph settings — written by glyph; values are integers (booleans are 0/1).\n\n";

/// Settings persisted as a flat TOML table of integers.
///
/// Every changing write is saved atomically before subscribers are notified.
/// External edits are picked up by [`FileStore::reload`].
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, i64>>,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = read_values(&path)?;
        Ok(Self {
            path,
            values: Mutex::new(values),
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of every stored value, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.lock().clone()
    }

    /// Re-read the file and notify subscribers of every key whose value
    /// changed (including removed keys). Returns the changed keys.
    pub fn reload(&self) -> Result<Vec<String>> {
        let fresh = read_values(&self.path)?;
        let changed = {
            let mut values = self.lock();
            let changed = diff_keys(&values, &fresh);
            *values = fresh;
            changed
        };
        for key in &changed {
            self.subscribers.notify(key);
        }
        Ok(changed)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, i64>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, values: &BTreeMap<String, i64>) -> std::io::Result<()> {
        let serialized = toml::to_string(values).map_err(std::io::Error::other)?;
        write_atomic(&self.path, &format!("{SETTINGS_HEADER}{serialized}"))
    }
}

impl SettingsStore for FileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.lock().get(key).copied()
    }

    fn put_int(&self, key: &str, value: i64) -> Result<()> {
        {
            let mut values = self.lock();
            if values.get(key) == Some(&value) {
                return Ok(());
            }
            let mut next = values.clone();
            next.insert(key.to_string(), value);
            self.save(&next)?;
            *values = next;
        }
        log::debug!("setting {key} = {value}");
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&self, filter: Option<&str>, callback: Callback) -> SubscriptionId {
        self.subscribers.add(filter, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, i64>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|e| {
            GlyphError::Settings(format!("cannot parse {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn diff_keys(old: &BTreeMap<String, i64>, new: &BTreeMap<String, i64>) -> Vec<String> {
    let mut changed: Vec<String> = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, _)| k.clone())
        .collect();
    changed.extend(old.keys().filter(|k| !new.contains_key(*k)).cloned());
    changed.sort();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::keys;
    use std::sync::Arc;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("settings.toml")).unwrap();
        assert!(store.snapshot().is_empty());
        assert!(!store.path().exists(), "open must not create the file");
    }

    #[test]
    fn put_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let store = FileStore::open(&path).unwrap();
        store.put_bool(keys::GLYPH_ENABLE, true).unwrap();
        store.put_int(keys::GLYPH_BRIGHTNESS, 2).unwrap();
        store.put_bool("com.example.chat", false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Glyph settings"));

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int(keys::GLYPH_ENABLE), Some(1));
        assert_eq!(reopened.get_int(keys::GLYPH_BRIGHTNESS), Some(2));
        assert_eq!(reopened.get_int("com.example.chat"), Some(0));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn failed_save_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let path = blocker.join("settings.toml");
        let store = FileStore::open(&path).unwrap();
        let notified = Arc::new(Mutex::new(0));
        let n = notified.clone();
        store.subscribe(None, Arc::new(move |_key: &str| *n.lock().unwrap() += 1));

        // A file where the parent directory should be makes every save fail.
        std::fs::write(&blocker, "").unwrap();
        assert!(store.put_bool(keys::GLYPH_ENABLE, true).is_err());
        assert_eq!(store.get_int(keys::GLYPH_ENABLE), None);
        assert_eq!(*notified.lock().unwrap(), 0);

        std::fs::remove_file(&blocker).unwrap();
        store.put_bool(keys::GLYPH_ENABLE, true).unwrap();
        assert!(path.exists(), "retried put must reach the disk");
        assert_eq!(*notified.lock().unwrap(), 1);
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int(keys::GLYPH_ENABLE), Some(1));
    }

    #[test]
    fn unparseable_file_is_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "glyph_enable = \"yes\"").unwrap();
        let err = FileStore::open(&path).err().unwrap();
        assert!(matches!(err, GlyphError::Settings(_)));
    }

    #[test]
    fn reload_reports_and_notifies_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "glyph_enable = 0\nglyph_brightness = 3\n").unwrap();
        let store = FileStore::open(&path).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        store.subscribe(
            None,
            Arc::new(move |key: &str| s.lock().unwrap().push(key.to_string())),
        );

        std::fs::write(&path, "glyph_enable = 1\nglyph_call_enable = 0\n").unwrap();
        let changed = store.reload().unwrap();
        assert_eq!(
            changed,
            [
                keys::GLYPH_BRIGHTNESS,
                keys::GLYPH_CALL_ENABLE,
                keys::GLYPH_ENABLE
            ]
        );
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert_eq!(store.get_int(keys::GLYPH_BRIGHTNESS), None);
    }

    #[test]
    fn reload_without_changes_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = FileStore::open(&path).unwrap();
        store.put_int(keys::GLYPH_BRIGHTNESS, 4).unwrap();
        assert!(store.reload().unwrap().is_empty());
    }

    #[test]
    fn unchanged_put_does_not_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = FileStore::open(&path).unwrap();
        store.put_int(keys::GLYPH_BRIGHTNESS, 4).unwrap();
        std::fs::remove_file(&path).unwrap();
        store.put_int(keys::GLYPH_BRIGHTNESS, 4).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn diff_keys_covers_added_changed_removed() {
        let old = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        let new = BTreeMap::from([("b".to_string(), 3), ("c".to_string(), 1)]);
        assert_eq!(diff_keys(&old, &new), ["a", "b", "c"]);
    }
}
