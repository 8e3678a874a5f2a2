//! In-memory settings store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Callback, SettingsStore, SubscriptionId, Subscribers};

/// Settings held in memory only. Used in tests and as a scratch store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, i64>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `values` (no notifications).
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.values.lock().unwrap_or_else(|e| e.into_inner());
            for (k, v) in values {
                map.insert(k.to_string(), v);
            }
        }
        store
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }

    fn put_int(&self, key: &str, value: i64) -> crate::error::Result<()> {
        let previous = self
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        if previous != Some(value) {
            self.subscribers.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self, filter: Option<&str>, callback: Callback) -> SubscriptionId {
        self.subscribers.add(filter, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::keys;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Callback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let cb: Callback = Arc::new(move |key: &str| s.lock().unwrap().push(key.to_string()));
        (seen, cb)
    }

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        store.put_int(keys::GLYPH_BRIGHTNESS, 4).unwrap();
        assert_eq!(store.get_int(keys::GLYPH_BRIGHTNESS), Some(4));
        assert_eq!(store.get_int(keys::GLYPH_ENABLE), None);
    }

    #[test]
    fn put_notifies_on_change_only() {
        let store = MemoryStore::new();
        let (seen, cb) = recorder();
        store.subscribe(None, cb);

        store.put_bool(keys::GLYPH_ENABLE, true).unwrap();
        store.put_bool(keys::GLYPH_ENABLE, true).unwrap();
        store.put_bool(keys::GLYPH_ENABLE, false).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            [keys::GLYPH_ENABLE, keys::GLYPH_ENABLE]
        );
    }

    #[test]
    fn filtered_subscription_ignores_other_keys() {
        let store = MemoryStore::new();
        let (seen, cb) = recorder();
        store.subscribe(Some(keys::GLYPH_NOTIFS_ENABLE), cb);

        store.put_bool(keys::GLYPH_CALL_ENABLE, false).unwrap();
        store.put_bool(keys::GLYPH_NOTIFS_ENABLE, false).unwrap();

        assert_eq!(*seen.lock().unwrap(), [keys::GLYPH_NOTIFS_ENABLE]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = MemoryStore::new();
        let (seen, cb) = recorder();
        let id = store.subscribe(None, cb);
        assert!(store.unsubscribe(id));
        store.put_int(keys::GLYPH_BRIGHTNESS, 1).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn callback_may_read_store() {
        let store = Arc::new(MemoryStore::new());
        let seen = Arc::new(Mutex::new(None));
        let (s, st) = (seen.clone(), Arc::downgrade(&store));
        store.subscribe(
            None,
            Arc::new(move |key: &str| {
                if let Some(st) = st.upgrade() {
                    *s.lock().unwrap() = st.get_int(key);
                }
            }),
        );
        store.put_int(keys::GLYPH_BRIGHTNESS, 2).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(2));
    }

    #[test]
    fn with_values_prepopulates() {
        let store = MemoryStore::with_values([(keys::GLYPH_ENABLE, 1), (keys::GLYPH_BRIGHTNESS, 4)]);
        assert_eq!(store.len(), 2);
        assert!(store.get_bool(keys::GLYPH_ENABLE, false));
    }
}
