//! Settings store — integer-valued key/value settings with change subscriptions.
//!
//! Values are stored as integers the way secure settings are: booleans are
//! `0`/`1`, brightness is the raw level. Every write that changes a value
//! notifies the subscribers whose filter matches the key.

mod file;
mod memory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Setting keys and their defaults.
pub mod keys {
    pub const GLYPH_ENABLE: &str = "glyph_enable";
    pub const GLYPH_FLIP_ENABLE: &str = "glyph_flip_enable";
    pub const GLYPH_BRIGHTNESS: &str = "glyph_brightness";
    pub const GLYPH_NOTIFS_ENABLE: &str = "glyph_notifs_enable";
    pub const GLYPH_CALL_ENABLE: &str = "glyph_call_enable";
    pub const GLYPH_CHARGING_LEVEL_ENABLE: &str = "glyph_charging_level_enable";

    pub const DEFAULT_GLYPH_ENABLE: bool = false;
    pub const DEFAULT_FLIP_ENABLE: bool = false;
    pub const DEFAULT_NOTIFS_ENABLE: bool = true;
    pub const DEFAULT_CALL_ENABLE: bool = true;
    pub const DEFAULT_CHARGING_LEVEL_ENABLE: bool = false;
    /// Per-app notification keys (the package name) default to enabled.
    pub const DEFAULT_APP_ENABLE: bool = true;

    /// Keys owned by the light itself (everything else is a package name).
    pub const ALL: [&str; 6] = [
        GLYPH_ENABLE,
        GLYPH_FLIP_ENABLE,
        GLYPH_BRIGHTNESS,
        GLYPH_NOTIFS_ENABLE,
        GLYPH_CALL_ENABLE,
        GLYPH_CHARGING_LEVEL_ENABLE,
    ];
}

/// Change callback, invoked with the key that changed.
pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Key/value settings with change notification.
pub trait SettingsStore {
    /// Raw stored value, `None` if never written.
    fn get_int(&self, key: &str) -> Option<i64>;

    /// Store a value. Subscribers are notified only if the value changed.
    fn put_int(&self, key: &str, value: i64) -> crate::error::Result<()>;

    /// Register `callback` for changes to `filter` (`None` = every key).
    fn subscribe(&self, filter: Option<&str>, callback: Callback) -> SubscriptionId;

    /// Remove a subscription. Returns false if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_int(key).map(|v| v != 0).unwrap_or(default)
    }

    fn put_bool(&self, key: &str, value: bool) -> crate::error::Result<()> {
        self.put_int(key, i64::from(value))
    }
}

struct Subscription {
    id: SubscriptionId,
    filter: Option<String>,
    callback: Callback,
}

/// Subscriber registry shared by the store implementations.
///
/// Callbacks run outside the registry lock, so a callback may read the store
/// or (un)subscribe without deadlocking.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    list: Mutex<Vec<Subscription>>,
}

impl Subscribers {
    fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.list.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn add(&self, filter: Option<&str>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription {
            id,
            filter: filter.map(str::to_string),
            callback,
        });
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut list = self.lock();
        let before = list.len();
        list.retain(|s| s.id != id);
        list.len() != before
    }

    pub(crate) fn notify(&self, key: &str) {
        let matching: Vec<Callback> = self
            .lock()
            .iter()
            .filter(|s| s.filter.as_deref().is_none_or(|f| f == key))
            .map(|s| s.callback.clone())
            .collect();
        for callback in matching {
            callback(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
