//! Settings-file watching — turn external edits of the settings file into
//! change notifications on the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::led::LedWriter;
use crate::reconcile::{self, ReconcilePlan};
use crate::service::ServiceSet;
use crate::settings::{FileStore, SettingsStore, SubscriptionId};

/// Identity of the file contents as far as polling can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

fn stamp(store: &FileStore) -> Option<Stamp> {
    std::fs::metadata(store.path()).ok().map(|m| Stamp {
        modified: m.modified().ok(),
        len: m.len(),
    })
}

/// Polls a [`FileStore`]'s file and reloads it when it changed on disk.
///
/// Reloading notifies the store's subscribers for each changed key; writes
/// made through the store itself produce no notifications on reload.
///
/// A change is detected by modification time and length only. On filesystems
/// with coarse timestamps, an edit that keeps the length and lands within the
/// same timestamp tick as the previous one is not seen until the next edit.
#[derive(Debug)]
pub struct SettingsWatcher {
    last: Option<Stamp>,
}

impl SettingsWatcher {
    /// Start watching from the file's current state.
    pub fn new(store: &FileStore) -> Self {
        Self { last: stamp(store) }
    }

    /// Check the file once. Returns the keys that changed since the last
    /// reload (empty if the file is untouched).
    pub fn poll(&mut self, store: &FileStore) -> Result<Vec<String>> {
        let current = stamp(store);
        if current == self.last {
            return Ok(Vec::new());
        }
        self.last = current;
        let changed = store.reload()?;
        if !changed.is_empty() {
            log::info!("settings changed: {}", changed.join(", "));
        }
        Ok(changed)
    }
}

/// Subscription that raises a flag on every change; the owner consumes it
/// with [`ChangeSignal::take`] and reconciles.
pub struct ChangeSignal {
    id: SubscriptionId,
    flag: Arc<AtomicBool>,
}

impl ChangeSignal {
    /// Subscribe to `filter` (`None` = every key) on `store`.
    pub fn subscribe(store: &dyn SettingsStore, filter: Option<&str>) -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();
        let id = store.subscribe(
            filter,
            Arc::new(move |_key: &str| f.store(true, Ordering::SeqCst)),
        );
        Self { id, flag }
    }

    /// Whether a change arrived since the last call; clears the flag.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }

    pub fn unsubscribe(self, store: &dyn SettingsStore) -> bool {
        store.unsubscribe(self.id)
    }
}

/// Reconcile once, then after every settings change picked up from disk,
/// until `running` is cleared. Every service is stopped before returning.
///
/// `on_reconcile` receives each applied plan. An unreadable settings file is
/// logged and the last good values stay in effect.
pub fn watch(
    store: &FileStore,
    services: &ServiceSet,
    led: &dyn LedWriter,
    interval: Duration,
    running: &AtomicBool,
    mut on_reconcile: impl FnMut(&ReconcilePlan),
) {
    let signal = ChangeSignal::subscribe(store, None);
    let mut watcher = SettingsWatcher::new(store);

    on_reconcile(&reconcile::reconcile_store(store, services, led));

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(interval);
        if let Err(e) = watcher.poll(store) {
            log::warn!("{e}");
            continue;
        }
        if signal.take() {
            on_reconcile(&reconcile::reconcile_store(store, services, led));
        }
    }

    signal.unsubscribe(store);
    log::info!("stopping all glyph services");
    services.stop_all();
}
