//! Integration tests: settings changes driving the services end to end.
//!
//! These tests wire a persisted settings store, recording service handles and
//! a sysfs LED writer on temporary files, and check that each settings change
//! leaves the services and the brightness node in the expected state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glyph_lib::controller::{GlyphController, Preference};
use glyph_lib::led::mock::RecordingLed;
use glyph_lib::led::{Brightness, SysfsLed};
use glyph_lib::reconcile;
use glyph_lib::service::{ServiceAction, ServiceKind};
use glyph_lib::service::mock::recording_set;
use glyph_lib::settings::{FileStore, SettingsStore, keys};
use glyph_lib::state::DesiredState;
use glyph_lib::watcher::{self, ChangeSignal, SettingsWatcher};

const LEVELS: [u32; 4] = [100, 200, 300, 400];

/// Helper: LED nodes in `dir`, both present.
fn sysfs_led(dir: &tempfile::TempDir) -> (SysfsLed, PathBuf) {
    let brightness = dir.path().join("global_brightness");
    let single = dir.path().join("single_led_br");
    std::fs::write(&brightness, "0").unwrap();
    std::fs::write(&single, "").unwrap();
    (SysfsLed::new(brightness.clone(), single, LEVELS), brightness)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Test: controller toggles through a persisted store ──

#[test]
fn toggle_sequence_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("settings.toml")).unwrap();
    let (led, brightness) = sysfs_led(&dir);
    let (set, handles) = recording_set();
    let ctl = GlyphController::new(&store, &set, &led);

    // 1. Master on with defaults
    ctl.set_master(true).unwrap();
    assert_eq!(handles.running(), [false, true, true, false]);
    assert_eq!(read(&brightness), "300");

    // 2. Charging indicator on, brightness to max
    ctl.set_preference(Preference::Charging, 1).unwrap();
    ctl.set_preference(Preference::Brightness, 4).unwrap();
    assert!(handles.charging.is_running());
    assert_eq!(read(&brightness), "400");

    // 3. Master off stops everything and leaves the node alone
    std::fs::write(&brightness, "untouched").unwrap();
    ctl.set_master(false).unwrap();
    assert_eq!(handles.running(), [false; 4]);
    assert_eq!(read(&brightness), "untouched");

    // 4. Values survive a reopen
    let reopened = FileStore::open(store.path()).unwrap();
    let state = DesiredState::capture(&reopened);
    assert!(!state.master_enabled);
    assert!(reopened.get_bool(keys::GLYPH_CHARGING_LEVEL_ENABLE, false));
    assert_eq!(reopened.get_int(keys::GLYPH_BRIGHTNESS), Some(4));
}

// ── Test: external edits picked up by the watcher trigger reconciliation ──

#[test]
fn external_edit_reconciles_via_subscription() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("settings.toml")).unwrap();
    let (led, brightness) = sysfs_led(&dir);
    let (set, handles) = recording_set();

    let signal = ChangeSignal::subscribe(&store, None);
    let mut watcher = SettingsWatcher::new(&store);

    std::fs::write(
        store.path(),
        "glyph_enable = 1\nglyph_flip_enable = 1\nglyph_call_enable = 0\nglyph_brightness = 1\n",
    )
    .unwrap();

    let changed = watcher.poll(&store).unwrap();
    assert_eq!(changed.len(), 4);
    assert!(signal.take());

    reconcile::reconcile_store(&store, &set, &led);
    assert!(handles.flip.is_running());
    assert!(!handles.call.is_running());
    assert!(handles.notifications.is_running());
    assert_eq!(read(&brightness), "100");
}

// ── Test: watch loop reconciles on external edits and stops on shutdown ──

#[test]
fn watch_loop_follows_edits_and_stops_services() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let store = FileStore::open(&path).unwrap();
    let led = RecordingLed::new();
    let (set, handles) = recording_set();
    let running = Arc::new(AtomicBool::new(true));

    let editor = {
        let running = running.clone();
        let path = path.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            // Replace the file in one step so the loop never sees half a write.
            let tmp = path.with_extension("edit");
            std::fs::write(&tmp, "glyph_enable = 1\nglyph_charging_level_enable = 1\n").unwrap();
            std::fs::rename(&tmp, &path).unwrap();
            std::thread::sleep(Duration::from_millis(300));
            running.store(false, Ordering::SeqCst);
        })
    };

    let mut plans = Vec::new();
    watcher::watch(
        &store,
        &set,
        &led,
        Duration::from_millis(10),
        &running,
        |plan| plans.push(*plan),
    );
    editor.join().unwrap();

    // Initial reconcile (glyph off), then one for the edit.
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].brightness, None);
    assert_eq!(plans[1].brightness, Some(Brightness::clamped(3)));
    assert_eq!(plans[1].action(ServiceKind::Charging), ServiceAction::Start);
    assert_eq!(led.levels(), [3]);

    // Clearing the flag stopped everything.
    assert_eq!(handles.running(), [false; 4]);
    assert_eq!(
        *handles.charging.calls.borrow(),
        [ServiceAction::Stop, ServiceAction::Start, ServiceAction::Stop]
    );
}

// ── Test: missing LED node does not stop reconciliation ──

#[test]
fn missing_led_node_is_non_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let led = SysfsLed::new(
        dir.path().join("absent_brightness"),
        dir.path().join("absent_single"),
        LEVELS,
    );
    let (set, handles) = recording_set();
    let state = DesiredState {
        master_enabled: true,
        charging_enabled: true,
        call_enabled: true,
        notifs_enabled: true,
        flip_enabled: true,
        brightness: Brightness::clamped(2),
    };

    let plan = reconcile::reconcile(&state, &set, &led);
    assert_eq!(plan.brightness, Some(Brightness::clamped(2)));
    assert_eq!(handles.running(), [true; 4]);
    assert!(!dir.path().join("absent_brightness").exists());
}

// ── Test: repeated reconciliation converges ──

#[test]
fn repeated_reconcile_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("settings.toml")).unwrap();
    store.put_bool(keys::GLYPH_ENABLE, true).unwrap();
    store.put_bool(keys::GLYPH_CHARGING_LEVEL_ENABLE, true).unwrap();
    let (led, _) = sysfs_led(&dir);
    let (set, handles) = recording_set();

    let first = reconcile::reconcile_store(&store, &set, &led);
    let running = handles.running();
    for _ in 0..5 {
        let again = reconcile::reconcile_store(&store, &set, &led);
        assert_eq!(again, first);
        assert_eq!(handles.running(), running);
    }
    for kind in ServiceKind::ALL {
        assert_eq!(handles.get(kind).calls.borrow().len(), 6);
    }
}
