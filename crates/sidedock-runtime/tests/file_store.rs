//! Preferences persisted through `FileStorage` across manager lifetimes.

use sidedock_core::{BreakpointObserver, PanelId, Viewport};
use sidedock_runtime::{
    BackedPreferences, FileStorage, PanelConfig, PanelManager, PreferenceStore, StorageBackend,
};

const KEY: &str = "page-layout-sidebar-state";

fn build(storage: FileStorage, viewport: Viewport) -> (PanelManager, BreakpointObserver) {
    let observer = BreakpointObserver::min_width(900, viewport);
    let manager = PanelManager::builder()
        .panel(PanelConfig::new("left"))
        .panel(PanelConfig::new("right").default_collapsed(true))
        .observer(observer.clone())
        .storage(storage, KEY)
        .build()
        .unwrap();
    (manager, observer)
}

#[test]
fn preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    {
        let (manager, _) = build(storage.clone(), Viewport::new(1440, 900));
        assert_eq!(manager.get_visibility("right"), Ok(true));
        manager.toggle("left").unwrap();
        manager.toggle("right").unwrap();
    }

    let contents = std::fs::read_to_string(storage.path_for(KEY)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed, serde_json::json!({ "left": true, "right": false }));

    let (manager, _) = build(storage, Viewport::new(1440, 900));
    assert_eq!(manager.get_visibility("left"), Ok(true));
    assert_eq!(manager.get_visibility("right"), Ok(false));
}

#[test]
fn narrow_session_leaves_no_file_until_an_edge() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("nested"));

    let (manager, observer) = build(storage.clone(), Viewport::new(600, 900));
    manager.toggle("left").unwrap();
    assert!(!storage.path_for(KEY).exists());

    observer.set_viewport(Viewport::new(1200, 900));
    assert!(!storage.path_for(KEY).exists());

    observer.set_viewport(Viewport::new(600, 900));
    assert!(storage.path_for(KEY).exists());
}

#[test]
fn corrupted_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());
    storage.write(KEY, "not valid json {{{").unwrap();

    let (manager, _) = build(storage.clone(), Viewport::new(1440, 900));
    assert_eq!(manager.get_visibility("left"), Ok(false));
    assert_eq!(manager.get_visibility("right"), Ok(true));

    // The next write replaces the corrupt record wholesale.
    manager.toggle("left").unwrap();
    let prefs = BackedPreferences::new(storage, KEY);
    assert_eq!(prefs.get(&PanelId::left()).unwrap(), Some(true));
    assert_eq!(prefs.get(&PanelId::right()).unwrap(), None);
}

#[test]
fn reset_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let (manager, _) = build(storage.clone(), Viewport::new(1440, 900));
    manager.toggle("left").unwrap();
    assert!(storage.path_for(KEY).exists());
    manager.reset_preferences();
    assert!(!storage.path_for(KEY).exists());
}
