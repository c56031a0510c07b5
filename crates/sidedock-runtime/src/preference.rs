//! Per-panel collapsed preferences.
//!
//! A [`PreferenceStore`] remembers, per [`PanelId`], the last collapsed flag
//! the user chose while the layout was wide. The default persistent store,
//! [`BackedPreferences`], keeps every panel under a single storage key as a
//! flat JSON object:
//!
//! ```json
//! { "left": false, "right": true }
//! ```
//!
//! Reads are best-effort: a missing key, an unreadable backend, or a
//! malformed record all resolve to "no preference". Entries whose value is
//! not a boolean are dropped individually.
//!
//! # Backends
//!
//! - [`MemoryStorage`]: process-local key/value map; clones share contents.
//! - [`FileStorage`]: one `<key>.json` file per key in a directory, written
//!   with a temp-file-then-rename so a crash never leaves a torn record.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sidedock_core::PanelId;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "page-layout-sidebar-state";

// ── Store ────────────────────────────────────────────────────────────────

/// Remembers the user's collapsed choice per panel.
pub trait PreferenceStore {
    /// The stored flag for `panel`, or `None` when nothing was recorded.
    fn get(&self, panel: &PanelId) -> StorageResult<Option<bool>>;

    /// Record `collapsed` for `panel`.
    fn set(&mut self, panel: &PanelId, collapsed: bool) -> StorageResult<()>;

    /// Forget every recorded preference.
    fn clear(&mut self) -> StorageResult<()>;
}

/// In-memory [`PreferenceStore`]. Clones share the same entries, so a host
/// can keep a handle after giving one to a manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    entries: Rc<RefCell<BTreeMap<PanelId, bool>>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a preference.
    #[must_use]
    pub fn with(self, panel: impl Into<PanelId>, collapsed: bool) -> Self {
        self.entries.borrow_mut().insert(panel.into(), collapsed);
        self
    }

    /// Copy of all recorded entries.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PanelId, bool> {
        self.entries.borrow().clone()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, panel: &PanelId) -> StorageResult<Option<bool>> {
        Ok(self.entries.borrow().get(panel).copied())
    }

    fn set(&mut self, panel: &PanelId, collapsed: bool) -> StorageResult<()> {
        self.entries.borrow_mut().insert(panel.clone(), collapsed);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, panel: &PanelId) -> StorageResult<Option<bool>> {
        (**self).get(panel)
    }

    fn set(&mut self, panel: &PanelId, collapsed: bool) -> StorageResult<()> {
        (**self).set(panel, collapsed)
    }

    fn clear(&mut self) -> StorageResult<()> {
        (**self).clear()
    }
}

// ── Record ───────────────────────────────────────────────────────────────

/// The persisted form of all preferences under one storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceRecord {
    entries: BTreeMap<PanelId, bool>,
}

impl PreferenceRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored record leniently.
    ///
    /// Anything that is not a JSON object yields an empty record; entries
    /// with non-boolean values are skipped.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "discarding unparseable preference record");
                return Self::default();
            }
        };
        let serde_json::Value::Object(map) = value else {
            debug!("discarding non-object preference record");
            return Self::default();
        };
        let entries = map
            .into_iter()
            .filter_map(|(key, value)| value.as_bool().map(|b| (PanelId::new(key), b)))
            .collect();
        Self { entries }
    }

    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn get(&self, panel: &PanelId) -> Option<bool> {
        self.entries.get(panel).copied()
    }

    pub fn insert(&mut self, panel: PanelId, collapsed: bool) -> Option<bool> {
        self.entries.insert(panel, collapsed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Backends ─────────────────────────────────────────────────────────────

/// String key/value persistence underneath [`BackedPreferences`].
pub trait StorageBackend {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// Process-local backend. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Rc<RefCell<FxHashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored value for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Store a raw value, bypassing any record encoding.
    pub fn put_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.put_raw(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed storage: each key lives in `<dir>/<key>.json`.
///
/// Characters outside `[A-Za-z0-9_-]` in a key are replaced with `_`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store under `dir`, created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a key is written to.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ── Backed store ─────────────────────────────────────────────────────────

/// [`PreferenceStore`] that keeps the whole [`PreferenceRecord`] under one
/// key of a [`StorageBackend`].
///
/// The record is loaded once on construction and cached; every `set`
/// rewrites the full record.
#[derive(Debug)]
pub struct BackedPreferences<B: StorageBackend> {
    backend: B,
    key: String,
    record: PreferenceRecord,
}

impl<B: StorageBackend> BackedPreferences<B> {
    /// Open the record stored under `key`.
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        let key = key.into();
        let record = match backend.read(&key) {
            Ok(Some(raw)) => PreferenceRecord::parse_lenient(&raw),
            Ok(None) => PreferenceRecord::default(),
            Err(err) => {
                debug!(
                    backend = backend.name(),
                    key = %key,
                    error = %err,
                    "preference read failed; starting empty"
                );
                PreferenceRecord::default()
            }
        };
        debug!(
            backend = backend.name(),
            key = %key,
            entries = record.len(),
            "preferences loaded"
        );
        Self {
            backend,
            key,
            record,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn record(&self) -> &PreferenceRecord {
        &self.record
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> PreferenceStore for BackedPreferences<B> {
    fn get(&self, panel: &PanelId) -> StorageResult<Option<bool>> {
        Ok(self.record.get(panel))
    }

    fn set(&mut self, panel: &PanelId, collapsed: bool) -> StorageResult<()> {
        self.record.insert(panel.clone(), collapsed);
        let json = self.record.to_json()?;
        self.backend.write(&self.key, &json)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.record.clear();
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn read(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::unavailable("quota"))
        }
        fn write(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::unavailable("quota"))
        }
        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Err(StorageError::unavailable("quota"))
        }
    }

    #[test]
    fn memory_preferences_share_between_clones() {
        let prefs = MemoryPreferences::new();
        let mut handle = prefs.clone();
        handle.set(&PanelId::left(), true).unwrap();
        assert_eq!(prefs.get(&PanelId::left()).unwrap(), Some(true));
        assert_eq!(prefs.get(&PanelId::right()).unwrap(), None);
        handle.clear().unwrap();
        assert!(prefs.snapshot().is_empty());
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let mut record = PreferenceRecord::new();
        record.insert(PanelId::right(), true);
        record.insert(PanelId::left(), false);
        assert_eq!(record.to_json().unwrap(), r#"{"left":false,"right":true}"#);
    }

    #[test]
    fn lenient_parse_drops_bad_entries() {
        let record = PreferenceRecord::parse_lenient(r#"{"left":true,"right":"yes","x":1}"#);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(&PanelId::left()), Some(true));
        assert_eq!(record.get(&PanelId::right()), None);
    }

    #[test]
    fn lenient_parse_rejects_non_objects() {
        assert!(PreferenceRecord::parse_lenient("not json {{{").is_empty());
        assert!(PreferenceRecord::parse_lenient("[true,false]").is_empty());
        assert!(PreferenceRecord::parse_lenient("true").is_empty());
        assert!(PreferenceRecord::parse_lenient("").is_empty());
    }

    #[test]
    fn backed_store_writes_whole_record_under_key() {
        let storage = MemoryStorage::new();
        let mut prefs = BackedPreferences::new(storage.clone(), "layout");
        prefs.set(&PanelId::left(), true).unwrap();
        prefs.set(&PanelId::right(), false).unwrap();
        assert_eq!(
            storage.raw("layout").as_deref(),
            Some(r#"{"left":true,"right":false}"#)
        );

        let reopened = BackedPreferences::new(storage, "layout");
        assert_eq!(reopened.get(&PanelId::left()).unwrap(), Some(true));
        assert_eq!(reopened.get(&PanelId::right()).unwrap(), Some(false));
    }

    #[test]
    fn backed_store_ignores_malformed_record() {
        let storage = MemoryStorage::new();
        storage.put_raw("layout", "{\"left\": tru");
        let prefs = BackedPreferences::new(storage, "layout");
        assert_eq!(prefs.get(&PanelId::left()).unwrap(), None);
    }

    #[test]
    fn backed_store_clear_removes_key() {
        let storage = MemoryStorage::new();
        let mut prefs = BackedPreferences::new(storage.clone(), "layout");
        prefs.set(&PanelId::left(), true).unwrap();
        prefs.clear().unwrap();
        assert_eq!(storage.raw("layout"), None);
        assert_eq!(prefs.get(&PanelId::left()).unwrap(), None);
    }

    #[test]
    fn unavailable_backend_reads_as_empty_and_reports_writes() {
        let mut prefs = BackedPreferences::new(BrokenBackend, "layout");
        assert_eq!(prefs.get(&PanelId::left()).unwrap(), None);
        assert!(matches!(
            prefs.set(&PanelId::left(), true),
            Err(StorageError::Unavailable { .. })
        ));
        // The cached record still reflects the attempted write.
        assert_eq!(prefs.get(&PanelId::left()).unwrap(), Some(true));
    }

    #[test]
    fn file_storage_round_trips_and_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("prefs"));
        assert_eq!(storage.read("page layout").unwrap(), None);

        storage.write("page layout", "{}").unwrap();
        let path = storage.path_for("page layout");
        assert_eq!(path.file_name().unwrap(), "page_layout.json");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(storage.read("page layout").unwrap().as_deref(), Some("{}"));

        storage.remove("page layout").unwrap();
        storage.remove("page layout").unwrap();
        assert!(!path.exists());
    }
}
