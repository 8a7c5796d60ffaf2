use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{LimelightError, LimelightResult};

/// Persisted per-scene "already shown" flags.
///
/// Keys are the scene's `oneShot{id}` strings. Implementations should fail
/// open: when the backing storage cannot be read, `get` must return
/// `default` so the tour keeps running instead of blocking on a missing
/// preference file.
pub trait OneShotStore {
    fn get(&self, key: &str, default: bool) -> bool;
    fn set(&mut self, key: &str, value: bool);
}

/// A shared store handle: the embedder keeps one end, the sequencer the
/// other. Single-threaded by design, like the rest of the crate.
impl<S: OneShotStore> OneShotStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get(&self, key: &str, default: bool) -> bool {
        self.borrow().get(key, default)
    }

    fn set(&mut self, key: &str, value: bool) {
        self.borrow_mut().set(key, value);
    }
}

/// In-memory store. The default for tests and for embedders that persist
/// flags through their own settings system.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    flags: BTreeMap<String, bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OneShotStore for MemoryStore {
    fn get(&self, key: &str, default: bool) -> bool {
        self.flags.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }
}

/// File-backed store, one JSON object of `key: bool` entries.
///
/// Write-through: every `set` rewrites the file. A missing file on open is
/// an empty store; a corrupt file or a failed write is logged and otherwise
/// ignored, so one-shot scenes degrade to "always eligible" rather than
/// wedging the tour.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    flags: BTreeMap<String, bool>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> LimelightResult<Self> {
        let path = path.into();
        let flags = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                LimelightError::store(format!("corrupt store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(LimelightError::store(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(Self { path, flags })
    }

    /// Like [`JsonFileStore::open`], but a corrupt or unreadable file becomes
    /// an empty store instead of an error.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "one-shot store unreadable, starting empty");
                Self {
                    path,
                    flags: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> LimelightResult<()> {
        let text = serde_json::to_string_pretty(&self.flags)
            .map_err(|e| LimelightError::store(format!("serialize store: {e}")))?;
        std::fs::write(&self.path, text)
            .map_err(|e| LimelightError::store(format!("write {}: {e}", self.path.display())))
    }
}

impl OneShotStore for JsonFileStore {
    fn get(&self, key: &str, default: bool) -> bool {
        self.flags.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "one-shot flag not persisted");
        }
    }
}
