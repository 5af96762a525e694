//! Key/value storage backends
//!
//! - `MemoryStorage`: in-process map (tests, headless runs)
//! - `FileStorage`: one JSON file per key (native)
//! - `LocalStorage`: browser `window.localStorage` (wasm32)

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::StorageError;

/// String key/value store used by the save system
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same map, so a test can keep a
/// handle after moving one into the game.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::Storage;
    use crate::error::StorageError;

    /// Directory of `<key>.json` files. Writes go to a temp file first and
    /// are renamed into place.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl Storage for FileStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match fs::read_to_string(self.path(key)) {
                Ok(s) => Ok(Some(s)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            fs::create_dir_all(&self.dir)?;
            let path = self.path(key);
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            match fs::remove_file(self.path(key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::Storage;
    use crate::error::StorageError;

    /// Browser localStorage
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorage;

    impl LocalStorage {
        fn backend() -> Result<web_sys::Storage, StorageError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| StorageError::Unavailable("localStorage".into()))
        }
    }

    impl Storage for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Self::backend()?
                .get_item(key)
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            Self::backend()?
                .set_item(key, value)
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            Self::backend()?
                .remove_item(key)
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
        }
    }
}
