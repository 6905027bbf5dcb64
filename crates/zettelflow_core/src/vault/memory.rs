//! In-process vault backend.

use super::{normalize_path, parent_dir, FileHandle, VaultError, VaultResult, VaultStore};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
}

/// Vault kept entirely in memory.
///
/// Writing a file registers all of its ancestor directories.
#[derive(Debug, Default)]
pub struct MemoryVaultStore {
    state: Mutex<MemoryState>,
}

impl MemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `(path, content)` pairs.
    pub fn with_files<'a>(
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> VaultResult<Self> {
        let store = Self::new();
        for (path, content) in files {
            store.write(path, content)?;
        }
        Ok(store)
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock still holds consistent maps; every mutation is a
        // single insert/remove.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn register_ancestors(dirs: &mut BTreeSet<String>, path: &str) {
    let mut current = parent_dir(path);
    while !current.is_empty() {
        dirs.insert(current.to_string());
        current = parent_dir(current);
    }
}

impl VaultStore for MemoryVaultStore {
    fn read(&self, path: &str) -> VaultResult<String> {
        let path = normalize_path(path)?;
        self.lock()
            .files
            .get(&path)
            .cloned()
            .ok_or(VaultError::NotFound(path))
    }

    fn write(&self, path: &str, content: &str) -> VaultResult<FileHandle> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Err(VaultError::InvalidPath(path));
        }
        let mut state = self.lock();
        if state.dirs.contains(&path) {
            return Err(VaultError::InvalidPath(path));
        }
        register_ancestors(&mut state.dirs, &path);
        state.files.insert(path.clone(), content.to_string());
        debug!("event=vault_write module=vault status=ok backend=memory bytes={}", content.len());
        Ok(FileHandle::from_path(&path))
    }

    fn exists(&self, path: &str) -> VaultResult<bool> {
        let path = normalize_path(path)?;
        Ok(self.lock().files.contains_key(&path))
    }

    fn exists_as_directory(&self, path: &str) -> VaultResult<bool> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Ok(true);
        }
        Ok(self.lock().dirs.contains(&path))
    }

    fn create_directory(&self, path: &str) -> VaultResult<()> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Ok(());
        }
        let mut state = self.lock();
        if state.files.contains_key(&path) {
            return Err(VaultError::NotADirectory(path));
        }
        register_ancestors(&mut state.dirs, &path);
        state.dirs.insert(path);
        Ok(())
    }

    fn delete(&self, path: &str) -> VaultResult<()> {
        let path = normalize_path(path)?;
        match self.lock().files.remove(&path) {
            Some(_) => Ok(()),
            None => Err(VaultError::NotFound(path)),
        }
    }

    fn list_files(&self, prefix: &str) -> VaultResult<Vec<FileHandle>> {
        let prefix = normalize_path(prefix)?;
        Ok(self
            .lock()
            .files
            .keys()
            .filter(|path| path.starts_with(prefix.as_str()))
            .map(|path| FileHandle::from_path(path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryVaultStore;
    use crate::vault::{VaultError, VaultStore};

    #[test]
    fn write_read_and_overwrite() {
        let store = MemoryVaultStore::new();
        let handle = store.write("inbox/a.md", "one").unwrap();
        assert_eq!(handle.basename, "a");
        assert_eq!(store.read("inbox/a.md").unwrap(), "one");

        store.write("inbox/a.md", "two").unwrap();
        assert_eq!(store.read("inbox/a.md").unwrap(), "two");
        assert_eq!(store.file_count(), 1);
    }

    #[test]
    fn write_registers_parent_directories() {
        let store = MemoryVaultStore::new();
        store.write("a/b/c.md", "x").unwrap();
        assert!(store.exists_as_directory("a").unwrap());
        assert!(store.exists_as_directory("a/b").unwrap());
        assert!(!store.exists_as_directory("a/b/c.md").unwrap());
    }

    #[test]
    fn missing_file_errors() {
        let store = MemoryVaultStore::new();
        assert!(matches!(store.read("x.md"), Err(VaultError::NotFound(_))));
        assert!(matches!(store.delete("x.md"), Err(VaultError::NotFound(_))));
    }

    #[test]
    fn list_files_filters_by_prefix_sorted() {
        let store =
            MemoryVaultStore::with_files([("b/2.md", ""), ("a/1.md", ""), ("b/1.md", "")]).unwrap();
        let paths: Vec<String> = store
            .list_files("b")
            .unwrap()
            .into_iter()
            .map(|handle| handle.path)
            .collect();
        assert_eq!(paths, vec!["b/1.md", "b/2.md"]);
    }
}
