//! Directory-backed vault.
//!
//! # Invariants
//! - Every vault path resolves strictly below `root`.
//! - `write` creates missing parent directories.

use super::{normalize_path, FileHandle, VaultError, VaultResult, VaultStore};
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Vault rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsVaultStore {
    root: PathBuf,
}

impl FsVaultStore {
    /// Opens a vault at `root`, creating the directory when missing.
    pub fn open(root: impl AsRef<Path>) -> VaultResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!(
            "event=vault_open module=vault status=ok backend=fs root={}",
            root.display()
        );
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> VaultResult<(String, PathBuf)> {
        let normalized = normalize_path(path)?;
        let mut full = self.root.clone();
        for part in normalized.split('/').filter(|part| !part.is_empty()) {
            full.push(part);
        }
        Ok((normalized, full))
    }

    fn collect_files(&self, dir: &Path, prefix: &str, out: &mut Vec<FileHandle>) -> VaultResult<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let full = entry.path();
            if file_type.is_dir() {
                self.collect_files(&full, prefix, out)?;
            } else if file_type.is_file() {
                let Some(relative) = vault_relative(&self.root, &full) else {
                    continue;
                };
                if relative.starts_with(prefix) {
                    out.push(FileHandle::from_path(&relative));
                }
            }
        }
        Ok(())
    }
}

fn vault_relative(root: &Path, full: &Path) -> Option<String> {
    let relative = full.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

impl VaultStore for FsVaultStore {
    fn read(&self, path: &str) -> VaultResult<String> {
        let (normalized, full) = self.resolve(path)?;
        if !full.is_file() {
            return Err(VaultError::NotFound(normalized));
        }
        Ok(fs::read_to_string(full)?)
    }

    fn write(&self, path: &str, content: &str) -> VaultResult<FileHandle> {
        let (normalized, full) = self.resolve(path)?;
        if normalized.is_empty() || full.is_dir() {
            return Err(VaultError::InvalidPath(normalized));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        debug!(
            "event=vault_write module=vault status=ok backend=fs bytes={}",
            content.len()
        );
        Ok(FileHandle::from_path(&normalized))
    }

    fn exists(&self, path: &str) -> VaultResult<bool> {
        let (_, full) = self.resolve(path)?;
        Ok(full.is_file())
    }

    fn exists_as_directory(&self, path: &str) -> VaultResult<bool> {
        let (_, full) = self.resolve(path)?;
        Ok(full.is_dir())
    }

    fn create_directory(&self, path: &str) -> VaultResult<()> {
        let (normalized, full) = self.resolve(path)?;
        if full.is_file() {
            return Err(VaultError::NotADirectory(normalized));
        }
        fs::create_dir_all(full)?;
        Ok(())
    }

    fn delete(&self, path: &str) -> VaultResult<()> {
        let (normalized, full) = self.resolve(path)?;
        match fs::remove_file(full) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(VaultError::NotFound(normalized)),
            Err(err) => Err(err.into()),
        }
    }

    fn list_files(&self, prefix: &str) -> VaultResult<Vec<FileHandle>> {
        let prefix = normalize_path(prefix)?;
        let mut files = Vec::new();
        self.collect_files(&self.root, &prefix, &mut files)?;
        files.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::FsVaultStore;
    use crate::vault::{VaultError, VaultStore};

    #[test]
    fn writes_nested_files_and_lists_them() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsVaultStore::open(dir.path()).expect("open vault");

        store.write("inbox/fleeting/Idea.md", "body").unwrap();
        store.write("inbox/other.md", "x").unwrap();

        assert!(store.exists("inbox/fleeting/Idea.md").unwrap());
        assert!(store.exists_as_directory("inbox/fleeting").unwrap());
        assert_eq!(store.read("inbox/fleeting/Idea.md").unwrap(), "body");

        let listed: Vec<String> = store
            .list_files("inbox/fleeting")
            .unwrap()
            .into_iter()
            .map(|handle| handle.path)
            .collect();
        assert_eq!(listed, vec!["inbox/fleeting/Idea.md"]);
    }

    #[test]
    fn rejects_escaping_paths_and_reports_missing_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsVaultStore::open(dir.path()).expect("open vault");

        assert!(matches!(
            store.write("../outside.md", "x"),
            Err(VaultError::InvalidPath(_))
        ));
        assert!(matches!(
            store.read("missing.md"),
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("missing.md"),
            Err(VaultError::NotFound(_))
        ));
    }
}
