//! SQLite-backed vault.
//!
//! # Responsibility
//! - Persist vault files and directories as rows of `vault_entries`.
//!
//! # Invariants
//! - Rows have `kind='file'` with content or `kind='dir'` without.
//! - Writing a file inserts `dir` rows for all ancestors in one transaction.

use super::{normalize_path, parent_dir, FileHandle, VaultError, VaultResult, VaultStore};
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

/// Vault stored in a single SQLite database.
pub struct SqliteVaultStore {
    conn: Connection,
}

impl SqliteVaultStore {
    /// Wraps a connection already returned by `open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> VaultResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> VaultResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn entry_kind(&self, path: &str) -> VaultResult<Option<String>> {
        let kind = self
            .conn
            .query_row(
                "SELECT kind FROM vault_entries WHERE path = ?1;",
                [path],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(kind)
    }
}

fn insert_ancestors(tx: &Transaction<'_>, path: &str) -> VaultResult<()> {
    let mut current = parent_dir(path);
    while !current.is_empty() {
        tx.execute(
            "INSERT OR IGNORE INTO vault_entries (path, kind, content) VALUES (?1, 'dir', NULL);",
            [current],
        )?;
        current = parent_dir(current);
    }
    Ok(())
}

impl VaultStore for SqliteVaultStore {
    fn read(&self, path: &str) -> VaultResult<String> {
        let path = normalize_path(path)?;
        let content = self
            .conn
            .query_row(
                "SELECT content FROM vault_entries WHERE path = ?1 AND kind = 'file';",
                [path.as_str()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        match content {
            Some(content) => Ok(content.unwrap_or_default()),
            None => Err(VaultError::NotFound(path)),
        }
    }

    fn write(&self, path: &str, content: &str) -> VaultResult<FileHandle> {
        let path = normalize_path(path)?;
        if path.is_empty() || self.entry_kind(&path)?.as_deref() == Some("dir") {
            return Err(VaultError::InvalidPath(path));
        }

        let tx = self.conn.unchecked_transaction()?;
        insert_ancestors(&tx, &path)?;
        tx.execute(
            "INSERT INTO vault_entries (path, kind, content, updated_at)
             VALUES (?1, 'file', ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(path) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at;",
            params![path, content],
        )?;
        tx.commit()?;

        debug!(
            "event=vault_write module=vault status=ok backend=sqlite bytes={}",
            content.len()
        );
        Ok(FileHandle::from_path(&path))
    }

    fn exists(&self, path: &str) -> VaultResult<bool> {
        let path = normalize_path(path)?;
        Ok(self.entry_kind(&path)?.as_deref() == Some("file"))
    }

    fn exists_as_directory(&self, path: &str) -> VaultResult<bool> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Ok(true);
        }
        Ok(self.entry_kind(&path)?.as_deref() == Some("dir"))
    }

    fn create_directory(&self, path: &str) -> VaultResult<()> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Ok(());
        }
        if self.entry_kind(&path)?.as_deref() == Some("file") {
            return Err(VaultError::NotADirectory(path));
        }

        let tx = self.conn.unchecked_transaction()?;
        insert_ancestors(&tx, &path)?;
        tx.execute(
            "INSERT OR IGNORE INTO vault_entries (path, kind, content) VALUES (?1, 'dir', NULL);",
            [path.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, path: &str) -> VaultResult<()> {
        let path = normalize_path(path)?;
        let changed = self.conn.execute(
            "DELETE FROM vault_entries WHERE path = ?1 AND kind = 'file';",
            [path.as_str()],
        )?;
        if changed == 0 {
            return Err(VaultError::NotFound(path));
        }
        Ok(())
    }

    fn list_files(&self, prefix: &str) -> VaultResult<Vec<FileHandle>> {
        let prefix = normalize_path(prefix)?;
        let mut stmt = self.conn.prepare(
            "SELECT path FROM vault_entries
             WHERE kind = 'file' AND substr(path, 1, length(?1)) = ?1
             ORDER BY path ASC;",
        )?;
        let mut rows = stmt.query([prefix.as_str()])?;
        let mut files = Vec::new();
        while let Some(row) = rows.next()? {
            let path: String = row.get(0)?;
            files.push(FileHandle::from_path(&path));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteVaultStore;
    use crate::vault::{VaultError, VaultStore};

    #[test]
    fn stores_files_and_ancestor_directories() {
        let store = SqliteVaultStore::open_in_memory().expect("open vault");
        store.write("inbox/atoms/Idea.md", "hello").unwrap();

        assert!(store.exists("inbox/atoms/Idea.md").unwrap());
        assert!(store.exists_as_directory("inbox").unwrap());
        assert!(store.exists_as_directory("inbox/atoms").unwrap());
        assert_eq!(store.read("inbox/atoms/Idea.md").unwrap(), "hello");

        store.write("inbox/atoms/Idea.md", "again").unwrap();
        assert_eq!(store.read("inbox/atoms/Idea.md").unwrap(), "again");
    }

    #[test]
    fn create_directory_rejects_existing_file() {
        let store = SqliteVaultStore::open_in_memory().expect("open vault");
        store.write("a.md", "").unwrap();
        assert!(matches!(
            store.create_directory("a.md"),
            Err(VaultError::NotADirectory(_))
        ));
        store.create_directory("x/y").unwrap();
        assert!(store.exists_as_directory("x").unwrap());
    }

    #[test]
    fn list_and_delete_files() {
        let store = SqliteVaultStore::open_in_memory().expect("open vault");
        store.write("t/b.md", "").unwrap();
        store.write("t/a.md", "").unwrap();
        store.write("u/c.md", "").unwrap();

        let listed: Vec<String> = store
            .list_files("t/")
            .unwrap()
            .into_iter()
            .map(|handle| handle.path)
            .collect();
        assert_eq!(listed, vec!["t/a.md", "t/b.md"]);

        store.delete("t/a.md").unwrap();
        assert!(!store.exists("t/a.md").unwrap());
        assert!(matches!(store.delete("t/a.md"), Err(VaultError::NotFound(_))));
    }
}
