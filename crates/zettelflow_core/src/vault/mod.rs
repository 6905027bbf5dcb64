//! Vault storage contracts and backends.
//!
//! # Responsibility
//! - Define the `VaultStore` collaborator notes are persisted through.
//! - Provide memory, filesystem and SQLite implementations.
//!
//! # Invariants
//! - Vault paths are relative, `/`-separated and never contain `..`.
//! - `write` creates or replaces; callers pre-check existence when they
//!   need create-only semantics.
//! - `list_files` returns handles sorted by path.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod fs;
mod memory;
mod sqlite;

pub use fs::FsVaultStore;
pub use memory::MemoryVaultStore;
pub use sqlite::SqliteVaultStore;

/// File extension used for note files.
pub const NOTE_EXTENSION: &str = "md";

pub type VaultResult<T> = Result<T, VaultError>;

/// Storage-layer error.
#[derive(Debug)]
pub enum VaultError {
    /// No file exists at the given path.
    NotFound(String),
    /// A file exists where a directory was required.
    NotADirectory(String),
    /// Path is empty, absolute or escapes the vault.
    InvalidPath(String),
    Io(std::io::Error),
    Db(DbError),
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "File not found: {path}"),
            Self::NotADirectory(path) => write!(f, "not a directory: {path}"),
            Self::InvalidPath(path) => write!(f, "invalid vault path: `{path}`"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for VaultError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Handle describing one stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Full vault path, e.g. `inbox/fleeting/Idea.md`.
    pub path: String,
    /// File name without extension, e.g. `Idea`.
    pub basename: String,
    /// Parent directory, empty for vault-root files.
    pub parent: String,
}

impl FileHandle {
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            basename: file_stem(path).to_string(),
            parent: parent_dir(path).to_string(),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.path.rsplit('/').next()?;
        name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Storage collaborator consumed by notes, the factory and the workflow.
pub trait VaultStore {
    /// Reads file content. Fails with `NotFound` when absent.
    fn read(&self, path: &str) -> VaultResult<String>;
    /// Creates or replaces one file.
    fn write(&self, path: &str, content: &str) -> VaultResult<FileHandle>;
    /// Returns whether a file exists at `path`.
    fn exists(&self, path: &str) -> VaultResult<bool>;
    /// Returns whether a directory exists at `path`.
    fn exists_as_directory(&self, path: &str) -> VaultResult<bool>;
    /// Creates a directory and its parents. Existing directories are ok.
    fn create_directory(&self, path: &str) -> VaultResult<()>;
    /// Deletes one file. Fails with `NotFound` when absent.
    fn delete(&self, path: &str) -> VaultResult<()>;
    /// Lists files whose path starts with `prefix`, sorted by path.
    fn list_files(&self, prefix: &str) -> VaultResult<Vec<FileHandle>>;
}

/// Normalizes a vault path: trims, strips surrounding `/`, rejects `..`.
///
/// The vault root is the empty string.
pub fn normalize_path(path: &str) -> VaultResult<String> {
    let trimmed = path.trim();
    if trimmed.starts_with('/') || trimmed.starts_with('\\') {
        return Err(VaultError::InvalidPath(path.to_string()));
    }
    let mut parts = Vec::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(VaultError::InvalidPath(path.to_string())),
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Joins a directory and a file name with `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Returns the parent directory of `path`, or `""` for root-level paths.
pub fn parent_dir(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

/// Returns the file name of `path` without its extension.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Builds `<dir>/<title>.md`.
pub fn note_file_path(dir: &str, title: &str) -> String {
    join_path(dir, &format!("{title}.{NOTE_EXTENSION}"))
}
