//! Workflow configuration surface.
//!
//! # Responsibility
//! - Hold the folder paths and feature toggles the core reads.
//! - (De)serialize them as JSON for the host to persist.
//!
//! # Invariants
//! - Missing JSON fields take their default values.
//! - `validate` rejects blank folder paths.

use crate::model::note_type::NoteType;
use crate::vault::join_path;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings load/validation error.
#[derive(Debug)]
pub enum SettingsError {
    Parse(serde_json::Error),
    /// A folder path field is blank.
    EmptyPath(&'static str),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid settings: {err}"),
            Self::EmptyPath(field) => write!(f, "settings field `{field}` must not be empty"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::EmptyPath(_) => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZettelSettings {
    pub fleeting_path: String,
    pub literature_path: String,
    pub atomic_path: String,
    pub permanent_path: String,
    pub template_dir_path: String,
    pub use_prompt_integration: bool,
    pub default_tags: Vec<String>,
    /// Cap on `VaultStats::recent_titles`.
    pub max_recent_notes: usize,
}

impl Default for ZettelSettings {
    fn default() -> Self {
        Self {
            fleeting_path: "inbox/fleeting".to_string(),
            literature_path: "inbox/literature".to_string(),
            atomic_path: "inbox/atoms".to_string(),
            permanent_path: "inbox/permanent".to_string(),
            template_dir_path: "templates".to_string(),
            use_prompt_integration: true,
            default_tags: Vec::new(),
            max_recent_notes: 10,
        }
    }
}

impl ZettelSettings {
    pub fn from_json_str(raw: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save directory configured for `note_type`.
    pub fn folder_for(&self, note_type: NoteType) -> &str {
        match note_type {
            NoteType::Fleeting => &self.fleeting_path,
            NoteType::Literature => &self.literature_path,
            NoteType::Atomic => &self.atomic_path,
            NoteType::Permanent => &self.permanent_path,
        }
    }

    /// Template directory of `note_type`: `<template_dir_path>/<tag>`.
    pub fn template_dir_for(&self, note_type: NoteType) -> String {
        join_path(&self.template_dir_path, note_type.tag())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        let fields = [
            ("fleeting_path", &self.fleeting_path),
            ("literature_path", &self.literature_path),
            ("atomic_path", &self.atomic_path),
            ("permanent_path", &self.permanent_path),
            ("template_dir_path", &self.template_dir_path),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(SettingsError::EmptyPath(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SettingsError, ZettelSettings};
    use crate::model::note_type::NoteType;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = ZettelSettings::from_json_str(r#"{"atomic_path":"zk/atoms"}"#).unwrap();
        assert_eq!(settings.folder_for(NoteType::Atomic), "zk/atoms");
        assert_eq!(settings.folder_for(NoteType::Fleeting), "inbox/fleeting");
        assert_eq!(settings.max_recent_notes, 10);
    }

    #[test]
    fn unknown_host_fields_are_ignored() {
        let settings =
            ZettelSettings::from_json_str(r#"{"autoOpenNewNote":true,"max_recent_notes":3}"#)
                .unwrap();
        assert_eq!(settings.max_recent_notes, 3);
    }

    #[test]
    fn template_dir_is_nested_by_type() {
        let settings = ZettelSettings::default();
        assert_eq!(
            settings.template_dir_for(NoteType::Permanent),
            "templates/permanent"
        );
    }

    #[test]
    fn rejects_blank_paths_and_bad_json() {
        assert!(matches!(
            ZettelSettings::from_json_str(r#"{"fleeting_path":"  "}"#),
            Err(SettingsError::EmptyPath("fleeting_path"))
        ));
        assert!(matches!(
            ZettelSettings::from_json_str("{"),
            Err(SettingsError::Parse(_))
        ));
    }
}
