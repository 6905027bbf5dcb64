//! Note type registry and template-aware note factory.
//!
//! # Responsibility
//! - Map note types to blueprints and build notes from them.
//! - Keep named templates per note type, with an optional default.
//! - Load notes and templates from a `VaultStore`.
//!
//! # Invariants
//! - Templates are handed out as copies; registered instances never change.
//! - Registering a new template instance persists it when no file exists at
//!   `<template_dir>/<type>/<name>.md`.
//! - Loaded notes take their title from the file name and their save
//!   directory from the file's parent.

use crate::codec::{is_template_text, parse_note_text};
use crate::model::blueprint::{generate_date, generate_zettel_id, zettel_blueprints, NoteBlueprint};
use crate::model::keyed_value::PropertyValue;
use crate::model::note::Note;
use crate::model::note_type::NoteType;
use crate::model::property::{KEY_CREATE, KEY_ID, KEY_TEMPLATE, KEY_TYPE};
use crate::prompt::NoPrompt;
use crate::settings::ZettelSettings;
use crate::vault::{note_file_path, FileHandle, VaultError, VaultStore, NOTE_EXTENSION};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type NoteResult<T> = Result<T, NoteError>;

/// Factory and loader errors.
#[derive(Debug)]
pub enum NoteError {
    /// No blueprint is registered for the tag.
    UnknownNoteType(String),
    TemplateNotFound { note_type: NoteType, name: String },
    NoDefaultTemplate(NoteType),
    FileNotFound(String),
    Vault(VaultError),
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNoteType(tag) => write!(f, "Unknown note type: {tag}"),
            Self::TemplateNotFound { note_type, name } => {
                write!(f, "Template '{name}' not found for type: {note_type}")
            }
            Self::NoDefaultTemplate(note_type) => {
                write!(f, "No default template set for type: {note_type}")
            }
            Self::FileNotFound(path) => write!(f, "File not found: {path}"),
            Self::Vault(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Vault(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VaultError> for NoteError {
    fn from(value: VaultError) -> Self {
        match value {
            VaultError::NotFound(path) => Self::FileNotFound(path),
            other => Self::Vault(other),
        }
    }
}

/// Where a registered template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Materialized template note.
    Instance(Note),
    /// Vault path loaded on every retrieval.
    Path(String),
}

#[derive(Debug, Clone, Default)]
struct TemplateEntry {
    templates: BTreeMap<String, TemplateSource>,
    default_name: Option<String>,
}

/// Summary of the notes stored under one vault prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VaultStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub recent_titles: Vec<String>,
}

/// Builds notes by type and manages per-type templates.
#[derive(Debug, Default)]
pub struct NoteFactory {
    blueprints: BTreeMap<NoteType, Arc<dyn NoteBlueprint>>,
    templates: BTreeMap<NoteType, TemplateEntry>,
    settings: ZettelSettings,
}

impl NoteFactory {
    /// Creates a factory without any registered blueprint.
    pub fn new(settings: ZettelSettings) -> Self {
        Self {
            blueprints: BTreeMap::new(),
            templates: BTreeMap::new(),
            settings,
        }
    }

    /// Creates a factory with the Zettelkasten blueprint of every type.
    pub fn with_zettel_blueprints(settings: ZettelSettings) -> Self {
        let mut factory = Self::new(settings);
        for (note_type, blueprint) in zettel_blueprints() {
            factory.register_note_blueprint(note_type, blueprint);
        }
        factory
    }

    pub fn settings(&self) -> &ZettelSettings {
        &self.settings
    }

    pub fn register_note_blueprint(&mut self, note_type: NoteType, blueprint: Arc<dyn NoteBlueprint>) {
        info!(
            "event=blueprint_register module=service status=ok note_type={} blueprint={}",
            note_type,
            blueprint.name()
        );
        self.blueprints.insert(note_type, blueprint);
    }

    pub fn is_registered(&self, note_type: NoteType) -> bool {
        self.blueprints.contains_key(&note_type)
    }

    /// Builds a fresh note of `note_type`, layered with `template` when given.
    ///
    /// The note is placed in the folder configured for its type.
    pub fn create_note(&self, note_type: NoteType, template: Option<&Note>) -> NoteResult<Note> {
        let Some(blueprint) = self.blueprints.get(&note_type) else {
            error!(
                "event=note_create module=service status=error error_code=unknown_note_type note_type={note_type}"
            );
            return Err(NoteError::UnknownNoteType(note_type.tag().to_string()));
        };
        let mut note = Note::new(note_type, Arc::clone(blueprint), template);
        note.set_path(self.settings.folder_for(note_type));
        info!("event=note_create module=service status=ok note_type={note_type}");
        Ok(note)
    }

    /// Same as [`NoteFactory::create_note`], resolving a raw type tag first.
    pub fn create_note_by_tag(&self, tag: &str, template: Option<&Note>) -> NoteResult<Note> {
        let note_type =
            NoteType::from_tag(tag).ok_or_else(|| NoteError::UnknownNoteType(tag.to_string()))?;
        self.create_note(note_type, template)
    }

    /// Vault path a template instance is persisted to.
    pub fn template_path(&self, note_type: NoteType, name: &str) -> String {
        note_file_path(&self.settings.template_dir_for(note_type), name)
    }

    /// Registers `source` as template `name` of `note_type`.
    ///
    /// A newly registered instance is written to the template directory
    /// unless a file is already there. Re-registering replaces the source.
    pub fn register_template(
        &mut self,
        store: &dyn VaultStore,
        note_type: NoteType,
        name: &str,
        source: TemplateSource,
    ) -> NoteResult<()> {
        let first_time = !self
            .templates
            .get(&note_type)
            .is_some_and(|entry| entry.templates.contains_key(name));

        if let TemplateSource::Instance(template) = &source {
            let path = self.template_path(note_type, name);
            if first_time && !store.exists(&path)? {
                self.persist_template(store, note_type, name, template)?;
            }
        }

        self.templates
            .entry(note_type)
            .or_default()
            .templates
            .insert(name.to_string(), source);
        info!("event=template_register module=service status=ok note_type={note_type}");
        Ok(())
    }

    fn persist_template(
        &self,
        store: &dyn VaultStore,
        note_type: NoteType,
        name: &str,
        template: &Note,
    ) -> NoteResult<FileHandle> {
        let mut copy = template.clone();
        copy.set_path(self.settings.template_dir_for(note_type));
        copy.set_title(name);
        copy.set_type(note_type);
        copy.set_property(KEY_TEMPLATE, true);
        store.create_directory(copy.path())?;
        let handle = copy.rewrite(store, &NoPrompt)?;
        info!("event=template_persist module=service status=ok note_type={note_type}");
        Ok(handle)
    }

    /// Marks `name` as the default template of `note_type`.
    pub fn set_default_template(&mut self, note_type: NoteType, name: &str) -> NoteResult<()> {
        let Some(entry) = self
            .templates
            .get_mut(&note_type)
            .filter(|entry| entry.templates.contains_key(name))
        else {
            return Err(NoteError::TemplateNotFound {
                note_type,
                name: name.to_string(),
            });
        };
        entry.default_name = Some(name.to_string());
        Ok(())
    }

    /// Name of the default template of `note_type`.
    pub fn get_default_template(&self, note_type: NoteType) -> NoteResult<&str> {
        self.templates
            .get(&note_type)
            .and_then(|entry| entry.default_name.as_deref())
            .ok_or(NoteError::NoDefaultTemplate(note_type))
    }

    pub fn has_default_template(&self, note_type: NoteType) -> bool {
        self.get_default_template(note_type).is_ok()
    }

    /// Registered template names of `note_type`, sorted.
    pub fn list_templates(&self, note_type: NoteType) -> Vec<String> {
        self.templates
            .get(&note_type)
            .map(|entry| entry.templates.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns a copy of one template, loading it when registered by path.
    pub fn get_template(
        &self,
        store: &dyn VaultStore,
        note_type: NoteType,
        name: &str,
    ) -> NoteResult<Note> {
        let source = self
            .templates
            .get(&note_type)
            .and_then(|entry| entry.templates.get(name))
            .ok_or_else(|| NoteError::TemplateNotFound {
                note_type,
                name: name.to_string(),
            })?;
        match source {
            TemplateSource::Instance(template) => Ok(template.clone()),
            TemplateSource::Path(path) => self.load_from_file(store, path),
        }
    }

    /// Builds a note from template `name`, or from the type's default.
    pub fn create_from_template(
        &self,
        store: &dyn VaultStore,
        note_type: NoteType,
        name: Option<&str>,
    ) -> NoteResult<Note> {
        let name = match name {
            Some(name) => name,
            None => self.get_default_template(note_type)?,
        };
        let template = self.get_template(store, note_type, name)?;
        self.create_note(note_type, Some(&template))
    }

    /// Loads one note file.
    ///
    /// The type comes from the frontmatter `type` value, falling back to
    /// the baseline type. Parsed lists replace default lists.
    pub fn load_from_file(&self, store: &dyn VaultStore, path: &str) -> NoteResult<Note> {
        if !store.exists(path)? {
            warn!("event=note_load module=service status=error error_code=file_not_found");
            return Err(NoteError::FileNotFound(path.to_string()));
        }
        let text = store.read(path)?;
        let parsed = parse_note_text(&text);

        let note_type = parsed
            .properties
            .get_property_value(KEY_TYPE)
            .and_then(PropertyValue::as_text)
            .map_or(NoteType::BASELINE, NoteType::from_tag_or_baseline);
        let mut note = self.create_note(note_type, None)?;

        for entry in parsed.properties.iter() {
            let existing_is_list = note
                .get_property(entry.key())
                .is_some_and(PropertyValue::is_list);
            let value = match entry.value() {
                PropertyValue::Text(text) if existing_is_list && text.is_empty() => {
                    PropertyValue::List(Vec::new())
                }
                other => other.clone(),
            };
            note.properties_mut()
                .set_property_value(entry.key(), value, true);
        }

        let body = note.body().merge_into(&parsed.body);
        note.body_mut().adopt(body);

        let handle = FileHandle::from_path(path);
        note.set_title(handle.basename);
        note.set_path(handle.parent);
        debug!("event=note_load module=service status=ok note_type={note_type}");
        Ok(note)
    }

    /// Loads every note file under `dir`. Unloadable files are skipped.
    pub fn load_from_directory(&self, store: &dyn VaultStore, dir: &str) -> NoteResult<Vec<Note>> {
        let mut notes = Vec::new();
        for handle in note_files(store, dir)? {
            match self.load_from_file(store, &handle.path) {
                Ok(note) => notes.push(note),
                Err(err) => {
                    warn!("event=note_load module=service status=skipped error={err}");
                }
            }
        }
        info!(
            "event=note_load_dir module=service status=ok count={}",
            notes.len()
        );
        Ok(notes)
    }

    /// Registers every file under `dir` marked `template: true`, by path,
    /// under its type and file name. Returns the number registered.
    pub fn load_templates_from_directory(
        &mut self,
        store: &dyn VaultStore,
        dir: &str,
    ) -> NoteResult<usize> {
        let mut loaded = 0;
        for handle in note_files(store, dir)? {
            let text = match store.read(&handle.path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("event=template_load module=service status=skipped error={err}");
                    continue;
                }
            };
            if !is_template_text(&text) {
                continue;
            }
            let note = match self.load_from_file(store, &handle.path) {
                Ok(note) => note,
                Err(err) => {
                    warn!("event=template_load module=service status=skipped error={err}");
                    continue;
                }
            };
            let note_type = note.get_type();
            self.register_template(
                store,
                note_type,
                &handle.basename,
                TemplateSource::Path(handle.path.clone()),
            )?;
            loaded += 1;
        }
        info!("event=template_load module=service status=ok count={loaded}");
        Ok(loaded)
    }

    /// Copies `source` into an independent note titled `new_title` with a
    /// fresh id and creation date.
    pub fn clone_note(&self, source: &Note, new_title: &str) -> NoteResult<Note> {
        let mut cloned = self.create_note(source.note_type(), None)?;
        cloned.properties_mut().update(source.properties(), true);
        let body = source.body().merge_into(cloned.body());
        cloned.body_mut().adopt(body);

        cloned.set_title(new_title);
        cloned.set_property(KEY_ID, generate_zettel_id());
        cloned.set_property(KEY_CREATE, generate_date());
        cloned.set_path(source.path());
        Ok(cloned)
    }

    /// Counts note files under `prefix` by type, skipping templates.
    ///
    /// At most `max_recent_notes` titles are listed.
    pub fn vault_stats(&self, store: &dyn VaultStore, prefix: &str) -> NoteResult<VaultStats> {
        let recent_limit = self.settings.max_recent_notes;
        let mut stats = VaultStats::default();
        for handle in note_files(store, prefix)? {
            let text = store.read(&handle.path)?;
            let parsed = parse_note_text(&text);
            if parsed
                .properties
                .get_property_value(KEY_TEMPLATE)
                .and_then(PropertyValue::as_flag)
                .unwrap_or(false)
            {
                continue;
            }
            let note_type = NoteType::from_tag_or_baseline(parsed.properties.type_tag());
            *stats.by_type.entry(note_type.tag().to_string()).or_default() += 1;
            stats.total += 1;
            if stats.recent_titles.len() < recent_limit {
                stats.recent_titles.push(handle.basename);
            }
        }
        Ok(stats)
    }
}

fn note_files(store: &dyn VaultStore, dir: &str) -> NoteResult<Vec<FileHandle>> {
    Ok(store
        .list_files(dir)?
        .into_iter()
        .filter(|handle| handle.extension() == Some(NOTE_EXTENSION))
        .collect())
}
