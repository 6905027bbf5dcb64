//! Note entity: properties, body, save directory and outbound links.
//!
//! # Responsibility
//! - Compose one `PropertySet` and one `Body` seeded by a blueprint.
//! - Layer template notes onto fresh notes.
//! - Validate, render and persist through a `VaultStore`.
//!
//! # Invariants
//! - A materialized note never carries the `template` marker.
//! - `check_before_save` always stamps `type` with the note's own type tag.
//! - Links are side effects of `save`, never part of the rendered text.

use crate::model::blueprint::{NoteBlueprint, ZettelBlueprint};
use crate::model::body::Body;
use crate::model::keyed_value::PropertyValue;
use crate::model::link::{LinkForm, NoteLink};
use crate::model::note_type::NoteType;
use crate::model::property::{PropertySet, KEY_ALIASES, KEY_TEMPLATE};
use crate::prompt::UserPrompt;
use crate::vault::{note_file_path, FileHandle, VaultResult, VaultStore};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;

/// Save directory used until a caller or the factory assigns one.
pub const DEFAULT_NOTE_PATH: &str = "000-inbox";
/// Title used when the title prompt is cancelled.
pub const UNTITLED_NOTE: &str = "Untitled Note";
/// Question shown when a note is saved without title.
pub const TITLE_QUESTION: &str = "Typing title for the note";

const FORBIDDEN_TITLE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces characters that cannot appear in file names with `-`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|ch| if FORBIDDEN_TITLE_CHARS.contains(&ch) { '-' } else { ch })
        .collect()
}

/// One note of a given type.
#[derive(Debug, Clone)]
pub struct Note {
    note_type: NoteType,
    properties: PropertySet,
    body: Body,
    path: String,
    links: Vec<NoteLink>,
    subpage: bool,
    blueprint: Arc<dyn NoteBlueprint>,
}

impl Note {
    /// Builds a fresh note from `blueprint` defaults, optionally layered
    /// with `template`.
    ///
    /// The template is only read; its properties and body are copied.
    pub fn new(
        note_type: NoteType,
        blueprint: Arc<dyn NoteBlueprint>,
        template: Option<&Note>,
    ) -> Self {
        let mut note = Self {
            note_type,
            properties: blueprint.default_properties(),
            body: blueprint.default_body(),
            path: DEFAULT_NOTE_PATH.to_string(),
            links: Vec::new(),
            subpage: false,
            blueprint,
        };
        if let Some(template) = template {
            note.update_by_template(template, true);
        }
        debug!(
            "event=note_new module=model status=ok note_type={} blueprint={} templated={}",
            note_type,
            note.blueprint.name(),
            template.is_some()
        );
        note
    }

    /// Builds a fresh Zettelkasten note without template.
    pub fn zettel(note_type: NoteType) -> Self {
        Self::new(note_type, Arc::new(ZettelBlueprint::new(note_type)), None)
    }

    /// Layers `template` onto this note.
    ///
    /// With `keep_order` the template's key and section order wins and this
    /// note's values (identity included) override the template's. Without
    /// it, template values only fill gaps (see [`PropertySet::fill_gaps`])
    /// and template sections are pushed after this note's own.
    pub fn update_by_template(&mut self, template: &Note, keep_order: bool) {
        if keep_order {
            let mut properties = template.properties.clone();
            properties.update(&self.properties, true);
            let body = self.body.merge_into(&template.body);
            self.properties = properties;
            self.body.adopt(body);
        } else {
            self.properties.fill_gaps(&template.properties);
            let body = template.body.merge_into(&self.body);
            self.body.adopt(body);
        }

        self.drop_template_alias(template.properties.id());
        if self.properties.contains(KEY_TEMPLATE) {
            debug!("event=template_marker module=model status=removed");
            self.properties.remove(KEY_TEMPLATE);
        }
    }

    /// Removes the template's own id from `aliases`.
    fn drop_template_alias(&mut self, template_id: &str) {
        if template_id.is_empty() || template_id == self.properties.id() {
            return;
        }
        let aliases = self.properties.aliases();
        if !aliases.iter().any(|alias| alias == template_id) {
            return;
        }
        let kept: Vec<String> = aliases
            .iter()
            .filter(|alias| *alias != template_id)
            .cloned()
            .collect();
        self.properties
            .set_property_value(KEY_ALIASES, PropertyValue::List(kept), true);
        debug!("event=template_alias module=model status=removed");
    }

    pub fn note_type(&self) -> NoteType {
        self.note_type
    }

    pub fn blueprint(&self) -> &Arc<dyn NoteBlueprint> {
        &self.blueprint
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn title(&self) -> &str {
        self.properties.title()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.properties.set_title(title);
    }

    /// Type recorded in the `type` property.
    ///
    /// An empty value means the note has not been stamped yet and reports
    /// its own type. An unrecognized value falls back to the baseline type.
    pub fn get_type(&self) -> NoteType {
        let stored = self.properties.type_tag();
        if stored.trim().is_empty() {
            return self.note_type;
        }
        match NoteType::from_tag(stored) {
            Some(note_type) => note_type,
            None => {
                warn!(
                    "event=note_type_resolve module=model status=fallback baseline={}",
                    NoteType::BASELINE
                );
                NoteType::BASELINE
            }
        }
    }

    pub fn set_type(&mut self, note_type: NoteType) {
        self.properties.set_type_tag(note_type.tag());
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, dir: impl Into<String>) {
        self.path = dir.into();
        debug!("event=note_path module=model status=changed");
    }

    pub fn add_tag(&mut self, tags: impl Into<PropertyValue>) {
        self.properties.add_tags(tags);
    }

    pub fn add_alias(&mut self, aliases: impl Into<PropertyValue>) {
        self.properties.add_aliases(aliases);
    }

    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.set_property_value(key, value, false);
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get_property_value(key)
    }

    pub fn url(&self) -> &str {
        self.properties.url()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.properties.set_url(url);
    }

    pub fn id(&self) -> &str {
        self.properties.id()
    }

    /// Records a quoted back-reference in `sources`, skipping duplicates.
    pub fn add_source_note(&mut self, source: &str) {
        let quoted = quote(source);
        if self.properties.sources().contains(&quoted) {
            return;
        }
        self.properties.add_sources(quoted);
    }

    pub fn add_body_content(&mut self, text: impl Into<String>, section: &str, level: usize) {
        self.body.add_content(text, section, level);
    }

    /// Registers an outbound link executed after the next `save`.
    pub fn add_linked_page(
        &mut self,
        target_note: impl Into<String>,
        header: Option<String>,
        form: Option<LinkForm>,
    ) -> &NoteLink {
        self.add_link(NoteLink::new(target_note, header, form))
    }

    pub fn add_link(&mut self, link: NoteLink) -> &NoteLink {
        self.links.push(link);
        &self.links[self.links.len() - 1]
    }

    pub fn links(&self) -> &[NoteLink] {
        &self.links
    }

    pub fn enable_subpage(&mut self) {
        self.subpage = true;
    }

    pub fn disable_subpage(&mut self) {
        self.subpage = false;
    }

    pub fn is_subpage(&self) -> bool {
        self.subpage
    }

    /// Vault path of this note's file: `<path>/<title>.md`.
    pub fn file_path(&self) -> String {
        note_file_path(&self.path, &sanitize_title(self.title()))
    }

    /// Reports whether the note file (or its directory) exists.
    pub fn exists(&self, store: &dyn VaultStore, as_directory: bool) -> VaultResult<bool> {
        if as_directory {
            store.exists_as_directory(&self.path)
        } else {
            store.exists(&self.file_path())
        }
    }

    /// Renders frontmatter followed by body, running the blueprint hooks.
    pub fn to_text(&mut self, prompt: &dyn UserPrompt) -> String {
        self.blueprint.pre_process(&mut self.properties);
        let text = format!("{}{}", self.properties, self.body);
        self.blueprint.post_process(text, prompt)
    }

    /// Repairs the note so it can be written.
    ///
    /// Creates the directory, fills a blank title from `prompt` (or
    /// `"Untitled Note"` when cancelled), makes one attempt at avoiding an
    /// existing file by appending ` <1..=100>` to the title, and stamps the
    /// `type` property.
    pub fn check_before_save(
        &mut self,
        store: &dyn VaultStore,
        prompt: &dyn UserPrompt,
    ) -> VaultResult<()> {
        if !self.exists(store, true)? {
            store.create_directory(&self.path)?;
            warn!("event=note_check module=model status=dir_created");
        }

        if self.title().trim().is_empty() {
            let title = prompt
                .ask(TITLE_QUESTION, None)
                .unwrap_or_else(|| UNTITLED_NOTE.to_string());
            info!("event=note_check module=model status=title_filled");
            self.set_title(title);
        }

        let sanitized = sanitize_title(self.title());
        if sanitized != self.title() {
            self.set_title(sanitized);
        }

        if self.exists(store, false)? {
            let suffix: u32 = rand::thread_rng().gen_range(1..=100);
            let title = format!("{} {suffix}", self.title());
            self.set_title(title);
            warn!("event=note_check module=model status=title_deduplicated suffix={suffix}");
        }

        self.set_type(self.note_type);
        Ok(())
    }

    /// Validates, renders and writes the note, then applies its links.
    pub fn save(
        &mut self,
        store: &dyn VaultStore,
        prompt: &dyn UserPrompt,
    ) -> VaultResult<FileHandle> {
        self.check_before_save(store, prompt)?;
        let text = self.to_text(prompt);
        let handle = store.write(&self.file_path(), &text)?;
        info!(
            "event=note_save module=model status=ok note_type={} links={}",
            self.note_type,
            self.links.len()
        );
        self.apply_links(store)?;
        Ok(handle)
    }

    /// Writes the note back to its current file without validation.
    pub fn rewrite(
        &mut self,
        store: &dyn VaultStore,
        prompt: &dyn UserPrompt,
    ) -> VaultResult<FileHandle> {
        let text = self.to_text(prompt);
        let handle = store.write(&self.file_path(), &text)?;
        info!("event=note_rewrite module=model status=ok");
        Ok(handle)
    }

    fn apply_links(&self, store: &dyn VaultStore) -> VaultResult<()> {
        for link in &self.links {
            link.apply(self.title(), store)?;
        }
        Ok(())
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    if !value.starts_with('"') {
        quoted.push('"');
    }
    quoted.push_str(value);
    if !value.ends_with('"') || value.len() == 1 {
        quoted.push('"');
    }
    quoted
}
