//! Ordered frontmatter property set.
//!
//! # Responsibility
//! - Own the insertion-ordered `name -> KeyedValue` mapping of one note.
//! - Implement append/reset list semantics and protected-key merging.
//!
//! # Invariants
//! - Every set carries `title`, `type`, `tags` and `aliases`.
//! - `id` and `create` are only overwritten by `update` when forced.
//! - Rendering is `---`, every property in insertion order, `---`.

use crate::model::keyed_value::{KeyedValue, PropertyValue};
use log::{debug, warn};
use std::fmt::{Display, Formatter};

pub const KEY_TITLE: &str = "title";
pub const KEY_TYPE: &str = "type";
pub const KEY_TAGS: &str = "tags";
pub const KEY_ALIASES: &str = "aliases";
pub const KEY_URL: &str = "url";
pub const KEY_CREATE: &str = "create";
pub const KEY_ID: &str = "id";
pub const KEY_SOURCES: &str = "sources";
pub const KEY_NEW: &str = "new";
pub const KEY_TEMPLATE: &str = "template";
pub const KEY_DERIVED_NOTES: &str = "derived_notes";

/// Keys skipped by a non-forced `update`.
pub const PROTECTED_KEYS: &[&str] = &[KEY_ID, KEY_CREATE];

/// Insertion-ordered property mapping for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<KeyedValue>,
}

impl Default for PropertySet {
    fn default() -> Self {
        Self::base()
    }
}

impl PropertySet {
    /// Creates the mandatory base keys with empty values.
    pub fn base() -> Self {
        Self {
            entries: vec![
                KeyedValue::new(KEY_TITLE, ""),
                KeyedValue::new(KEY_TYPE, ""),
                KeyedValue::new(KEY_TAGS, Vec::<String>::new()),
                KeyedValue::new(KEY_ALIASES, Vec::<String>::new()),
            ],
        }
    }

    /// Creates the Zettelkasten variant with identity and provenance keys.
    ///
    /// `id` and `create` are supplied by the caller so identity generation
    /// stays outside the value type.
    pub fn zettelkasten(id: impl Into<String>, create: impl Into<String>) -> Self {
        Self {
            entries: vec![
                KeyedValue::new(KEY_TITLE, ""),
                KeyedValue::new(KEY_TYPE, ""),
                KeyedValue::new(KEY_URL, ""),
                KeyedValue::new(KEY_CREATE, create.into()),
                KeyedValue::new(KEY_ID, id.into()),
                KeyedValue::new(KEY_TAGS, Vec::<String>::new()),
                KeyedValue::new(KEY_ALIASES, Vec::<String>::new()),
                KeyedValue::new(KEY_SOURCES, Vec::<String>::new()),
                KeyedValue::new(KEY_NEW, true),
            ],
        }
    }

    /// Creates a set without any keys. Used by parsers and tests.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns property keys in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(KeyedValue::key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyedValue> {
        self.entries.iter()
    }

    /// Inserts or mutates one property.
    ///
    /// - New keys are inserted at the end.
    /// - Existing list values are appended to (cleared first when
    ///   `reset_if_list` is set); scalars are wrapped into one item.
    /// - Existing scalar values are overwritten.
    pub fn set_property_value(
        &mut self,
        key: &str,
        value: impl Into<PropertyValue>,
        reset_if_list: bool,
    ) {
        let value = value.into();
        let Some(index) = self.position(key) else {
            debug!("event=property_set module=model status=inserted key={key}");
            self.entries.push(KeyedValue::new(key, value));
            return;
        };

        let entry = &mut self.entries[index];
        if !entry.value().is_list() {
            entry.set_value(value);
        } else if let PropertyValue::List(items) = entry.value_mut() {
            if reset_if_list {
                items.clear();
            }
            items.extend(value.into_items());
        }
        debug!("event=property_set module=model status=changed key={key}");
    }

    /// Appends-or-inserts without resetting lists.
    pub fn add(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.set_property_value(key, value, false);
    }

    pub fn get_property_value(&self, key: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|entry| entry.key() == key)
            .map(KeyedValue::value)
    }

    /// Removes one key. Missing keys are a logged no-op.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        match self.position(key) {
            Some(index) => Some(self.entries.remove(index).value().clone()),
            None => {
                warn!("event=property_remove module=model status=missing key={key}");
                None
            }
        }
    }

    /// Merges every property of `partial` into this set.
    ///
    /// Protected keys are skipped unless `force` is set. Lists are appended,
    /// never reset.
    pub fn update(&mut self, partial: &PropertySet, force: bool) {
        for entry in partial.iter() {
            if !force && PROTECTED_KEYS.contains(&entry.key()) {
                warn!(
                    "event=property_update module=model status=skipped_protected key={}",
                    entry.key()
                );
                continue;
            }
            self.set_property_value(entry.key(), entry.value().clone(), false);
        }
    }

    /// Copies values from `partial` only where this set has a gap.
    ///
    /// Missing keys and blank text values are filled; lists take the
    /// incoming items they do not already hold; other values are kept.
    /// Protected keys are never touched.
    pub fn fill_gaps(&mut self, partial: &PropertySet) {
        for entry in partial.iter() {
            let key = entry.key();
            if PROTECTED_KEYS.contains(&key) {
                continue;
            }
            let incoming = match self.get_property_value(key) {
                None => Some(entry.value().clone()),
                Some(PropertyValue::Text(text)) if text.trim().is_empty() => {
                    Some(entry.value().clone())
                }
                Some(PropertyValue::List(items)) => {
                    let missing: Vec<String> = entry
                        .value()
                        .clone()
                        .into_items()
                        .into_iter()
                        .filter(|item| !items.contains(item))
                        .collect();
                    (!missing.is_empty()).then_some(PropertyValue::List(missing))
                }
                Some(_) => None,
            };
            match incoming {
                Some(value) => self.set_property_value(key, value, false),
                None => debug!("event=property_fill module=model status=kept key={key}"),
            }
        }
    }

    pub fn title(&self) -> &str {
        self.text(KEY_TITLE)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_property_value(KEY_TITLE, title.into(), false);
    }

    /// Returns the raw stored `type` string.
    pub fn type_tag(&self) -> &str {
        self.text(KEY_TYPE)
    }

    pub fn set_type_tag(&mut self, tag: impl Into<String>) {
        self.set_property_value(KEY_TYPE, tag.into(), false);
    }

    pub fn tags(&self) -> &[String] {
        self.list(KEY_TAGS)
    }

    pub fn add_tags(&mut self, tags: impl Into<PropertyValue>) {
        self.set_property_value(KEY_TAGS, tags, false);
    }

    pub fn aliases(&self) -> &[String] {
        self.list(KEY_ALIASES)
    }

    pub fn add_aliases(&mut self, aliases: impl Into<PropertyValue>) {
        self.set_property_value(KEY_ALIASES, aliases, false);
    }

    pub fn url(&self) -> &str {
        self.text(KEY_URL)
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.set_property_value(KEY_URL, url.into(), false);
    }

    pub fn id(&self) -> &str {
        self.text(KEY_ID)
    }

    pub fn sources(&self) -> &[String] {
        self.list(KEY_SOURCES)
    }

    pub fn add_sources(&mut self, sources: impl Into<PropertyValue>) {
        self.set_property_value(KEY_SOURCES, sources, false);
    }

    /// Text value of `key`, or `""` when absent or not text.
    pub fn text(&self, key: &str) -> &str {
        self.get_property_value(key)
            .and_then(PropertyValue::as_text)
            .unwrap_or("")
    }

    /// List value of `key`, or an empty slice when absent or not a list.
    pub fn list(&self, key: &str) -> &[String] {
        self.get_property_value(key)
            .and_then(PropertyValue::as_list)
            .unwrap_or(&[])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key() == key)
    }
}

impl Display for PropertySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "---")?;
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        writeln!(f, "---")
    }
}
