//! Per-type note defaults.
//!
//! # Responsibility
//! - Supply the default property set and body of each note type.
//! - Host the pre/post serialization hooks notes call while rendering.
//!
//! # Invariants
//! - Every Zettelkasten blueprint body starts with the `**🔗Source**`
//!   section at heading level 4.
//! - `pre_process` is idempotent.

use crate::model::body::Body;
use crate::model::note_type::NoteType;
use crate::model::property::PropertySet;
use crate::prompt::UserPrompt;
use chrono::Utc;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const SOURCE_SECTION: &str = "**🔗Source**";
pub const SOURCE_SECTION_LEVEL: usize = 4;

/// Defaults and hooks shared by every note of one blueprint.
pub trait NoteBlueprint: Debug + Send + Sync {
    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    fn default_properties(&self) -> PropertySet;

    fn default_body(&self) -> Body;

    /// Called on the property set right before it is rendered.
    fn pre_process(&self, _properties: &mut PropertySet) {}

    /// Called on the rendered text. May consult the prompt.
    fn post_process(&self, text: String, _prompt: &dyn UserPrompt) -> String {
        text
    }
}

/// Plain note: base property set and a Source section.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicBlueprint;

impl NoteBlueprint for BasicBlueprint {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn default_properties(&self) -> PropertySet {
        PropertySet::base()
    }

    fn default_body(&self) -> Body {
        source_body()
    }
}

/// Zettelkasten note of one lifecycle stage.
#[derive(Debug, Clone, Copy)]
pub struct ZettelBlueprint {
    note_type: NoteType,
}

impl ZettelBlueprint {
    pub fn new(note_type: NoteType) -> Self {
        Self { note_type }
    }

    pub fn note_type(&self) -> NoteType {
        self.note_type
    }
}

impl NoteBlueprint for ZettelBlueprint {
    fn name(&self) -> &'static str {
        self.note_type.tag()
    }

    fn default_properties(&self) -> PropertySet {
        PropertySet::zettelkasten(generate_zettel_id(), generate_date())
    }

    fn default_body(&self) -> Body {
        let mut body = source_body();
        match self.note_type {
            NoteType::Fleeting => body.new_section("💥Ideas/Thoughts", 1),
            NoteType::Literature | NoteType::Permanent => body.new_section("🗃️content", 1),
            NoteType::Atomic => {
                body.new_section("**💭Thoughts:", 4);
                body.new_section("⚡️Key Points", 1);
            }
        }
        body
    }

    /// Adds the note id to its aliases once.
    fn pre_process(&self, properties: &mut PropertySet) {
        let id = properties.id().to_string();
        if id.is_empty() || properties.aliases().iter().any(|alias| *alias == id) {
            return;
        }
        properties.add_aliases(id);
    }
}

/// Returns the Zettelkasten blueprint of every note type.
pub fn zettel_blueprints() -> Vec<(NoteType, Arc<dyn NoteBlueprint>)> {
    NoteType::ALL
        .into_iter()
        .map(|note_type| {
            let blueprint: Arc<dyn NoteBlueprint> = Arc::new(ZettelBlueprint::new(note_type));
            (note_type, blueprint)
        })
        .collect()
}

fn source_body() -> Body {
    let mut body = Body::new();
    body.new_section(SOURCE_SECTION, SOURCE_SECTION_LEVEL);
    body
}

/// Generates a note id: base-36 millisecond timestamp plus a random suffix.
pub fn generate_zettel_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let random = Uuid::new_v4().simple().to_string();
    let id = format!("{}{}", to_base36(millis), &random[..8]);
    debug!("event=zettel_id module=model status=ok");
    id
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn generate_date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{
        generate_date, generate_zettel_id, to_base36, BasicBlueprint, NoteBlueprint,
        ZettelBlueprint, SOURCE_SECTION,
    };
    use crate::model::note_type::NoteType;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn generated_ids_differ_and_dates_are_iso() {
        assert_ne!(generate_zettel_id(), generate_zettel_id());
        let date = generate_date();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }

    #[test]
    fn every_zettel_body_starts_with_source_section() {
        for note_type in NoteType::ALL {
            let body = ZettelBlueprint::new(note_type).default_body();
            let first = &body.sections()[0];
            assert_eq!(first.name(), SOURCE_SECTION);
            assert_eq!(first.heading_level(), 4);
        }
        let atomic = ZettelBlueprint::new(NoteType::Atomic).default_body();
        assert!(atomic.section_at("**💭Thoughts:", 4).is_some());
        assert!(atomic.section_at("⚡️Key Points", 1).is_some());
    }

    #[test]
    fn pre_process_adds_id_alias_once() {
        let blueprint = ZettelBlueprint::new(NoteType::Fleeting);
        let mut properties = blueprint.default_properties();
        let id = properties.id().to_string();
        blueprint.pre_process(&mut properties);
        blueprint.pre_process(&mut properties);
        assert_eq!(properties.aliases(), [id]);
    }

    #[test]
    fn basic_blueprint_uses_base_properties() {
        let properties = BasicBlueprint.default_properties();
        assert_eq!(properties.keys(), vec!["title", "type", "tags", "aliases"]);
        assert_eq!(BasicBlueprint.default_body().len(), 1);
    }
}
