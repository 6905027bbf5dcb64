//! Note text codec.
//!
//! # Responsibility
//! - Parse rendered note text back into a property set and a body.
//!
//! # Invariants
//! - `parse_note_text` inverts `PropertySet`/`Body` rendering for values
//!   without leading or trailing blank lines.

mod body;
mod frontmatter;

pub use body::parse_body;
pub use frontmatter::{is_template_text, parse_frontmatter, split_frontmatter};

use crate::model::body::Body;
use crate::model::property::PropertySet;
use log::debug;

/// Property set and body decoded from one note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    pub properties: PropertySet,
    pub body: Body,
}

/// Decodes full note text. Text without frontmatter is all body.
pub fn parse_note_text(text: &str) -> ParsedNote {
    let (block, body_text) = split_frontmatter(text);
    let properties = block.map_or_else(PropertySet::empty, parse_frontmatter);
    let body = parse_body(body_text);
    debug!(
        "event=note_parse module=codec status=ok properties={} sections={}",
        properties.len(),
        body.len()
    );
    ParsedNote { properties, body }
}
