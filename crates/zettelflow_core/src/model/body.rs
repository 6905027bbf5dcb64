//! Markdown body made of leveled sections.
//!
//! # Responsibility
//! - Keep ordered sections identified by `(name, heading_level)`.
//! - Provide a pure merge (`merge_into`) and an explicit `adopt`.
//!
//! # Invariants
//! - Sections render in insertion order as `#`*level, space, name, then lines.
//! - Merging concatenates lines only when name and level both match; any
//!   other incoming section is appended as an independent section.

use log::debug;
use std::fmt::{Display, Formatter};

/// Section name used for content that precedes any heading.
pub const DEFAULT_SECTION: &str = "default";

/// One heading plus its content lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodySection {
    name: String,
    heading_level: usize,
    lines: Vec<String>,
}

impl BodySection {
    pub fn new(name: impl Into<String>, heading_level: usize) -> Self {
        Self {
            name: name.into(),
            heading_level: heading_level.max(1),
            lines: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn heading_level(&self) -> usize {
        self.heading_level
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn matches(&self, name: &str, heading_level: usize) -> bool {
        self.name == name && self.heading_level == heading_level
    }
}

/// Ordered collection of body sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    sections: Vec<BodySection>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[BodySection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the first section with `name`, whatever its level.
    pub fn section(&self, name: &str) -> Option<&BodySection> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Returns the section identified by `name` and `heading_level`.
    pub fn section_at(&self, name: &str, heading_level: usize) -> Option<&BodySection> {
        self.sections
            .iter()
            .find(|section| section.matches(name, heading_level))
    }

    /// Creates an empty section, replacing one with the same identity in place.
    pub fn new_section(&mut self, name: impl Into<String>, heading_level: usize) {
        let section = BodySection::new(name, heading_level);
        match self
            .sections
            .iter_mut()
            .find(|existing| existing.matches(&section.name, section.heading_level))
        {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    /// Appends one content line, creating the section when absent.
    pub fn add_content(
        &mut self,
        text: impl Into<String>,
        section_name: &str,
        heading_level: usize,
    ) {
        let heading_level = heading_level.max(1);
        let index = match self
            .sections
            .iter()
            .position(|section| section.matches(section_name, heading_level))
        {
            Some(index) => index,
            None => {
                self.sections
                    .push(BodySection::new(section_name, heading_level));
                self.sections.len() - 1
            }
        };
        self.sections[index].push_line(text);
    }

    /// Pushes this body's sections onto a copy of `target`.
    ///
    /// Neither input is mutated. The result keeps `target`'s section order,
    /// with unmatched sections of `self` appended after it.
    pub fn merge_into(&self, target: &Body) -> Body {
        let mut merged = target.clone();
        for section in &self.sections {
            match merged
                .sections
                .iter_mut()
                .find(|existing| existing.matches(&section.name, section.heading_level))
            {
                Some(existing) => existing.lines.extend(section.lines.iter().cloned()),
                None => merged.sections.push(section.clone()),
            }
        }
        debug!(
            "event=body_merge module=model status=ok sections={}",
            merged.sections.len()
        );
        merged
    }

    /// Replaces this body's sections with `merged`.
    pub fn adopt(&mut self, merged: Body) {
        self.sections = merged.sections;
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for section in &self.sections {
            writeln!(
                f,
                "{} {}",
                "#".repeat(section.heading_level),
                section.name
            )?;
            writeln!(f, "{}", section.lines.join("\n"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Body;

    #[test]
    fn add_content_creates_missing_section() {
        let mut body = Body::new();
        body.add_content("first", "Notes", 2);
        body.add_content("second", "Notes", 2);

        let section = body.section_at("Notes", 2).expect("section should exist");
        assert_eq!(section.lines(), ["first", "second"]);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn new_section_overwrites_same_identity() {
        let mut body = Body::new();
        body.add_content("stale", "Notes", 1);
        body.new_section("Notes", 1);
        assert!(body.section_at("Notes", 1).unwrap().lines().is_empty());
    }

    #[test]
    fn merge_concatenates_matching_sections() {
        let mut incoming = Body::new();
        incoming.add_content("a", "Notes", 2);
        let mut target = Body::new();
        target.add_content("b", "Notes", 2);

        let merged = incoming.merge_into(&target);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.section_at("Notes", 2).unwrap().lines(), ["b", "a"]);
        assert_eq!(target.section_at("Notes", 2).unwrap().lines(), ["b"]);
    }

    #[test]
    fn merge_keeps_level_mismatch_as_separate_section() {
        let mut incoming = Body::new();
        incoming.add_content("a", "Notes", 2);
        let mut target = Body::new();
        target.add_content("b", "Notes", 1);

        let merged = incoming.merge_into(&target);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.section_at("Notes", 1).unwrap().lines(), ["b"]);
        assert_eq!(merged.section_at("Notes", 2).unwrap().lines(), ["a"]);
    }

    #[test]
    fn adopt_replaces_sections() {
        let mut body = Body::new();
        body.add_content("old", "Old", 1);
        let mut other = Body::new();
        other.add_content("new", "New", 1);

        body.adopt(other.clone());
        assert_eq!(body, other);
    }

    #[test]
    fn renders_headings_and_lines() {
        let mut body = Body::new();
        body.new_section("Source", 4);
        body.add_content("one", "Ideas", 1);
        body.add_content("two", "Ideas", 1);
        assert_eq!(body.to_string(), "#### Source\n\n# Ideas\none\ntwo\n");
    }
}
