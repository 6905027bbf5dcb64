//! Note-type tags and their lifecycle metadata.
//!
//! # Invariants
//! - Upgrade edges are directed and acyclic:
//!   fleeting -> literature|atomic, literature -> atomic|permanent,
//!   atomic -> permanent, permanent is terminal.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Canonical Zettelkasten lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    /// Quick capture of a passing thought.
    Fleeting,
    /// Summary of a source the reader worked through.
    Literature,
    /// One self-contained idea.
    Atomic,
    /// Refined note meant to stay.
    Permanent,
}

impl NoteType {
    pub const ALL: [NoteType; 4] = [
        NoteType::Fleeting,
        NoteType::Literature,
        NoteType::Atomic,
        NoteType::Permanent,
    ];

    /// Baseline tag used when a stored type cannot be recognized.
    pub const BASELINE: NoteType = NoteType::Fleeting;

    pub fn tag(self) -> &'static str {
        match self {
            Self::Fleeting => "fleeting",
            Self::Literature => "literature",
            Self::Atomic => "atomic",
            Self::Permanent => "permanent",
        }
    }

    /// Parses a stored tag, ignoring case and surrounding whitespace.
    pub fn from_tag(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|note_type| note_type.tag() == normalized)
    }

    /// Parses a stored tag, falling back to [`NoteType::BASELINE`].
    pub fn from_tag_or_baseline(value: &str) -> Self {
        Self::from_tag(value).unwrap_or(Self::BASELINE)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fleeting => "Fleeting",
            Self::Literature => "Literature",
            Self::Atomic => "Atomic",
            Self::Permanent => "Permanent",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Fleeting => "🌱",
            Self::Literature => "📚",
            Self::Atomic => "⚛️",
            Self::Permanent => "💎",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Fleeting => "A temporary note for quick thoughts or ideas.",
            Self::Literature => "A note summarizing literature or research findings.",
            Self::Atomic => "A small, self-contained note that can be linked to others.",
            Self::Permanent => "A well-structured note that is meant to be permanent.",
        }
    }

    /// Legal upgrade targets from this stage.
    pub fn upgrade_targets(self) -> &'static [NoteType] {
        match self {
            Self::Fleeting => &[NoteType::Literature, NoteType::Atomic],
            Self::Literature => &[NoteType::Atomic, NoteType::Permanent],
            Self::Atomic => &[NoteType::Permanent],
            Self::Permanent => &[],
        }
    }

    pub fn can_upgrade_to(self, target: NoteType) -> bool {
        self.upgrade_targets().contains(&target)
    }
}

impl Display for NoteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Tag string that does not name a known note type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNoteTypeTag(pub String);

impl Display for UnknownNoteTypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown note type: {}", self.0)
    }
}

impl Error for UnknownNoteTypeTag {}

impl FromStr for NoteType {
    type Err = UnknownNoteTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownNoteTypeTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::NoteType;

    #[test]
    fn tags_round_trip_case_insensitively() {
        for note_type in NoteType::ALL {
            assert_eq!(NoteType::from_tag(note_type.tag()), Some(note_type));
        }
        assert_eq!(NoteType::from_tag(" Atomic "), Some(NoteType::Atomic));
        assert_eq!("permanent".parse::<NoteType>(), Ok(NoteType::Permanent));
    }

    #[test]
    fn unknown_tags_fall_back_to_baseline() {
        assert_eq!(NoteType::from_tag("journal"), None);
        assert_eq!(NoteType::from_tag_or_baseline("journal"), NoteType::Fleeting);
        assert!("journal".parse::<NoteType>().is_err());
    }

    #[test]
    fn upgrade_table_is_acyclic_and_terminal_at_permanent() {
        assert!(NoteType::Fleeting.can_upgrade_to(NoteType::Literature));
        assert!(NoteType::Fleeting.can_upgrade_to(NoteType::Atomic));
        assert!(NoteType::Literature.can_upgrade_to(NoteType::Permanent));
        assert!(!NoteType::Atomic.can_upgrade_to(NoteType::Fleeting));
        assert!(NoteType::Permanent.upgrade_targets().is_empty());
    }
}
