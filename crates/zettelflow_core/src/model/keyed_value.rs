//! Single named frontmatter value.
//!
//! # Responsibility
//! - Hold one `key -> value` pair where the value is text, a flag or a list.
//! - Render the pair as YAML-like frontmatter line(s).
//!
//! # Invariants
//! - Rendering is a pure function of `(key, value)`.
//! - An empty list renders as `key: []`; a non-empty list renders one
//!   `  - item` line per element in list order.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Value carried by one frontmatter property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl PropertyValue {
    /// Returns the text payload for `Text` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the flag payload for `Flag` values.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the items for `List` values.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Flattens any value into list items, used when appending onto a list.
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Text(value) => vec![value],
            Self::Flag(value) => vec![value.to_string()],
            Self::List(items) => items,
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value}"),
            Self::Flag(value) => write!(f, "{value}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PropertyValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|item| (*item).to_string()).collect())
    }
}

/// One named property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedValue {
    key: String,
    value: PropertyValue,
}

impl KeyedValue {
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut PropertyValue {
        &mut self.value
    }

    pub fn set_value(&mut self, value: impl Into<PropertyValue>) {
        self.value = value.into();
    }
}

impl Display for KeyedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            PropertyValue::List(items) if items.is_empty() => writeln!(f, "{}: []", self.key),
            PropertyValue::List(items) => {
                writeln!(f, "{}:", self.key)?;
                for item in items {
                    writeln!(f, "  - {item}")?;
                }
                Ok(())
            }
            scalar => writeln!(f, "{}: {}", self.key, scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyedValue, PropertyValue};

    #[test]
    fn scalar_renders_on_one_line() {
        assert_eq!(KeyedValue::new("title", "Foo").to_string(), "title: Foo\n");
        assert_eq!(KeyedValue::new("new", true).to_string(), "new: true\n");
    }

    #[test]
    fn empty_list_renders_brackets() {
        let value = KeyedValue::new("tags", Vec::<String>::new());
        assert_eq!(value.to_string(), "tags: []\n");
    }

    #[test]
    fn list_renders_one_item_per_line_in_order() {
        let value = KeyedValue::new("tags", vec!["b", "a"]);
        assert_eq!(value.to_string(), "tags:\n  - b\n  - a\n");
    }

    #[test]
    fn into_items_wraps_scalars() {
        assert_eq!(PropertyValue::from("x").into_items(), vec!["x".to_string()]);
        assert_eq!(
            PropertyValue::from(false).into_items(),
            vec!["false".to_string()]
        );
    }
}
