//! Frontmatter block splitting and parsing.
//!
//! # Invariants
//! - The block is delimited by the first two lines that are exactly `---`,
//!   the first of which must open the text.
//! - Keys keep their order of appearance; repeated keys keep the last value.

use crate::model::keyed_value::PropertyValue;
use crate::model::property::PropertySet;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

const DELIMITER: &str = "---";

static KEY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s:#-][^:]*):(.*)$").expect("valid frontmatter key regex"));
static ITEM_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*- ?(.*)$").expect("valid frontmatter item regex"));

/// Splits `text` into its frontmatter block (without delimiters) and the
/// remaining body text.
///
/// Returns `None` for the block when the text does not open with a
/// complete frontmatter block; the whole text is body then.
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    let mut offset = 0;
    let mut block_start = None;
    for line in text.split_inclusive('\n') {
        let next = offset + line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        match block_start {
            None if trimmed == DELIMITER => block_start = Some(next),
            None => return (None, text),
            Some(start) if trimmed == DELIMITER => {
                return (Some(&text[start..offset]), &text[next..]);
            }
            Some(_) => {}
        }
        offset = next;
    }
    (None, text)
}

/// Parses one frontmatter block into an ordered property set.
pub fn parse_frontmatter(block: &str) -> PropertySet {
    let mut properties = PropertySet::empty();
    let mut pending: Option<(String, Vec<String>)> = None;

    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some((_, items)) = pending.as_mut() {
            if let Some(caps) = ITEM_LINE_RE.captures(line) {
                let item = caps.get(1).map_or("", |item| item.as_str());
                items.push(item.trim().to_string());
                continue;
            }
        }
        flush_pending(&mut properties, pending.take());

        let Some(caps) = KEY_LINE_RE.captures(line) else {
            warn!("event=frontmatter_parse module=codec status=skipped_line");
            continue;
        };
        let key = caps.get(1).map_or("", |key| key.as_str()).trim();
        let raw = caps.get(2).map_or("", |raw| raw.as_str()).trim();
        if raw.is_empty() {
            pending = Some((key.to_string(), Vec::new()));
        } else {
            properties.set_property_value(key, parse_scalar(raw), true);
        }
    }
    flush_pending(&mut properties, pending);
    properties
}

/// Returns whether the frontmatter of `text` carries `template: true`.
pub fn is_template_text(text: &str) -> bool {
    let (Some(block), _) = split_frontmatter(text) else {
        return false;
    };
    parse_frontmatter(block)
        .get_property_value(crate::model::property::KEY_TEMPLATE)
        .and_then(PropertyValue::as_flag)
        .unwrap_or(false)
}

fn flush_pending(properties: &mut PropertySet, pending: Option<(String, Vec<String>)>) {
    let Some((key, items)) = pending else {
        return;
    };
    let value = if items.is_empty() {
        PropertyValue::Text(String::new())
    } else {
        PropertyValue::List(items)
    };
    properties.set_property_value(&key, value, true);
}

fn parse_scalar(raw: &str) -> PropertyValue {
    if let Some(inner) = unquote(raw) {
        return PropertyValue::Text(inner.to_string());
    }
    match raw {
        "[]" => return PropertyValue::List(Vec::new()),
        "true" => return PropertyValue::Flag(true),
        "false" => return PropertyValue::Flag(false),
        _ => {}
    }
    if raw.starts_with('[') && raw.ends_with(']') {
        match serde_yaml::from_str::<Vec<String>>(raw) {
            Ok(items) => return PropertyValue::List(items),
            Err(err) => {
                warn!("event=frontmatter_parse module=codec status=flow_list_fallback error={err}");
            }
        }
    }
    PropertyValue::Text(raw.to_string())
}

/// Strips one matching pair of `"` or `'` around a scalar.
fn unquote(raw: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

#[cfg(test)]
mod tests {
    use super::{is_template_text, parse_frontmatter, split_frontmatter};
    use crate::model::keyed_value::PropertyValue;

    #[test]
    fn splits_leading_block_only() {
        let (block, body) = split_frontmatter("---\ntitle: A\n---\n# H\n");
        assert_eq!(block, Some("title: A\n"));
        assert_eq!(body, "# H\n");

        let (block, body) = split_frontmatter("# H\n---\n");
        assert_eq!(block, None);
        assert_eq!(body, "# H\n");

        let (block, _) = split_frontmatter("---\nunterminated: x\n");
        assert_eq!(block, None);
    }

    #[test]
    fn parses_scalar_flag_and_list_forms() {
        let properties = parse_frontmatter(
            "title: Foo\nnew: true\ntags:\n  - a\n  - b\naliases: []\nurl: \nsources: [\"x\", \"y\"]\n",
        );
        assert_eq!(properties.title(), "Foo");
        assert_eq!(
            properties.get_property_value("new"),
            Some(&PropertyValue::Flag(true))
        );
        assert_eq!(properties.tags(), ["a", "b"]);
        assert!(properties.aliases().is_empty());
        assert_eq!(properties.url(), "");
        assert_eq!(properties.sources(), ["x", "y"]);
        assert_eq!(
            properties.keys(),
            vec!["title", "new", "tags", "aliases", "url", "sources"]
        );
    }

    #[test]
    fn keeps_values_with_colons_verbatim() {
        let properties = parse_frontmatter("url: https://example.com/a\n");
        assert_eq!(properties.url(), "https://example.com/a");
    }

    #[test]
    fn quoted_scalars_lose_one_quote_pair() {
        let properties = parse_frontmatter(
            "type: \"permanent\"\ntitle: 'Quoted'\nurl: \"\"\"x\"\"\"\nnew: \"true\"\n",
        );
        assert_eq!(properties.type_tag(), "permanent");
        assert_eq!(properties.title(), "Quoted");
        assert_eq!(properties.url(), "\"\"x\"\"");
        assert_eq!(
            properties.get_property_value("new"),
            Some(&PropertyValue::Text("true".to_string()))
        );
    }

    #[test]
    fn detects_template_marker() {
        assert!(is_template_text("---\ntemplate: true\n---\n"));
        assert!(!is_template_text("---\ntemplate: false\n---\n"));
        assert!(!is_template_text("no frontmatter"));
    }
}
