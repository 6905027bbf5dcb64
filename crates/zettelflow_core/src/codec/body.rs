//! Markdown body parsing.

use crate::model::body::{Body, DEFAULT_SECTION};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#+)\s+(.+)$").expect("valid header regex"));

/// Parses body text into leveled sections.
///
/// Content before the first header lands in the `default` section at
/// level 1. Blank lines opening or closing a section are dropped; interior
/// blank lines are kept. A repeated header continues its earlier section.
pub fn parse_body(text: &str) -> Body {
    let mut body = Body::new();
    let mut current = (DEFAULT_SECTION.to_string(), 1usize);
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            flush(&mut body, &current, &mut buffer);
            let level = caps.get(1).map_or(1, |hashes| hashes.as_str().len());
            let name = caps.get(2).map_or("", |name| name.as_str()).trim().to_string();
            if body.section_at(&name, level).is_none() {
                body.new_section(name.clone(), level);
            }
            current = (name, level);
        } else if !line.trim().is_empty() || !buffer.is_empty() {
            buffer.push(line);
        }
    }
    flush(&mut body, &current, &mut buffer);
    body
}

fn flush(body: &mut Body, (name, level): &(String, usize), buffer: &mut Vec<&str>) {
    while buffer.last().is_some_and(|line| line.trim().is_empty()) {
        buffer.pop();
    }
    for line in buffer.drain(..) {
        body.add_content(line, name, *level);
    }
}

#[cfg(test)]
mod tests {
    use super::parse_body;

    #[test]
    fn splits_sections_by_header() {
        let body = parse_body("#### Source\n\n# Ideas\none\n\ntwo\n\n");
        assert_eq!(body.len(), 2);
        assert!(body.section_at("Source", 4).unwrap().lines().is_empty());
        assert_eq!(
            body.section_at("Ideas", 1).unwrap().lines(),
            ["one", "", "two"]
        );
    }

    #[test]
    fn content_before_first_header_goes_to_default_section() {
        let body = parse_body("\nintro\n# Next\nx");
        assert_eq!(body.section_at("default", 1).unwrap().lines(), ["intro"]);
        assert_eq!(body.section_at("Next", 1).unwrap().lines(), ["x"]);
        assert_eq!(body.sections()[0].name(), "default");
    }

    #[test]
    fn header_name_is_trimmed_and_level_counted() {
        let body = parse_body("###   Deep   \nline");
        let section = body.section_at("Deep", 3).expect("section");
        assert_eq!(section.lines(), ["line"]);
    }

    #[test]
    fn empty_text_has_no_sections() {
        assert!(parse_body("").is_empty());
        assert!(parse_body("\n\n").is_empty());
    }
}
