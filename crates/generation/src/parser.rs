//! Turn raw backend text into typed sections.
//!
//! Three strategies, tried in order:
//!
//! 1. A structured JSON payload: `{"sections": [...]}`, a bare array of
//!    sections, or an object keyed by section name. The payload may be the
//!    whole response, a fenced code block, or embedded in prose.
//! 2. Heading-based splitting on lesson plan / slides / trainer notes /
//!    exercises headings (Markdown `#`, `**bold**` or numbered).
//! 3. The whole response as one generic section.
//!
//! The result always holds at least one section with non-blank content.

use std::sync::LazyLock;

use coursecraft_core::materials::{Materials, Section, SectionType};
use regex::Regex;
use serde_json::Value;

/// Title of the section produced when nothing could be structured.
pub const GENERIC_SECTION_TITLE: &str = "Course materials";

const EMPTY_RESPONSE_TEXT: &str = "No content was generated for this course.";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?(?:\*\*|__)?[ \t]*(lesson[ \t]+plans?|slides?(?:[ \t]+notes)?|slide[ \t]+deck|trainer'?s?[ \t]+notes|facilitator[ \t]+notes|exercises?|activities)[ \t]*(?:\*\*|__)?[ \t]*(?:[:\-][^\n]*)?$",
    )
    .expect("heading regex is valid")
});

/// Which strategy produced the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Structured,
    Headings,
    Generic,
}

impl ParseStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseStrategy::Structured => "structured",
            ParseStrategy::Headings => "headings",
            ParseStrategy::Generic => "generic",
        }
    }
}

/// Parsed materials plus the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMaterials {
    pub materials: Materials,
    pub strategy: ParseStrategy,
}

/// Parse a backend response. Never fails.
pub fn parse_materials(text: &str) -> ParsedMaterials {
    let normalized = text.replace("\r\n", "\n");

    let structured = parse_structured(&normalized);
    if !structured.is_empty() {
        return ParsedMaterials {
            materials: Materials::new(structured),
            strategy: ParseStrategy::Structured,
        };
    }

    let headed = parse_headings(&normalized);
    if !headed.is_empty() {
        return ParsedMaterials {
            materials: Materials::new(headed),
            strategy: ParseStrategy::Headings,
        };
    }

    let content = match normalized.trim() {
        "" => EMPTY_RESPONSE_TEXT,
        trimmed => trimmed,
    };
    ParsedMaterials {
        materials: Materials::new(vec![Section::new(
            SectionType::LessonPlan,
            GENERIC_SECTION_TITLE,
            content,
        )]),
        strategy: ParseStrategy::Generic,
    }
}

// ---------------------------------------------------------------------------
// Structured payloads
// ---------------------------------------------------------------------------

fn parse_structured(text: &str) -> Vec<Section> {
    json_candidates(text)
        .into_iter()
        .filter_map(|candidate| serde_json::from_str::<Value>(&candidate).ok())
        .map(|value| sections_from_value(&value))
        .find(|sections| !sections.is_empty())
        .unwrap_or_default()
}

/// Candidate JSON snippets, most specific first: the whole text, a
/// ```` ```json ```` block, any fenced block, then every embedded value in
/// order of appearance.
fn json_candidates(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut out = vec![trimmed.to_string()];
    if let Some(block) = fenced_block(trimmed, Some("json")) {
        out.push(block);
    }
    if let Some(block) = fenced_block(trimmed, None) {
        out.push(block);
    }
    out.extend(embedded_json_values(trimmed));
    out
}

fn fenced_block(content: &str, language: Option<&str>) -> Option<String> {
    const FENCE: &str = "```";
    let mut search = content;
    loop {
        let start = search.find(FENCE)?;
        let after_start = &search[start + FENCE.len()..];
        let line_end = after_start.find('\n')?;
        let tag = after_start[..line_end].trim();
        let rest = &after_start[line_end + 1..];

        let wanted = language.map_or(true, |lang| tag.eq_ignore_ascii_case(lang));
        if !wanted {
            search = after_start;
            continue;
        }
        let end = rest.find(FENCE)?;
        return Some(rest[..end].trim().to_string());
    }
}

fn embedded_json_values(content: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut resume_at = 0;
    for (idx, ch) in content.char_indices() {
        if idx < resume_at || (ch != '{' && ch != '[') {
            continue;
        }
        let candidate = &content[idx..];
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(_)) = stream.next() {
            let end = stream.byte_offset();
            if end > 0 {
                values.push(candidate[..end].to_string());
                resume_at = idx + end;
            }
        }
    }
    values
}

fn sections_from_value(value: &Value) -> Vec<Section> {
    match value {
        Value::Array(items) => items.iter().filter_map(section_from_item).collect(),
        Value::Object(map) => {
            if let Some(inner) = map.get("sections").or_else(|| map.get("materials")) {
                return sections_from_value(inner);
            }
            let mut sections: Vec<Section> = map
                .iter()
                .filter_map(|(key, v)| {
                    let section_type = SectionType::from_label(key)?;
                    let content = content_of(v)?;
                    let title = v
                        .get("title")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .unwrap_or(section_type.default_title());
                    Some(Section::new(section_type, title, content))
                })
                .collect();
            // Object keys come back alphabetically; restore presentation order.
            sections.sort_by_key(|s| presentation_index(s.section_type));
            sections
        }
        _ => Vec::new(),
    }
}

fn section_from_item(item: &Value) -> Option<Section> {
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let section_type = ["type", "section", "kind", "name"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find_map(SectionType::from_label)
        .or_else(|| title.and_then(SectionType::from_label))?;

    let content = content_of(item)?;
    Some(Section::new(
        section_type,
        title.unwrap_or(section_type.default_title()),
        content,
    ))
}

/// Non-blank text of a section value: a string, a list of strings, or an
/// object with a `content`/`body`/`text`/`markdown` field.
fn content_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            return ["content", "body", "text", "markdown"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(content_of)
        }
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn presentation_index(section_type: SectionType) -> usize {
    SectionType::ALL
        .iter()
        .position(|t| *t == section_type)
        .unwrap_or(SectionType::ALL.len())
}

// ---------------------------------------------------------------------------
// Heading heuristics
// ---------------------------------------------------------------------------

fn parse_headings(text: &str) -> Vec<Section> {
    let headings: Vec<(usize, usize, SectionType)> = HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let section_type = SectionType::from_label(caps.get(1)?.as_str())?;
            Some((whole.start(), whole.end(), section_type))
        })
        .collect();

    let Some(&(first_start, _, _)) = headings.first() else {
        return Vec::new();
    };
    let preamble = text[..first_start].trim();

    let mut sections: Vec<Section> = Vec::with_capacity(headings.len());
    for (i, &(_, body_start, section_type)) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(text.len(), |next| next.0);
        let body = text[body_start..body_end].trim();
        if body.is_empty() {
            continue;
        }
        sections.push(Section::new(section_type, section_type.default_title(), body));
    }

    if let Some(first) = sections.first_mut() {
        if !preamble.is_empty() {
            first.content = format!("{preamble}\n\n{}", first.content);
        }
    }
    sections
}
