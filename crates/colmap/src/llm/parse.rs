//! Lenient parsing of model output into target/source pairs.
//!
//! Models are asked for a JSON object but regularly wrap it in prose or code
//! fences, cut it off at the token limit, or answer in `a -> b` lines. The
//! parser tries a whole JSON object first, then any complete `"key": value`
//! members, then line extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ColmapError, Result};

/// One `"key": "value"` or `"key": null` member, wherever it sits in the text.
static JSON_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<target>"(?:[^"\\]|\\.)*")\s*:\s*(?:(?P<source>"(?:[^"\\]|\\.)*")|null\b)"#)
        .expect("json member pattern is valid")
});

/// One `target -> source` line, optionally bulleted or numbered.
static ARROW_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:[-*•]|\d+[.)])?\s*(?P<target>.+?)\s*(?:->|=>|→)\s*(?P<source>.*?)\s*,?\s*$",
    )
    .expect("arrow line pattern is valid")
});

/// One `target: source` line. Only tried when no arrow separator matched.
static COLON_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])?\s*(?P<target>.+?)\s*(?::|：)\s*(?P<source>.*?)\s*,?\s*$")
        .expect("colon line pattern is valid")
});

/// Answers meaning "no matching source".
const NULL_WORDS: &[&str] = &["", "null", "none", "no match", "n/a", "nil", "-"];

/// Which strategy produced the pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// A complete JSON object was found.
    Json,
    /// Pairs were recovered piece by piece from broken JSON or plain lines.
    Lines,
}

/// Pairs extracted from one model answer, in the order they appeared
/// (JSON objects come back key-sorted).
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub pairs: Vec<(String, Option<String>)>,
    pub mode: ParseMode,
}

/// Extract target/source pairs from raw model text.
///
/// # Errors
/// [`ColmapError::MalformedResponse`] when no JSON object, JSON member or
/// pair line can be found.
pub fn parse_response(text: &str) -> Result<ParsedResponse> {
    if let Some(pairs) = json_candidates(text).find_map(|candidate| parse_json(&candidate)) {
        return Ok(ParsedResponse {
            pairs,
            mode: ParseMode::Json,
        });
    }

    let mut pairs = json_members(text);
    if pairs.is_empty() {
        pairs = text.lines().filter_map(parse_line).collect();
    }
    if pairs.is_empty() {
        return Err(ColmapError::MalformedResponse(format!(
            "no mapping found in model output ({} chars)",
            text.len()
        )));
    }

    Ok(ParsedResponse {
        pairs,
        mode: ParseMode::Lines,
    })
}

/// Places a JSON object may hide: a fenced block, the outermost braces,
/// or the whole text.
fn json_candidates(text: &str) -> impl Iterator<Item = String> + '_ {
    let fenced = fenced_block(text).map(str::to_string);

    let braced = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(text[start..=end].to_string()),
        _ => None,
    };

    fenced
        .into_iter()
        .chain(braced)
        .chain(std::iter::once(text.trim().to_string()))
}

fn fenced_block(text: &str) -> Option<&str> {
    let after_open = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else {
        text.split_once("```")?.1
    };
    let body = after_open.split("```").next()?;
    Some(body.trim())
}

fn parse_json(candidate: &str) -> Option<Vec<(String, Option<String>)>> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let mut object = value.as_object()?;

    // Some models nest the answer one level down
    if object.len() == 1
        && let Some(inner) = object.get("mappings").and_then(Value::as_object)
    {
        object = inner;
    }

    let pairs = object
        .iter()
        .filter_map(|(target, value)| {
            let source = match value {
                Value::Null => None,
                Value::String(s) => clean_source(s),
                _ => return None,
            };
            Some((target.trim().to_string(), source))
        })
        .collect();

    Some(pairs)
}

/// Complete members of a JSON object that failed to parse as a whole,
/// e.g. cut off mid-value or carrying a trailing comma.
fn json_members(text: &str) -> Vec<(String, Option<String>)> {
    JSON_MEMBER
        .captures_iter(text)
        .filter_map(|caps| {
            let target = json_string(caps.name("target")?.as_str());
            let target = target.trim();
            if target.is_empty() {
                return None;
            }
            let source = caps
                .name("source")
                .and_then(|m| clean_source(&json_string(m.as_str())));
            Some((target.to_string(), source))
        })
        .collect()
}

/// Decode a quoted JSON string, keeping the raw inner text if escapes are invalid.
fn json_string(quoted: &str) -> String {
    serde_json::from_str(quoted).unwrap_or_else(|_| quoted.trim_matches('"').to_string())
}

fn parse_line(line: &str) -> Option<(String, Option<String>)> {
    let caps = ARROW_LINE
        .captures(line)
        .or_else(|| COLON_LINE.captures(line))?;
    let target = unquote(caps.name("target")?.as_str());
    if target.is_empty() || target.starts_with('{') {
        return None;
    }
    let source = caps.name("source").map_or("", |m| m.as_str());
    Some((target.to_string(), clean_source(unquote(source))))
}

/// Strip one pair of matching quotes or backticks.
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    trimmed
}

fn clean_source(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
