//! Tolerant-then-strict JSON recovery for free-text model responses.
//!
//! Attempts, in order:
//! 1. strip a surrounding ```` ```json ```` / ```` ``` ```` fence
//! 2. parse directly
//! 3. drop `//` and `/* */` comments and trailing commas, parse again
//! 4. try each balanced `{...}` region in turn and keep the first one that
//!    parses and carries an expected output key
//!
//! When every attempt fails a [`ParseError`] is returned. Nothing is ever
//! substituted for the model's answer.

use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::types::DataMap;

/// Characters of offending content kept in a [`ParseError`]
pub const PREVIEW_CHARS: usize = 300;

/// Parse a model response into a JSON object.
///
/// `schema` lists the keys the caller expects; the structured fallback
/// rejects an extracted object that contains none of them. An empty schema
/// accepts any object.
pub fn parse_model_output(raw: &str, schema: &[&str]) -> Result<DataMap, ParseError> {
    let content = strip_fences(raw);

    let json_error = match parse_object(content) {
        Ok(map) => return Ok(map),
        Err(e) => e,
    };
    debug!(error = %json_error, "direct JSON parse failed, attempting repair");

    let cleaned = strip_comments_and_trailing_commas(content);
    let repair_error = if cleaned != content {
        match parse_object(&cleaned) {
            Ok(map) => return Ok(map),
            Err(e) => Some(e),
        }
    } else {
        None
    };

    let structured_error = match parse_structured(&cleaned, schema) {
        Ok(map) => return Ok(map),
        Err(e) => e,
    };

    Err(ParseError {
        json_error,
        repair_error,
        structured_error,
        preview: preview(content),
        content_len: content.chars().count(),
    })
}

/// Remove a leading ```` ```json ````/```` ``` ```` and a trailing ```` ``` ````.
pub fn strip_fences(text: &str) -> &str {
    let mut content = text.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

fn parse_object(text: &str) -> Result<DataMap, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind_of(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_structured(text: &str, schema: &[&str]) -> Result<DataMap, String> {
    let mut last_error = "no complete JSON object found".to_string();
    for (start, _) in text.match_indices('{') {
        let Some(candidate) = balanced_object(text, start) else {
            continue;
        };
        match parse_object(candidate) {
            Ok(map) if schema.is_empty() || schema.iter().any(|key| map.contains_key(*key)) => {
                return Ok(map);
            }
            Ok(_) => {
                last_error = format!(
                    "object contains none of the expected keys: {}",
                    schema.join(", ")
                );
            }
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

/// Remove comments outside string literals, then commas that directly
/// precede `}` or `]`.
pub fn strip_comments_and_trailing_commas(text: &str) -> String {
    drop_trailing_commas(&drop_comments(text))
}

fn drop_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn drop_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Balanced `{...}` region opening at byte `start`, honouring string literals.
fn balanced_object(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
