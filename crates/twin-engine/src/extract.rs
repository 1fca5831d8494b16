//! Document extraction from generator output
//!
//! Generators wrap JSON in prose or code fences. Balanced objects are cut
//! out and parsed in order of appearance, then arrays; the first one that
//! parses wins and must be an object.

use serde_json::Value;
use twin_core::{GenerationError, RawContent};

use twin_rules::json_type_name;

/// Turn raw generator output into a document, or a parse failure
pub fn extract_document(raw: RawContent) -> Result<Value, GenerationError> {
    let value = match raw {
        RawContent::Document(value) => value,
        RawContent::Text(text) => parse_embedded(&text)?,
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(GenerationError::Parse(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )))
    }
}

fn parse_embedded(text: &str) -> Result<Value, GenerationError> {
    let mut last_error = None;
    for slice in balanced_slices(text) {
        match serde_json::from_str(slice) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => GenerationError::Parse(format!("invalid JSON: {}", e)),
        None => GenerationError::Parse("no JSON document in output".to_string()),
    })
}

/// First balanced `{...}` that parses as JSON, else the first such `[...]`
pub fn balanced_json(text: &str) -> Option<&str> {
    balanced_slices(text).find(|slice| serde_json::from_str::<Value>(slice).is_ok())
}

/// Every balanced slice opening with `{`, in order, then every one with `[`
fn balanced_slices(text: &str) -> impl Iterator<Item = &str> {
    ['{', '['].into_iter().flat_map(move |open| {
        text.match_indices(open)
            .filter_map(move |(start, _)| balanced_from(text, start))
    })
}

/// Balanced slice starting at byte `start`, which must hold `{` or `[`
fn balanced_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
