//! Tolerant JSON recovery from free-form model output.
//!
//! Models wrap JSON in prose, code fences, or reasoning traces. These helpers
//! try the whole text first, then the widest `{...}` / `[...]` span, then the
//! first balanced span.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static ARRAY_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

pub fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let parsed = parse_candidates(text, &OBJECT_SPAN, '{', '}')?;
    match parsed {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

pub fn extract_array(text: &str) -> Option<Vec<Value>> {
    let parsed = parse_candidates(text, &ARRAY_SPAN, '[', ']')?;
    match parsed {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// Array of strings, dropping non-string entries.
pub fn extract_string_list(text: &str) -> Option<Vec<String>> {
    let items = extract_array(text)?;
    Some(
        items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                _ => None,
            })
            .collect(),
    )
}

fn parse_candidates(text: &str, span: &Regex, open: char, close: char) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed)
        && value_matches(&value, open)
    {
        return Some(value);
    }

    if let Some(m) = span.find(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(m.as_str())
    {
        return Some(value);
    }

    let balanced = first_balanced(trimmed, open, close)?;
    serde_json::from_str(balanced).ok()
}

fn value_matches(value: &Value, open: char) -> bool {
    match open {
        '{' => value.is_object(),
        _ => value.is_array(),
    }
}

/// First `open ... close` span with balanced nesting, skipping delimiters inside strings.
fn first_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
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
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_surrounded_by_prose() {
        let text = "Sure! Here is the data:\n{\"amount\": \"$2M\", \"stage\": null}\nHope this helps.";
        let map = extract_object(text).unwrap();
        assert_eq!(map["amount"], "$2M");
        assert!(map["stage"].is_null());
    }

    #[test]
    fn object_inside_code_fence() {
        let text = "```json\n{\"startup\": \"Ather\"}\n```";
        assert_eq!(extract_object(text).unwrap()["startup"], "Ather");
    }

    #[test]
    fn falls_back_to_first_balanced_object() {
        // The widest span covers both objects and is not valid JSON on its own.
        let text = "{\"a\": 1} and later {\"b\": 2}";
        let map = extract_object(text).unwrap();
        assert_eq!(map["a"], 1);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_balancing() {
        let text = "noise {\"note\": \"use } carefully\"} trailing } brace";
        let map = extract_object(text).unwrap();
        assert_eq!(map["note"], "use } carefully");
    }

    #[test]
    fn object_missing_returns_none() {
        assert!(extract_object("no json here").is_none());
        assert!(extract_object("{not: valid").is_none());
    }

    #[test]
    fn string_list_from_noisy_output() {
        let text = "Queries:\n[\"startup india seed fund\", \"  \", 42, \"tn startup grant\"]";
        assert_eq!(
            extract_string_list(text).unwrap(),
            vec!["startup india seed fund", "tn startup grant"]
        );
    }

    #[test]
    fn bare_array_parses_directly() {
        let items = extract_array("[\"https://a.com\"]").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn object_is_not_an_array() {
        assert!(extract_array("{\"queries\": 1}").is_none());
    }
}
