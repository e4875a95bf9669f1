//! Enumerated value extraction
//!
//! Two textual shapes are recognised:
//! - alternatives: `"mode": "local" | "remote"`
//! - string arrays: `"mode": ["local", "remote"]`
//!
//! Alternatives take precedence when a field appears in both shapes. For
//! alternatives every quoted token of the match is kept, a quoted field name
//! included, so `"mode": "local" | "remote"` yields `mode`, `local`, `remote`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use sync_schema::EnumTable;

static ALTERNATIVES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:"(\w+)"|\b(\w+))\s*:\s*"[^"\n]*"(?:\s*\|\s*"[^"\n]*")+"#)
        .expect("alternatives pattern is valid")
});

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"\n]*)""#).expect("quoted pattern is valid"));

static STRING_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:"(\w+)"|\b(\w+))\s*:\s*(\[\s*"[^"\n]*"(?:\s*,\s*"[^"\n]*")*\s*,?\s*\])"#)
        .expect("string array pattern is valid")
});

/// Extract enumerated fields from `text`
///
/// Array lists that are not valid JSON string arrays are skipped.
#[must_use]
pub fn extract_enum_values(text: &str) -> EnumTable {
    let mut table = EnumTable::new();
    let mut from_alternatives = HashSet::new();

    for caps in ALTERNATIVES.captures_iter(text) {
        let (Some(field), Some(whole)) = (field_name(&caps), caps.get(0)) else {
            continue;
        };
        let alternatives = QUOTED
            .captures_iter(whole.as_str())
            .filter_map(|quoted| quoted.get(1))
            .map(|m| m.as_str());
        table.insert(field, alternatives);
        from_alternatives.insert(field);
    }

    for caps in STRING_ARRAY.captures_iter(text) {
        let (Some(field), Some(list)) = (field_name(&caps), caps.get(3)) else {
            continue;
        };
        if from_alternatives.contains(field) {
            continue;
        }
        match serde_json::from_str::<Vec<String>>(list.as_str()) {
            Ok(values) => {
                table.insert(field, values);
            }
            Err(err) => {
                tracing::debug!("skipping undecodable enum list for '{}': {}", field, err);
            }
        }
    }

    table
}

fn field_name<'t>(caps: &regex::Captures<'t>) -> Option<&'t str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alternatives_are_collected_and_deduplicated() {
        let table = extract_enum_values(r#""dmPolicy": "pairing" | "allowlist" | "open" | "pairing""#);
        assert_eq!(table.get("dmPolicy").unwrap(), ["dmPolicy", "pairing", "allowlist", "open"]);
    }

    #[test]
    fn bare_field_names() {
        let table = extract_enum_values(r#"bind: "loopback" | "lan" | "tailnet""#);
        assert_eq!(table.get("bind").unwrap(), ["loopback", "lan", "tailnet"]);
    }

    #[test]
    fn single_quoted_value_is_not_an_enum() {
        assert!(extract_enum_values(r#""mode": "local""#).is_empty());
    }

    #[test]
    fn string_arrays_are_decoded() {
        let table = extract_enum_values(r#""level": ["debug", "info", "warn"]"#);
        assert_eq!(table.get("level").unwrap(), ["debug", "info", "warn"]);
    }

    #[test]
    fn alternatives_take_precedence_over_arrays() {
        let text = r#"
            "mode": ["x", "y"]
            "mode": "local" | "remote"
        "#;
        let table = extract_enum_values(text);
        assert_eq!(table.get("mode").unwrap(), ["mode", "local", "remote"]);
    }

    #[test]
    fn quoted_field_name_is_one_of_the_alternatives() {
        let table = extract_enum_values(r#""mode": "a" | "b""#);
        assert_eq!(table.get("mode").unwrap(), ["mode", "a", "b"]);

        // a value equal to the field name is kept once
        let table = extract_enum_values(r#""mode": "mode" | "b""#);
        assert_eq!(table.get("mode").unwrap(), ["mode", "b"]);
    }

    #[test]
    fn undecodable_arrays_are_skipped() {
        let text = r#""broken": ["a", "b",] "fine": ["c"]"#;
        let table = extract_enum_values(text);

        assert!(!table.contains_key("broken"));
        assert_eq!(table.get("fine").unwrap(), ["c"]);
    }

    #[test]
    fn several_fields_in_one_text() {
        let text = r#"{ "theme": "dark" | "light", "scope": ["per-sender", "global"] }"#;
        let table = extract_enum_values(text);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["theme", "scope"]);
    }
}
