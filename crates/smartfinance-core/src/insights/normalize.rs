//! Provider answer normalization
//!
//! Turns whatever the provider sent back into an ordered list of insight
//! strings. Providers are asked for prose but sometimes reply with a JSON
//! list or an object wrapping the list, so the answer is first classified
//! into a [`ProviderPayload`] and then flattened.
//!
//! Text rules:
//! - `\r\n` and `\r` become `\n`, then the text is split into lines
//! - one leading list marker (`-`, `•` or `N.`) is removed with its spacing
//! - lines are trimmed and blank lines dropped
//!
//! Emphasis (`**...**`) is passed through untouched; [`emphasis_to_html`]
//! is available for renderers that want markup.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Shape of a provider answer
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    /// Free text, one insight per line
    Text(String),
    /// Already a list of items
    Items(Vec<Value>),
    /// Object carrying the answer under `insights`
    Wrapped(Map<String, Value>),
    /// Anything else (numbers, booleans, null)
    Other(Value),
}

impl ProviderPayload {
    /// Classify a raw answer string
    ///
    /// Only answers that look like a JSON array or object and parse as one
    /// are treated as structured; everything else is text.
    pub fn from_answer(answer: &str) -> Self {
        let trimmed = answer.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<Value>(answer) {
                return Self::from_value(value);
            }
        }
        ProviderPayload::Text(answer.to_string())
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => ProviderPayload::Text(text),
            Value::Array(items) => ProviderPayload::Items(items),
            Value::Object(map) => ProviderPayload::Wrapped(map),
            other => ProviderPayload::Other(other),
        }
    }

    /// Flatten into insight items, preserving source order
    pub fn normalize(&self) -> Vec<String> {
        match self {
            ProviderPayload::Text(text) => normalize_text(text),
            ProviderPayload::Items(items) => items
                .iter()
                .filter_map(item_text)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ProviderPayload::Wrapped(map) => match map.get("insights") {
                Some(field) => normalize_text(&field_text(field)),
                None => Vec::new(),
            },
            ProviderPayload::Other(_) => Vec::new(),
        }
    }
}

impl From<Value> for ProviderPayload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Split free text into insight lines
pub fn normalize_text(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|line| strip_list_marker(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Remove a single leading `-`, `•` or `N.` marker and the spacing around it
///
/// A marker directly followed by a digit is part of a figure, so
/// `2.5% fees` and `-5% fees` are left alone.
pub fn strip_list_marker(line: &str) -> &str {
    let Some(m) = list_marker_re().find(line) else {
        return line;
    };
    let rest = &line[m.end()..];
    if rest.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return line;
    }
    rest.trim_start()
}

/// Escape HTML and render `**x**` as `<strong>x</strong>`
pub fn emphasis_to_html(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    emphasis_re()
        .replace_all(&escaped, "<strong>$1</strong>")
        .into_owned()
}

fn list_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-•]|\d+\.)").expect("valid regex"))
}

fn emphasis_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"))
}

/// List element as text; nulls are skipped
fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Textual form of a wrapped `insights` field
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(item_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(answer: &str) -> Vec<String> {
        ProviderPayload::Text(answer.to_string()).normalize()
    }

    #[test]
    fn test_strips_one_marker_layer() {
        assert_eq!(text("- Save more"), vec!["Save more"]);
        assert_eq!(text("2. Cut subscriptions"), vec!["Cut subscriptions"]);
        assert_eq!(text("• Track spending"), vec!["Track spending"]);
        assert_eq!(text("  10.   Plan meals  "), vec!["Plan meals"]);
        assert_eq!(text("- - nested"), vec!["- nested"]);
        assert_eq!(text("1.Cook at home"), vec!["Cook at home"]);
        assert_eq!(text("10.Plan"), vec!["Plan"]);
        assert_eq!(text("2.**Cancel** subs"), vec!["**Cancel** subs"]);
    }

    #[test]
    fn test_numbers_that_are_not_markers_survive() {
        assert_eq!(text("2.5% cashback on groceries"), vec!["2.5% cashback on groceries"]);
        assert_eq!(text("3 subscriptions overlap"), vec!["3 subscriptions overlap"]);
        assert_eq!(text("-5% fees"), vec!["-5% fees"]);
        assert_eq!(text("  -20 dollars a week"), vec!["-20 dollars a week"]);
    }

    #[test]
    fn test_line_endings_and_blank_lines() {
        assert_eq!(
            text("1. Cook at home\r\n\r\n2. Cancel unused subscriptions\r3. Walk"),
            vec!["Cook at home", "Cancel unused subscriptions", "Walk"]
        );
        assert!(text("").is_empty());
        assert!(text("\n  \n-\n").is_empty());
    }

    #[test]
    fn test_idempotent_on_marker_free_lines() {
        let once = text("1. **Cook at home** more\n- Review bills\nSet a budget");
        let twice = text(&once.join("\n"));
        assert_eq!(once, twice);
        assert_eq!(once[0], "**Cook at home** more");
    }

    #[test]
    fn test_items_pass_through() {
        let payload = ProviderPayload::from(json!(["X", "Y"]));
        assert_eq!(payload.normalize(), vec!["X", "Y"]);
    }

    #[test]
    fn test_items_convert_scalars_and_drop_empties() {
        let payload = ProviderPayload::from(json!(["  A ", null, "", 42, true, "- kept"]));
        assert_eq!(payload.normalize(), vec!["A", "42", "true", "- kept"]);
    }

    #[test]
    fn test_wrapped_string() {
        let payload = ProviderPayload::from(json!({"insights": "A\nB\n\nC"}));
        assert_eq!(payload.normalize(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_wrapped_list_and_other_fields() {
        let payload = ProviderPayload::from(json!({"insights": ["1. A", "- B"]}));
        assert_eq!(payload.normalize(), vec!["A", "B"]);

        assert!(ProviderPayload::from(json!({"insights": null})).normalize().is_empty());
        assert!(ProviderPayload::from(json!({"summary": "x"})).normalize().is_empty());
        assert_eq!(ProviderPayload::from(json!({"insights": 7})).normalize(), vec!["7"]);
    }

    #[test]
    fn test_other_shapes_are_empty() {
        assert!(ProviderPayload::from(json!(12)).normalize().is_empty());
        assert!(ProviderPayload::from(json!(false)).normalize().is_empty());
        assert!(ProviderPayload::from(Value::Null).normalize().is_empty());
    }

    #[test]
    fn test_from_answer_classification() {
        assert_eq!(
            ProviderPayload::from_answer("- plain"),
            ProviderPayload::Text("- plain".into())
        );
        assert!(matches!(
            ProviderPayload::from_answer(" [\"a\", \"b\"]"),
            ProviderPayload::Items(_)
        ));
        assert!(matches!(
            ProviderPayload::from_answer("{\"insights\": \"a\"}"),
            ProviderPayload::Wrapped(_)
        ));
        // Bracketed prose that is not JSON stays text
        assert_eq!(
            ProviderPayload::from_answer("[Tip] Save more").normalize(),
            vec!["[Tip] Save more"]
        );
    }

    #[test]
    fn test_emphasis_to_html() {
        assert_eq!(
            emphasis_to_html("**Cook at home** & save"),
            "<strong>Cook at home</strong> &amp; save"
        );
        assert_eq!(emphasis_to_html("<b>x</b>"), "&lt;b&gt;x&lt;/b&gt;");
        assert_eq!(emphasis_to_html("a ** b"), "a ** b");
    }
}
