//! Unevaluated function and condition payloads
//!
//! The engine does not execute functions. They are kept as structured data
//! with canonical keys so a later evaluation stage can consume them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::vocab::YARRRML;

/// What a payload was declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExprKind {
    Function,
    Condition,
}

/// A function or condition carried verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnevaluatedExpr {
    pub kind: ExprKind,
    /// Canonical-key payload, e.g.
    /// `{"function": "ex:toLowerCase", "parameters": [{"parameter": "ex:input", "value": "$(name)"}]}`
    pub payload: JsonValue,
}

impl UnevaluatedExpr {
    pub fn new(kind: ExprKind, payload: JsonValue) -> Self {
        Self { kind, payload }
    }

    /// Function IRI or name, when the payload names one.
    pub fn function_name(&self) -> Option<&str> {
        self.payload
            .get(YARRRML::FUNCTION[0])
            .and_then(JsonValue::as_str)
    }

    /// Payload for an inline call such as `ex:toLowerCase(ex:input = $(name))`.
    pub fn from_inline(kind: ExprKind, call: &InlineCall) -> Self {
        Self::new(kind, call.to_payload())
    }
}

/// A parsed `name(key = value, ...)` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCall {
    pub name: String,
    /// `(key, value)` pairs; positional arguments have no key
    pub args: Vec<(Option<String>, String)>,
}

impl InlineCall {
    /// Parse an inline call. Returns `None` if the text is not of the form
    /// `name(...)` with balanced parentheses.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let open = text.find('(')?;
        let name = text[..open].trim();
        if name.is_empty() || !text.ends_with(')') {
            return None;
        }
        let inner = &text[open + 1..text.len() - 1];

        let mut args = Vec::new();
        for raw in split_top_level(inner, ',')? {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match find_top_level(raw, '=') {
                Some(eq) => args.push((
                    Some(raw[..eq].trim().to_string()),
                    raw[eq + 1..].trim().to_string(),
                )),
                None => args.push((None, raw.to_string())),
            }
        }

        Some(Self {
            name: name.to_string(),
            args,
        })
    }

    /// Value of the argument named `key`
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v.as_str())
    }

    /// Positional arguments in order
    pub fn positional(&self) -> impl Iterator<Item = &str> + '_ {
        self.args
            .iter()
            .filter(|(k, _)| k.is_none())
            .map(|(_, v)| v.as_str())
    }

    fn to_payload(&self) -> JsonValue {
        let parameters = self
            .args
            .iter()
            .map(|(key, value)| {
                let mut p = Map::new();
                if let Some(key) = key {
                    p.insert(YARRRML::PARAMETER[0].into(), JsonValue::String(key.clone()));
                }
                p.insert(YARRRML::VALUE[0].into(), JsonValue::String(value.clone()));
                JsonValue::Object(p)
            })
            .collect();

        let mut payload = Map::new();
        payload.insert(
            YARRRML::FUNCTION[0].into(),
            JsonValue::String(self.name.clone()),
        );
        payload.insert(YARRRML::PARAMETERS[0].into(), JsonValue::Array(parameters));
        JsonValue::Object(payload)
    }
}

/// Split on `sep` outside parentheses. `None` on unbalanced input.
fn split_top_level(text: &str, sep: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&text[start..]);
    Some(parts)
}

fn find_top_level(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Rewrite shortcut keys (`fn`, `pms`, `pm`, `v`, ...) to their canonical
/// spelling, recursively. Values are left untouched.
pub fn canonicalize_keys(value: &JsonValue) -> Result<JsonValue, String> {
    const GROUPS: &[&[&str]] = &[
        YARRRML::FUNCTION,
        YARRRML::PARAMETERS,
        YARRRML::PARAMETER,
        YARRRML::VALUE,
    ];

    match value {
        JsonValue::Object(obj) => {
            let mut out = Map::new();
            for (key, v) in obj {
                let canonical = GROUPS
                    .iter()
                    .find(|g| g.contains(&key.as_str()))
                    .map(|g| g[0])
                    .unwrap_or(key.as_str());
                if out.contains_key(canonical) {
                    return Err(format!("'{}' is given more than once (as '{}')", canonical, key));
                }
                out.insert(canonical.to_string(), canonicalize_keys(v)?);
            }
            Ok(JsonValue::Object(out))
        }
        JsonValue::Array(items) => items
            .iter()
            .map(canonicalize_keys)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        other => Ok(other.clone()),
    }
}
