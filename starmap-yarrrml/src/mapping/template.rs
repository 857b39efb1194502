//! `$(column)` templates
//!
//! Templates are parsed once when a mapping is built. Term resolution only
//! walks the pre-split segments.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};
use crate::vocab::YARRRML;

/// One piece of a template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Text copied as-is
    Literal(String),
    /// `$(name)` placeholder
    Column(String),
}

/// A parsed template string such as `ex:dataset/$(id)`
///
/// `\$(` in the source text produces a literal `$(`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    pub fn parse(source: &str) -> MappingResult<Self> {
        let invalid = |message: &str| MappingError::InvalidTemplate {
            template: source.to_string(),
            message: message.to_string(),
        };

        // escaped opener, placeholder, or an opener with no closing paren
        static PLACEHOLDER_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\\\$\(|\$\(([^)]*)\)|\$\(").expect("valid regex"));

        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for cap in PLACEHOLDER_RE.captures_iter(source) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            text.push_str(&source[last..whole.start()]);
            last = whole.end();

            if whole.as_str().starts_with('\\') {
                text.push_str("$(");
                continue;
            }
            let column = cap
                .get(1)
                .ok_or_else(|| invalid("unterminated placeholder"))?
                .as_str()
                .trim();
            if column.is_empty() {
                return Err(invalid("empty placeholder"));
            }
            if !text.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut text)));
            }
            segments.push(Segment::Column(column.to_string()));
        }
        text.push_str(&source[last..]);
        if !text.is_empty() {
            segments.push(Segment::Literal(text));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// A template with no placeholders.
    pub fn constant(value: impl Into<String>) -> Self {
        let value = value.into();
        let segments = if value.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Literal(value.clone())]
        };
        Self {
            source: value,
            segments,
        }
    }

    /// The text the template was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_constant(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// The constant value, if the template has no placeholders.
    pub fn as_constant(&self) -> Option<String> {
        if !self.is_constant() {
            return None;
        }
        Some(
            self.segments
                .iter()
                .map(|s| match s {
                    Segment::Literal(t) | Segment::Column(t) => t.as_str(),
                })
                .collect(),
        )
    }

    /// The column name when the template is exactly one placeholder.
    pub fn single_column(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Column(c)] => Some(c),
            _ => None,
        }
    }

    /// Referenced column names in order of appearance
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Column(c) => Some(c.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Replace `$(_name)` placeholders whose name is in `external` with the
    /// external value. Unknown names stay column references.
    pub fn with_externals(self, external: &BTreeMap<String, String>) -> Self {
        if external.is_empty() {
            return self;
        }
        let mut changed = false;
        let mut segments: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for seg in self.segments {
            let seg = match seg {
                Segment::Column(c) => match c
                    .strip_prefix(YARRRML::EXTERNAL_MARKER)
                    .and_then(|name| external.get(name))
                {
                    Some(value) => {
                        changed = true;
                        Segment::Literal(value.clone())
                    }
                    None => Segment::Column(c),
                },
                lit => lit,
            };
            match (segments.last_mut(), seg) {
                (Some(Segment::Literal(prev)), Segment::Literal(next)) => prev.push_str(&next),
                (_, seg) => segments.push(seg),
            }
        }
        Self {
            source: if changed {
                render_source(&segments)
            } else {
                self.source
            },
            segments,
        }
    }
}

fn render_source(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Literal(t) => out.push_str(&t.replace("$(", "\\$(")),
            Segment::Column(c) => {
                out.push_str("$(");
                out.push_str(c);
                out.push(')');
            }
        }
    }
    out
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Template {
    type Error = MappingError;

    fn try_from(value: String) -> MappingResult<Self> {
        Template::parse(&value)
    }
}

impl From<Template> for String {
    fn from(t: Template) -> Self {
        t.source
    }
}
