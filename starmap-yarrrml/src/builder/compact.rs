//! Array and suffix shortcuts
//!
//! `[access~format, iterator]` sources, `[access~type, serialization,
//! compression]` targets and `[predicates, objects, modifier]` entries are
//! split here into their textual parts. Turning the parts into model types
//! is left to the callers.

use serde_json::Value as JsonValue;

use super::section::{one_or_many, scalar_text};
use crate::error::{MappingError, MappingResult};
use crate::mapping::{SourceFormat, SourceRef, TargetRef};
use crate::vocab::YARRRML;

/// Split `access~tag` at the last `~`.
pub(crate) fn split_tag(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once('~') {
        Some((access, tag)) if !access.is_empty() && !tag.is_empty() => (access, Some(tag)),
        _ => (text, None),
    }
}

/// Whether a string is an inline `access~format` shortcut rather than a name
pub(crate) fn is_inline(text: &str) -> bool {
    split_tag(text).1.is_some()
}

/// Whether an array is one `[access~format, iterator]` shortcut rather than
/// a list of sources
pub(crate) fn is_source_shortcut(items: &[JsonValue]) -> bool {
    match items {
        [JsonValue::String(first)] => is_inline(first),
        [JsonValue::String(first), JsonValue::String(second)] => {
            is_inline(first) && !is_inline(second)
        }
        _ => false,
    }
}

/// `access~format` or `[access~format, iterator]`
pub(crate) fn source_shortcut(owner: &str, value: &JsonValue) -> MappingResult<SourceRef> {
    let items = one_or_many(value);
    if items.len() > 2 {
        return Err(MappingError::validation(
            owner,
            "source shortcut takes at most an access path and an iterator",
        ));
    }
    let access = items
        .first()
        .and_then(|v| v.as_str())
        .ok_or_else(|| MappingError::validation(owner, "source shortcut needs an access path"))?;

    let (path, tag) = split_tag(access);
    let format = tag.map_or_else(|| SourceFormat::infer(path), SourceFormat::from_tag);
    let mut source = SourceRef::new(path, format);

    if let Some(iterator) = items.get(1) {
        let iterator = scalar_text(iterator)
            .ok_or_else(|| MappingError::validation(owner, "source iterator must be a string"))?;
        source = source.with_iterator(iterator);
    }
    Ok(source)
}

/// `access~type` or `[access~type, serialization, compression]`
pub(crate) fn target_shortcut(owner: &str, value: &JsonValue) -> MappingResult<TargetRef> {
    let items = one_or_many(value);
    if items.is_empty() || items.len() > 3 {
        return Err(MappingError::validation(
            owner,
            "target shortcut takes an access path, a serialization and a compression",
        ));
    }
    let parts = items
        .iter()
        .map(|v| {
            scalar_text(v).ok_or_else(|| {
                MappingError::validation(owner, "target shortcut parts must be strings")
            })
        })
        .collect::<MappingResult<Vec<_>>>()?;

    let (access, target_type) = split_tag(&parts[0]);
    let mut target = TargetRef::new(access);
    target.target_type = target_type.map(str::to_string);
    target.serialization = parts.get(1).cloned();
    target.compression = parts.get(2).cloned();
    Ok(target)
}

/// Trailing modifier of a compact entry or object item
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Modifier {
    /// `tag~lang`
    Language(String),
    /// Bare `iri`
    Iri,
    /// Anything else names a datatype
    Datatype(String),
}

impl Modifier {
    pub(crate) fn parse(owner: &str, text: &str) -> MappingResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MappingError::validation(owner, "empty datatype or language modifier"));
        }
        if let Some(tag) = text.strip_suffix(YARRRML::LANG_SUFFIX) {
            if tag.is_empty() {
                return Err(MappingError::validation(owner, "'~lang' needs a language tag"));
            }
            return Ok(Modifier::Language(tag.to_string()));
        }
        if text.starts_with('~') {
            return Err(MappingError::validation(
                owner,
                format!("modifier '{}' is neither a datatype nor '<tag>~lang'", text),
            ));
        }
        if text.eq_ignore_ascii_case("iri") {
            return Ok(Modifier::Iri);
        }
        Ok(Modifier::Datatype(text.to_string()))
    }
}

/// Object text with its `~iri` suffix split off
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObjectText {
    pub(crate) value: String,
    pub(crate) iri: bool,
}

impl ObjectText {
    pub(crate) fn parse(owner: &str, text: &str) -> MappingResult<Self> {
        if let Some(value) = text.strip_suffix(YARRRML::IRI_SUFFIX) {
            return Ok(Self {
                value: value.to_string(),
                iri: true,
            });
        }
        if text.ends_with(YARRRML::LANG_SUFFIX) {
            return Err(MappingError::validation(
                owner,
                format!("'{}': '~lang' belongs on the modifier, not the object", text),
            ));
        }
        Ok(Self {
            value: text.to_string(),
            iri: false,
        })
    }
}

/// One object of a compact entry with its own modifier, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompactObject {
    pub(crate) text: ObjectText,
    pub(crate) modifier: Option<Modifier>,
}

impl CompactObject {
    /// `value` or `[value, modifier]`
    pub(crate) fn parse(owner: &str, item: &JsonValue) -> MappingResult<Self> {
        match item {
            JsonValue::Array(pair) => match pair.as_slice() {
                [value, modifier] => {
                    let value = scalar_text(value)
                        .ok_or_else(|| MappingError::validation(owner, "object must be a string"))?;
                    let modifier = modifier.as_str().ok_or_else(|| {
                        MappingError::validation(owner, "modifier must be a string")
                    })?;
                    Ok(CompactObject {
                        text: ObjectText::parse(owner, &value)?,
                        modifier: Some(Modifier::parse(owner, modifier)?),
                    })
                }
                _ => Err(MappingError::validation(
                    owner,
                    "an object list item must be a value or a [value, modifier] pair",
                )),
            },
            other => {
                let value = scalar_text(other)
                    .ok_or_else(|| MappingError::validation(owner, "object must be a string"))?;
                Ok(CompactObject {
                    text: ObjectText::parse(owner, &value)?,
                    modifier: None,
                })
            }
        }
    }
}

/// A `[predicates, objects, modifier?]` entry split into parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompactEntry {
    pub(crate) predicates: Vec<String>,
    pub(crate) objects: Vec<CompactObject>,
}

impl CompactEntry {
    /// Parse the array form. The entry-level modifier applies to every
    /// object that has none of its own; an object with both is rejected.
    pub(crate) fn parse(owner: &str, items: &[JsonValue]) -> MappingResult<Self> {
        if items.len() < 2 || items.len() > 3 {
            return Err(MappingError::validation(
                owner,
                format!(
                    "predicate-object shortcut needs 2 or 3 positions, found {}",
                    items.len()
                ),
            ));
        }

        let predicates = one_or_many(&items[0])
            .into_iter()
            .map(|p| {
                scalar_text(p)
                    .ok_or_else(|| MappingError::validation(owner, "predicates must be strings"))
            })
            .collect::<MappingResult<Vec<_>>>()?;

        let shared = items
            .get(2)
            .map(|m| {
                m.as_str()
                    .ok_or_else(|| MappingError::validation(owner, "modifier must be a string"))
                    .and_then(|m| Modifier::parse(owner, m))
            })
            .transpose()?;

        let mut objects = Vec::new();
        for item in one_or_many(&items[1]) {
            let mut object = CompactObject::parse(owner, item)?;
            if let Some(shared) = &shared {
                if object.modifier.is_some() {
                    return Err(MappingError::validation(
                        owner,
                        format!(
                            "object '{}' has its own modifier and the entry has another",
                            object.text.value
                        ),
                    ));
                }
                object.modifier = Some(shared.clone());
            }
            objects.push(object);
        }

        if predicates.is_empty() || objects.is_empty() {
            return Err(MappingError::validation(
                owner,
                "predicate-object shortcut has no predicate or no object",
            ));
        }
        Ok(Self {
            predicates,
            objects,
        })
    }
}
