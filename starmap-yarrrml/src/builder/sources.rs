//! Source and target descriptors, root-level and per mapping

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use super::compact::{is_inline, is_source_shortcut, source_shortcut, split_tag, target_shortcut};
use super::section::{one_or_many, scalar_text, Section};
use crate::error::{MappingError, MappingResult};
use crate::mapping::{SourceFormat, SourceRef, TargetRef};
use crate::vocab::YARRRML;

/// A source descriptor in any form: long-form object, `[access~format,
/// iterator]` array or `access~format` string.
pub(crate) fn source_descriptor(owner: &str, value: &JsonValue) -> MappingResult<SourceRef> {
    match value {
        JsonValue::Object(_) => long_source(Section::of(owner, value, "source")?),
        JsonValue::Array(_) | JsonValue::String(_) => source_shortcut(owner, value),
        _ => Err(MappingError::validation(owner, "source must be an object, a list or a string")),
    }
}

fn long_source(section: Section<'_>) -> MappingResult<SourceRef> {
    const KNOWN: &[&[&str]] = &[
        YARRRML::ACCESS,
        YARRRML::REFERENCE_FORMULATION,
        YARRRML::ITERATOR,
        YARRRML::QUERY,
        YARRRML::DELIMITER,
    ];

    let owner = section.owner();
    let written = section
        .get_str(YARRRML::ACCESS)?
        .ok_or_else(|| MappingError::validation(owner, "source has no 'access'"))?;
    let (access, tag) = split_tag(&written);
    let format = match section.get_str(YARRRML::REFERENCE_FORMULATION)? {
        Some(formulation) => SourceFormat::from_tag(&formulation),
        None => tag.map_or_else(|| SourceFormat::infer(access), SourceFormat::from_tag),
    };

    let mut source = SourceRef::new(access, format);
    source.iterator = section.get_str(YARRRML::ITERATOR)?;
    source.query = section.get_str(YARRRML::QUERY)?;
    source.delimiter = section.get_str(YARRRML::DELIMITER)?;
    for (key, value) in section.other_keys(KNOWN) {
        if let Some(text) = scalar_text(value) {
            source.options.insert(key.clone(), text);
        }
    }
    Ok(source)
}

/// A target descriptor: long-form object, shortcut array or string.
pub(crate) fn target_descriptor(owner: &str, value: &JsonValue) -> MappingResult<TargetRef> {
    match value {
        JsonValue::Object(_) => {
            let section = Section::of(owner, value, "target")?;
            let written = section
                .get_str(YARRRML::ACCESS)?
                .ok_or_else(|| MappingError::validation(owner, "target has no 'access'"))?;
            let (access, tag) = split_tag(&written);
            let mut target = TargetRef::new(access);
            target.target_type = section
                .get_str(YARRRML::TYPE)?
                .or_else(|| tag.map(str::to_string));
            target.serialization = section.get_str(YARRRML::SERIALIZATION)?;
            target.compression = section.get_str(YARRRML::COMPRESSION)?;
            Ok(target)
        }
        JsonValue::Array(_) | JsonValue::String(_) => target_shortcut(owner, value),
        _ => Err(MappingError::validation(owner, "target must be an object, a list or a string")),
    }
}

/// Sources of one mapping. Strings name a root-level source unless they
/// carry a `~format` tag.
pub(crate) fn mapping_sources(
    owner: &str,
    value: &JsonValue,
    named: &BTreeMap<String, SourceRef>,
) -> MappingResult<Vec<SourceRef>> {
    let items: Vec<&JsonValue> = match value {
        JsonValue::Array(items) if is_source_shortcut(items) => vec![value],
        other => one_or_many(other),
    };

    let sources = items
        .into_iter()
        .map(|item| match item {
            JsonValue::String(text) => match named.get(text) {
                Some(source) => Ok(source.clone()),
                None if is_inline(text) => source_shortcut(owner, item),
                None => Err(MappingError::UnknownSource {
                    mapping: owner.to_string(),
                    source_name: text.clone(),
                }),
            },
            other => source_descriptor(owner, other),
        })
        .collect::<MappingResult<Vec<_>>>()?;

    if sources.is_empty() {
        return Err(MappingError::validation(owner, "no source"));
    }
    Ok(sources)
}

/// Targets of one mapping, by name or inline
pub(crate) fn mapping_targets(
    owner: &str,
    value: &JsonValue,
    named: &BTreeMap<String, TargetRef>,
) -> MappingResult<Vec<TargetRef>> {
    let inline_shortcut = match value {
        JsonValue::Array(items) => match items.split_first() {
            Some((JsonValue::String(first), rest)) if !rest.is_empty() => {
                is_inline(first) && !rest.iter().any(|v| v.as_str().map_or(true, is_inline))
            }
            _ => false,
        },
        _ => false,
    };
    if inline_shortcut {
        return Ok(vec![target_shortcut(owner, value)?]);
    }

    one_or_many(value)
        .into_iter()
        .map(|item| match item {
            JsonValue::String(text) => match named.get(text) {
                Some(target) => Ok(target.clone()),
                None if is_inline(text) => target_shortcut(owner, item),
                None => Err(MappingError::UnknownTarget {
                    mapping: owner.to_string(),
                    target_name: text.clone(),
                }),
            },
            other => target_descriptor(owner, other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named_sources() -> BTreeMap<String, SourceRef> {
        let mut named = BTreeMap::new();
        named.insert(
            "people".to_string(),
            SourceRef::new("people.csv", SourceFormat::Csv).with_name("people"),
        );
        named
    }

    #[test]
    fn test_long_source() {
        let source = source_descriptor(
            "people",
            &json!({
                "access": "data/people.json",
                "referenceFormulation": "jsonpath",
                "iterator": "$.people[*]",
                "encoding": "utf-8"
            }),
        )
        .unwrap();
        assert_eq!(source.format, SourceFormat::JsonPath);
        assert_eq!(source.iterator.as_deref(), Some("$.people[*]"));
        assert_eq!(
            source.options.get("encoding").map(String::as_str),
            Some("utf-8")
        );

        let orders = json!({
            "access": "http://localhost/db",
            "referenceFormulation": "mysql",
            "query": "SELECT * FROM orders"
        });
        let db = source_descriptor("orders", &orders).unwrap();
        assert_eq!(db.format, SourceFormat::Sql("mysql".into()));
        assert!(db.query.is_some());
    }

    #[test]
    fn test_mapping_sources() {
        let named = named_sources();

        let by_name = mapping_sources("m", &json!("people"), &named).unwrap();
        assert_eq!(by_name[0].name.as_deref(), Some("people"));

        let shortcut =
            mapping_sources("m", &json!(["notes.json~jsonpath", "$[*]"]), &named).unwrap();
        assert_eq!(shortcut.len(), 1);
        assert_eq!(shortcut[0].iterator.as_deref(), Some("$[*]"));

        let several = mapping_sources("m", &json!(["people", ["notes.csv~csv"]]), &named).unwrap();
        assert_eq!(several.len(), 2);

        let err = mapping_sources("m", &json!("nobody"), &named).unwrap_err();
        assert!(matches!(
            err,
            MappingError::UnknownSource { ref source_name, .. } if source_name == "nobody"
        ));

        assert!(mapping_sources("m", &json!([]), &named).is_err());
    }

    #[test]
    fn test_mapping_targets() {
        let mut named = BTreeMap::new();
        named.insert("dump".to_string(), TargetRef::new("out/dump.nq"));

        assert_eq!(
            mapping_targets("m", &json!("dump"), &named).unwrap().len(),
            1
        );
        let inline = mapping_targets("m", &json!(["out/x.ttl~void", "turtle"]), &named).unwrap();
        assert_eq!(inline[0].serialization.as_deref(), Some("turtle"));

        let err = mapping_targets("m", &json!(["dump", "missing"]), &named).unwrap_err();
        assert!(matches!(
            err,
            MappingError::UnknownTarget { ref target_name, .. } if target_name == "missing"
        ));
    }
}
