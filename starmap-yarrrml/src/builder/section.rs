//! Alias-aware access to one object of the mapping document

use serde_json::{Map, Value as JsonValue};

use crate::error::{MappingError, MappingResult};

/// A JSON object read through alias groups
///
/// Every lookup names the full alias group of a concept (canonical key
/// first). Giving two spellings of one concept in the same object is an
/// error rather than a silent pick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Section<'a> {
    /// Mapping name (or document part) used in error messages
    owner: &'a str,
    object: &'a Map<String, JsonValue>,
}

impl<'a> Section<'a> {
    pub(crate) fn new(owner: &'a str, object: &'a Map<String, JsonValue>) -> Self {
        Self { owner, object }
    }

    /// View a value as a section, failing when it is not an object.
    pub(crate) fn of(owner: &'a str, value: &'a JsonValue, what: &str) -> MappingResult<Self> {
        value
            .as_object()
            .map(|object| Self::new(owner, object))
            .ok_or_else(|| MappingError::validation(owner, format!("{} must be an object", what)))
    }

    pub(crate) fn owner(&self) -> &'a str {
        self.owner
    }

    /// Value under any alias of the group.
    pub(crate) fn get(&self, aliases: &[&str]) -> MappingResult<Option<&'a JsonValue>> {
        let mut found: Option<(&str, &'a JsonValue)> = None;
        for &alias in aliases {
            if let Some(value) = self.object.get(alias) {
                if let Some((first, _)) = found {
                    return Err(MappingError::validation(
                        self.owner,
                        format!("ambiguous keys '{}' and '{}' name the same field", first, alias),
                    ));
                }
                found = Some((alias, value));
            }
        }
        Ok(found.map(|(_, v)| v))
    }

    pub(crate) fn has(&self, aliases: &[&str]) -> MappingResult<bool> {
        Ok(self.get(aliases)?.is_some())
    }

    /// String value under the group. Numbers and booleans are taken as
    /// their text.
    pub(crate) fn get_str(&self, aliases: &[&str]) -> MappingResult<Option<String>> {
        match self.get(aliases)? {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => scalar_text(value).map(Some).ok_or_else(|| {
                MappingError::validation(
                    self.owner,
                    format!("'{}' must be a string", aliases[0]),
                )
            }),
        }
    }

    /// Canonical key of the one group present, if any. Fields that exclude
    /// each other must not appear together.
    pub(crate) fn exclusive(
        &self,
        groups: &[&'static [&'static str]],
    ) -> MappingResult<Option<&'static str>> {
        let mut present: Option<&'static str> = None;
        for group in groups {
            if self.has(group)? {
                if let Some(first) = present {
                    return Err(MappingError::validation(
                        self.owner,
                        format!("'{}' and '{}' cannot be combined", first, group[0]),
                    ));
                }
                present = Some(group[0]);
            }
        }
        Ok(present)
    }

    /// Keys of the object that belong to none of the given groups
    pub(crate) fn other_keys<'k>(
        &self,
        groups: &'k [&'k [&'k str]],
    ) -> impl Iterator<Item = (&'a String, &'a JsonValue)> + 'k
    where
        'a: 'k,
    {
        self.object
            .iter()
            .filter(move |(k, _)| !groups.iter().any(|g| g.contains(&k.as_str())))
    }
}

/// Text of a scalar value
pub(crate) fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A value or a list of values, as a list
pub(crate) fn one_or_many(value: &JsonValue) -> Vec<&JsonValue> {
    match value {
        JsonValue::Array(items) => items.iter().collect(),
        JsonValue::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::YARRRML;
    use serde_json::json;

    #[test]
    fn test_alias_lookup() {
        let doc = json!({"s": "ex:$(id)", "po": []});
        let section = Section::of("person", &doc, "mapping").unwrap();
        assert_eq!(
            section.get_str(YARRRML::SUBJECTS).unwrap().as_deref(),
            Some("ex:$(id)")
        );
        assert!(section.has(YARRRML::PREDICATE_OBJECTS).unwrap());
        assert!(!section.has(YARRRML::GRAPHS).unwrap());
    }

    #[test]
    fn test_alias_conflict() {
        let doc = json!({"subjects": "ex:a", "s": "ex:b"});
        let section = Section::of("person", &doc, "mapping").unwrap();
        let err = section.get(YARRRML::SUBJECTS).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'subjects' and 's'"));
    }

    #[test]
    fn test_scalars_and_lists() {
        let doc = json!({"value": 42});
        let section = Section::of("m", &doc, "object").unwrap();
        assert_eq!(
            section.get_str(YARRRML::VALUE).unwrap().as_deref(),
            Some("42")
        );

        assert_eq!(one_or_many(&json!(["a", "b"])).len(), 2);
        assert_eq!(one_or_many(&json!("a")).len(), 1);
        assert!(one_or_many(&JsonValue::Null).is_empty());
        assert!(Section::of("m", &json!([1]), "object").is_err());
    }

    #[test]
    fn test_exclusive_fields() {
        let doc = json!({"mapping": "person", "v": "ex:$(id)"});
        let section = Section::of("m", &doc, "object").unwrap();
        let err = section
            .exclusive(&[YARRRML::VALUE, YARRRML::MAPPING, YARRRML::QUOTED])
            .unwrap_err();
        assert!(err.to_string().contains("'value' and 'mapping' cannot be combined"));

        let doc = json!({"quoted": "person"});
        let section = Section::of("m", &doc, "object").unwrap();
        assert_eq!(
            section
                .exclusive(&[YARRRML::VALUE, YARRRML::QUOTED])
                .unwrap(),
            Some("quoted")
        );
    }
}
