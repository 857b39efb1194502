//! Mapping Model Builder
//!
//! Normalizes a decoded YARRRML-star document into a
//! [`MappingSpecification`]. Every shortcut spelling, compact array form and
//! inline function call is resolved here, so nothing downstream ever sees an
//! alias.
//!
//! The builder consumes a generic [`serde_json::Value`]. Decoding YAML (or
//! any other surface syntax) into that shape is the caller's concern.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use starmap_yarrrml::MappingBuilder;
//!
//! let spec = MappingBuilder::from_document(json!({
//!     "prefixes": {"ex": "http://example.org/"},
//!     "mappings": {
//!         "person": {
//!             "sources": ["people.csv~csv"],
//!             "s": "ex:person/$(id)",
//!             "po": [["a", "ex:Person"], ["ex:name", "$(name)"]]
//!         }
//!     }
//! }))
//! .build()
//! .unwrap();
//!
//! assert_eq!(spec.len(), 1);
//! assert_eq!(spec.get("person").unwrap().predicate_objects.len(), 2);
//! ```

mod compact;
mod section;
mod sources;
mod triples_map;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use starmap_vocab::namespaces;
use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::mapping::{Author, MappingSpecification, ObjectSpec, SourceRef, TargetRef, TriplesMap};
use crate::materialize::TermResolver;
use crate::vocab::YARRRML;
use section::{one_or_many, scalar_text, Section};
use sources::{source_descriptor, target_descriptor};
use triples_map::{parse_mapping, MapContext};

/// Owner name used in errors about document-level sections
const DOCUMENT: &str = "<document>";

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Declare `rdf`, `rdfs` and `xsd` when the document does not
    pub standard_prefixes: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            standard_prefixes: true,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standard_prefixes(mut self, enabled: bool) -> Self {
        self.standard_prefixes = enabled;
        self
    }
}

/// Builds a [`MappingSpecification`] from a decoded mapping document
#[derive(Debug, Clone)]
pub struct MappingBuilder {
    document: JsonValue,
    options: BuildOptions,
}

impl MappingBuilder {
    pub fn from_document(document: JsonValue) -> Self {
        Self {
            document,
            options: BuildOptions::default(),
        }
    }

    /// Decode a JSON text first.
    pub fn from_json_str(text: &str) -> MappingResult<Self> {
        let document =
            serde_json::from_str(text).map_err(|e| MappingError::Document(e.to_string()))?;
        Ok(Self::from_document(document))
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Normalize the document and validate every cross-mapping reference.
    ///
    /// Fails before anything is generated: unknown sources, targets or
    /// mappings, conflicting fields, quoting cycles and nested quoting are
    /// all reported here.
    pub fn build(&self) -> MappingResult<MappingSpecification> {
        let object = self.document.as_object().ok_or_else(|| {
            MappingError::Document("the top level must be a key-value mapping".to_string())
        })?;
        let root = Section::new(DOCUMENT, object);

        let mut prefixes = string_table(&root, YARRRML::PREFIXES, "prefix")?;
        if self.options.standard_prefixes {
            for (prefix, ns) in namespaces::STANDARD {
                prefixes
                    .entry((*prefix).to_string())
                    .or_insert_with(|| (*ns).to_string());
            }
        }
        let base = root.get_str(YARRRML::BASE)?;
        let external = string_table(&root, YARRRML::EXTERNAL, "external value")?;
        let authors = parse_authors(&root)?;

        let sources = named_table(&root, YARRRML::SOURCES, |name, value| {
            Ok(source_descriptor(name, value)?.with_name(name))
        })?;
        let targets = named_table(&root, YARRRML::TARGETS, |name, value| {
            let mut target = target_descriptor(name, value)?;
            target.name = Some(name.to_string());
            Ok(target)
        })?;

        let resolver = TermResolver::new(prefixes.clone()).with_base(base.clone());
        let ctx = MapContext {
            sources: &sources,
            targets: &targets,
            external: &external,
            resolver: &resolver,
        };

        let mappings = root
            .get(YARRRML::MAPPINGS)?
            .ok_or_else(|| MappingError::Document("no 'mappings' section".to_string()))?
            .as_object()
            .ok_or_else(|| {
                MappingError::Document("'mappings' must map names to mappings".to_string())
            })?;
        let maps = mappings
            .iter()
            .map(|(name, value)| parse_mapping(name, value, &ctx))
            .collect::<MappingResult<Vec<_>>>()?;

        check_interlinks_known(&maps)?;
        let spec = MappingSpecification::new(maps, prefixes, sources, targets)?
            .with_base(base)
            .with_authors(authors)
            .with_external(external);
        check_references(&spec)?;

        debug!(
            mappings = spec.len(),
            levels = spec.plan().levels().len(),
            sources = spec.sources.len(),
            "mapping specification built"
        );
        Ok(spec)
    }
}

/// A section of `name: string` pairs
fn string_table(
    root: &Section<'_>,
    aliases: &[&str],
    what: &str,
) -> MappingResult<BTreeMap<String, String>> {
    let Some(value) = root.get(aliases)? else {
        return Ok(BTreeMap::new());
    };
    let object = value.as_object().ok_or_else(|| {
        MappingError::Document(format!("'{}' must map names to values", aliases[0]))
    })?;
    object
        .iter()
        .map(|(name, v)| {
            scalar_text(v)
                .map(|text| (name.clone(), text))
                .ok_or_else(|| {
                    MappingError::Document(format!("{} '{}' must be a string", what, name))
                })
        })
        .collect()
}

/// A section of `name: descriptor` pairs
fn named_table<T>(
    root: &Section<'_>,
    aliases: &[&str],
    parse: impl Fn(&str, &JsonValue) -> MappingResult<T>,
) -> MappingResult<BTreeMap<String, T>> {
    let Some(value) = root.get(aliases)? else {
        return Ok(BTreeMap::new());
    };
    let object = value.as_object().ok_or_else(|| {
        MappingError::Document(format!("'{}' must map names to descriptors", aliases[0]))
    })?;
    object
        .iter()
        .map(|(name, v)| Ok((name.clone(), parse(name, v)?)))
        .collect()
}

fn parse_authors(root: &Section<'_>) -> MappingResult<Vec<Author>> {
    let Some(value) = root.get(YARRRML::AUTHORS)? else {
        return Ok(Vec::new());
    };

    one_or_many(value)
        .into_iter()
        .map(|item| match item {
            JsonValue::String(text) => Author::parse_shortcut(text).ok_or_else(|| {
                MappingError::validation(DOCUMENT, format!("unrecognized author '{}'", text))
            }),
            JsonValue::Object(_) => {
                let entry = Section::of(DOCUMENT, item, "author")?;
                let author = Author {
                    name: entry.get_str(YARRRML::NAME)?,
                    email: entry.get_str(YARRRML::EMAIL)?,
                    website: entry.get_str(YARRRML::WEBSITE)?,
                    webid: entry.get_str(YARRRML::WEBID)?,
                };
                if author.is_empty() {
                    return Err(MappingError::validation(DOCUMENT, "empty author entry"));
                }
                Ok(author)
            }
            _ => Err(MappingError::validation(DOCUMENT, "an author must be a string or an object")),
        })
        .collect()
}

/// `mapping:` objects name existing mappings. Quoted references are checked
/// by the execution plan.
fn check_interlinks_known(maps: &[TriplesMap]) -> MappingResult<()> {
    for map in maps {
        for po in &map.predicate_objects {
            if let ObjectSpec::Reference(reference) = &po.object {
                if !maps.iter().any(|m| m.name == reference.mapping) {
                    return Err(MappingError::UnknownTriplesMap {
                        mapping: map.name.clone(),
                        reference: reference.mapping.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Reference rules that need the referenced mapping at hand
fn check_references(spec: &MappingSpecification) -> MappingResult<()> {
    for map in spec.iter() {
        for quoted in map.quoted_refs() {
            let Some(base) = spec.get(&quoted.mapping) else {
                continue;
            };
            if base.is_annotation() {
                return Err(MappingError::validation(
                    &map.name,
                    format!(
                        "'{}' is itself an annotation mapping; quoted triples nest one level only",
                        base.name
                    ),
                ));
            }
            if quoted.condition.is_none() && !map.shares_sources_with(base) {
                return Err(MappingError::validation(
                    &map.name,
                    format!(
                        "quoting '{}' without a condition requires the same sources",
                        base.name
                    ),
                ));
            }
        }

        for po in &map.predicate_objects {
            let ObjectSpec::Reference(reference) = &po.object else {
                continue;
            };
            let Some(parent) = spec.get(&reference.mapping) else {
                continue;
            };
            if parent.is_annotation() {
                return Err(MappingError::validation(
                    &map.name,
                    format!(
                        "'{}' has quoted subjects and cannot be referenced with 'mapping'",
                        parent.name
                    ),
                ));
            }
            if reference.condition.is_none() && !map.shares_sources_with(parent) {
                return Err(MappingError::validation(
                    &map.name,
                    format!(
                        "referencing '{}' without a condition requires the same sources",
                        parent.name
                    ),
                ));
            }
        }
    }
    Ok(())
}
