//! TriplesMap and subject specification

use serde::{Deserialize, Serialize};

use super::{
    ObjectSpec, PredicateObjectSpec, QuotedRef, SourceRef, TargetRef, Template, UnevaluatedExpr,
};

/// Subjects of a mapping
///
/// Either one or more IRI templates, or a single quoted reference for an
/// annotation mapping. Never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectSpec {
    /// Each template is an independent identifier for the same row
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<Template>,
    pub quoted: Option<QuotedRef>,
    /// Overrides mapping-level graphs when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graphs: Vec<Template>,
    /// Subject functions other than `join`, carried unevaluated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<UnevaluatedExpr>,
}

impl SubjectSpec {
    pub fn templates(templates: Vec<Template>) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }

    pub fn quoted(quoted: QuotedRef) -> Self {
        Self {
            quoted: Some(quoted),
            ..Default::default()
        }
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted.is_some()
    }
}

/// One named unit of generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriplesMap {
    pub name: String,
    pub sources: Vec<SourceRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetRef>,
    pub subject: SubjectSpec,
    pub predicate_objects: Vec<PredicateObjectSpec>,
    /// Mapping-level default graphs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graphs: Vec<Template>,
    pub condition: Option<UnevaluatedExpr>,
}

impl TriplesMap {
    pub fn new(name: impl Into<String>, sources: Vec<SourceRef>, subject: SubjectSpec) -> Self {
        Self {
            name: name.into(),
            sources,
            targets: Vec::new(),
            subject,
            predicate_objects: Vec::new(),
            graphs: Vec::new(),
            condition: None,
        }
    }

    /// Whether the subjects are triples quoted from another mapping
    pub fn is_annotation(&self) -> bool {
        self.subject.is_quoted()
    }

    /// Every quoted reference, in subject position first
    pub fn quoted_refs(&self) -> impl Iterator<Item = &QuotedRef> + '_ {
        self.subject.quoted.iter().chain(
            self.predicate_objects
                .iter()
                .filter_map(|po| match &po.object {
                    ObjectSpec::Quoted(q) => Some(q),
                    _ => None,
                }),
        )
    }

    /// Names of every mapping this one refers to (quoted or interlinked)
    pub fn referenced_mappings(&self) -> impl Iterator<Item = &str> + '_ {
        self.subject.quoted.iter().map(|q| q.mapping.as_str()).chain(
            self.predicate_objects
                .iter()
                .filter_map(|po| po.object.referenced_mapping()),
        )
    }

    /// Whether the mapping reads rows from a source with this key
    pub fn reads_source(&self, key: &str) -> bool {
        self.sources.iter().any(|s| s.key() == key)
    }

    /// Whether both mappings iterate the very same rows
    pub fn shares_sources_with(&self, other: &TriplesMap) -> bool {
        self.sources.len() == other.sources.len()
            && self
                .sources
                .iter()
                .zip(&other.sources)
                .all(|(a, b)| a.same_rows(b))
    }
}
