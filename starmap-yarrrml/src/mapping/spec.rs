//! Normalized mapping specification with lookup indexes

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Author, ExecutionPlan, SourceRef, TargetRef, TriplesMap};
use crate::error::MappingResult;

/// A whole mapping document after normalization
///
/// Built once by [`crate::builder::MappingBuilder`] and immutable
/// afterwards. Triples maps keep document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSpecification {
    maps: Vec<TriplesMap>,

    /// Prefix → namespace IRI
    pub prefixes: BTreeMap<String, String>,

    /// Root-level named sources
    pub sources: BTreeMap<String, SourceRef>,

    /// Root-level named targets
    pub targets: BTreeMap<String, TargetRef>,

    pub base: Option<String>,

    pub authors: Vec<Author>,

    /// External constants, already substituted into every template
    pub external: BTreeMap<String, String>,

    /// Index: map name → position in `maps`
    index: HashMap<String, usize>,

    /// Index: source key → names of maps reading it
    source_to_maps: HashMap<String, Vec<String>>,

    plan: ExecutionPlan,
}

impl MappingSpecification {
    /// Assemble a specification and compute its execution plan.
    ///
    /// Fails when quoted references are unknown or form a cycle.
    pub fn new(
        maps: Vec<TriplesMap>,
        prefixes: BTreeMap<String, String>,
        sources: BTreeMap<String, SourceRef>,
        targets: BTreeMap<String, TargetRef>,
    ) -> MappingResult<Self> {
        let plan = ExecutionPlan::build(&maps)?;
        let mut spec = Self {
            maps,
            prefixes,
            sources,
            targets,
            plan,
            ..Default::default()
        };
        spec.reindex();
        Ok(spec)
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_external(mut self, external: BTreeMap<String, String>) -> Self {
        self.external = external;
        self
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.source_to_maps.clear();
        for (i, tm) in self.maps.iter().enumerate() {
            self.index.insert(tm.name.clone(), i);
            for source in &tm.sources {
                let names = self
                    .source_to_maps
                    .entry(source.key().to_string())
                    .or_default();
                if !names.contains(&tm.name) {
                    names.push(tm.name.clone());
                }
            }
        }
    }

    /// Get a TriplesMap by name
    pub fn get(&self, name: &str) -> Option<&TriplesMap> {
        self.index.get(name).map(|&i| &self.maps[i])
    }

    /// All TriplesMaps in document order
    pub fn iter(&self) -> impl Iterator<Item = &TriplesMap> + '_ {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Maps that quote or interlink the given map
    pub fn find_maps_referencing(&self, name: &str) -> Vec<&TriplesMap> {
        self.maps
            .iter()
            .filter(|tm| tm.referenced_mappings().any(|r| r == name))
            .collect()
    }

    /// Maps that read rows from the source with this key
    pub fn find_maps_for_source(&self, key: &str) -> Vec<&TriplesMap> {
        self.source_to_maps
            .get(key)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// Names of maps quoted only as non-asserted triples
    ///
    /// A map counts when at least one reference marks it non-asserted. The
    /// engine still runs such maps; a downstream writer decides what to do
    /// with their plain quads.
    pub fn non_asserted_maps(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .maps
            .iter()
            .flat_map(|tm| tm.quoted_refs())
            .filter(|q| !q.asserted)
            .map(|q| q.mapping.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
