//! Quad generation engine
//!
//! Runs a [`MappingSpecification`] over already materialized source tables.
//!
//! # Flow
//!
//! 1. Every source of every map is resolved through the [`TableProvider`]
//!    and every template compiled. Failures here abort before any quad is
//!    produced.
//! 2. Join indexes are built once per (parent map, parent columns).
//! 3. Maps run level by level along the [`crate::mapping::ExecutionPlan`],
//!    so an annotation map always sees the complete output of the map it
//!    quotes. Maps of one level may run on the rayon pool.
//! 4. Output is concatenated in plan order. Row problems go to a
//!    [`DiagnosticSink`] and never stop the run.

mod diagnostics;
mod generate;
pub mod join;
mod metadata;
mod options;

pub use diagnostics::{DiagnosticKind, DiagnosticSink, Diagnostics, RowDiagnostic};
pub use options::{DatasetMetadata, GenerationOptions, DEFAULT_MAX_RECORDED_DIAGNOSTICS};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use starmap_graph_ir::Quad;
use starmap_tabular::SourceTable;
use tracing::{debug, debug_span, info};

use crate::error::{MappingError, MappingResult};
use crate::mapping::{MappingSpecification, SourceRef};
use crate::materialize::TermResolver;
use generate::{CompiledMap, JoinContext, MapOutput};
use join::{IndexKey, QuoteIndex, SubjectIndex};

/// Hands the engine the materialized table of a source
pub trait TableProvider {
    fn table(&self, source: &SourceRef) -> Option<&SourceTable>;
}

/// Tables keyed by source name or access path
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: HashMap<String, SourceTable>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, table: SourceTable) {
        self.tables.insert(key.into(), table);
    }

    pub fn with_table(mut self, key: impl Into<String>, table: SourceTable) -> Self {
        self.insert(key, table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableProvider for TableSet {
    /// Looks up the source name first, then the access path.
    fn table(&self, source: &SourceRef) -> Option<&SourceTable> {
        source
            .name
            .as_deref()
            .and_then(|name| self.tables.get(name))
            .or_else(|| self.tables.get(&source.access))
    }
}

impl TableProvider for HashMap<String, SourceTable> {
    fn table(&self, source: &SourceRef) -> Option<&SourceTable> {
        self.get(source.key())
    }
}

/// Counters of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub rows_processed: usize,
    pub quads_generated: usize,
    /// Quads with a quoted triple as subject or object
    pub quoted_quads: usize,
    pub maps_processed: usize,
    pub diagnostics: usize,
}

/// Result of [`Engine::run`]
#[derive(Debug, Clone)]
pub struct Generation {
    pub quads: Vec<Quad>,
    pub stats: GenerationStats,
    pub diagnostics: Diagnostics,
}

/// Runs a mapping specification
pub struct Engine<'s> {
    spec: &'s MappingSpecification,
    options: GenerationOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'s> Engine<'s> {
    pub fn new(spec: &'s MappingSpecification) -> Self {
        Self {
            spec,
            options: GenerationOptions::default(),
            cancel: None,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop scheduling maps once the flag is set. Checked before each map.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |c| c.load(Ordering::Relaxed))
    }

    /// Generate all quads, collecting diagnostics in a [`Diagnostics`].
    pub fn run<P: TableProvider + ?Sized>(&self, provider: &P) -> MappingResult<Generation> {
        let mut diagnostics = Diagnostics::new(self.options.max_recorded_diagnostics);
        let (quads, stats) = self.run_with_sink(provider, &mut diagnostics)?;
        Ok(Generation {
            quads,
            stats,
            diagnostics,
        })
    }

    /// Generate all quads, reporting diagnostics to `sink` in plan order.
    pub fn run_with_sink<P: TableProvider + ?Sized>(
        &self,
        provider: &P,
        sink: &mut dyn DiagnosticSink,
    ) -> MappingResult<(Vec<Quad>, GenerationStats)> {
        let resolver = TermResolver::for_spec(self.spec).with_encoding(self.options.iri_encoding);

        let mut tables: HashMap<&str, Vec<&SourceTable>> = HashMap::new();
        let mut compiled: HashMap<&str, CompiledMap> = HashMap::new();
        for map in self.spec.iter() {
            let map_tables = map
                .sources
                .iter()
                .map(|source| {
                    provider
                        .table(source)
                        .ok_or_else(|| MappingError::MissingTable {
                            mapping: map.name.clone(),
                            source_key: source.key().to_string(),
                        })
                })
                .collect::<MappingResult<Vec<_>>>()?;
            tables.insert(&map.name, map_tables);
            compiled.insert(&map.name, CompiledMap::compile(map, &resolver)?);
        }

        let (quote_indexes, subject_indexes) = build_indexes(&compiled, &tables, &resolver);

        let mut stats = GenerationStats::default();
        let mut quads = match &self.options.dataset_metadata {
            Some(meta) => metadata::dataset_quads(meta, &self.spec.authors, &resolver)?,
            None => Vec::new(),
        };

        let mut outputs: HashMap<String, MapOutput> = HashMap::new();
        for level in self.spec.plan().levels() {
            let results = {
                let ctx = JoinContext {
                    outputs: &outputs,
                    quote_indexes: &quote_indexes,
                    subject_indexes: &subject_indexes,
                };
                let run_map = |name: &String| -> MappingResult<MapOutput> {
                    if self.is_cancelled() {
                        return Err(MappingError::Cancelled);
                    }
                    let map = compiled.get(name.as_str()).ok_or_else(|| {
                        MappingError::Document(format!("unplanned map '{}'", name))
                    })?;
                    let map_tables = tables.get(name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                    let span = debug_span!("triples_map", mapping = %name);
                    let _guard = span.enter();
                    Ok(generate::generate_map(map, map_tables, &resolver, &ctx))
                };
                if self.options.parallel {
                    level.par_iter().map(run_map).collect::<MappingResult<Vec<_>>>()?
                } else {
                    level.iter().map(run_map).collect::<MappingResult<Vec<_>>>()?
                }
            };

            for (name, mut output) in level.iter().zip(results) {
                stats.maps_processed += 1;
                stats.rows_processed += output.rows;
                stats.quoted_quads += output.quoted_quads;
                stats.diagnostics += output.diagnostics.len();
                for diagnostic in output.diagnostics.drain(..) {
                    sink.report(diagnostic);
                }
                outputs.insert(name.clone(), output);
            }
        }

        for name in self.spec.plan().order() {
            if let Some(output) = outputs.remove(name) {
                quads.extend(output.quads);
            }
        }
        stats.quads_generated = quads.len();

        info!(
            maps = stats.maps_processed,
            rows = stats.rows_processed,
            quads = stats.quads_generated,
            quoted = stats.quoted_quads,
            diagnostics = stats.diagnostics,
            "generation finished"
        );
        Ok((quads, stats))
    }
}

/// Build each join index once, however many maps share it.
fn build_indexes(
    compiled: &HashMap<&str, CompiledMap>,
    tables: &HashMap<&str, Vec<&SourceTable>>,
    resolver: &TermResolver,
) -> (
    HashMap<IndexKey, QuoteIndex>,
    HashMap<IndexKey, SubjectIndex>,
) {
    let mut quote_indexes = HashMap::new();
    let mut subject_indexes = HashMap::new();
    let no_tables: Vec<&SourceTable> = Vec::new();

    for map in compiled.values() {
        for (key, quoted) in map.joins() {
            let (parent, columns) = &key;
            let parent_tables = tables.get(parent.as_str()).unwrap_or(&no_tables);
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();

            if quoted {
                if cols.is_empty() || quote_indexes.contains_key(&key) {
                    continue;
                }
                let index = QuoteIndex::build(parent_tables, &cols);
                debug!(parent = %parent, columns = ?cols, keys = index.len(), "quote index built");
                quote_indexes.insert(key, index);
            } else if !subject_indexes.contains_key(&key) {
                let subject_terms = compiled
                    .get(parent.as_str())
                    .map(CompiledMap::subject_terms)
                    .unwrap_or(&[]);
                let index = SubjectIndex::build(
                    parent_tables,
                    subject_terms,
                    resolver,
                    (!cols.is_empty()).then_some(cols.as_slice()),
                );
                debug!(parent = %parent, columns = ?cols, "subject index built");
                subject_indexes.insert(key, index);
            }
        }
    }

    (quote_indexes, subject_indexes)
}
