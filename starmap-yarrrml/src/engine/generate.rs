//! Per-map quad generation
//!
//! A triples map is compiled once, then every term is materialized for a
//! whole table column at a time. Assembly walks rows only to combine the
//! already-built terms.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use starmap_graph_ir::{Quad, Term};
use starmap_tabular::SourceTable;
use tracing::debug;

use super::diagnostics::{DiagnosticKind, RowDiagnostic};
use super::join::{self, IndexKey, KeyColumns, QuoteIndex, RowPosition, SubjectIndex};
use crate::error::MappingResult;
use crate::mapping::{
    ExprKind, JoinCondition, MappingRef, ObjectSpec, QuotedRef, Template, TriplesMap,
};
use crate::materialize::{CompiledTerm, TermFailure, TermResolver};

/// Quads of one map plus the row spans joins need
#[derive(Debug, Clone, Default)]
pub(crate) struct MapOutput {
    pub(crate) quads: Vec<Quad>,
    /// table → row → range in `quads`
    pub(crate) spans: Vec<Vec<Range<usize>>>,
    pub(crate) rows: usize,
    pub(crate) quoted_quads: usize,
    pub(crate) diagnostics: Vec<RowDiagnostic>,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledSubjects {
    Templates(Vec<CompiledTerm>),
    Quoted(QuotedRef),
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledObject {
    Term(CompiledTerm),
    Reference(MappingRef),
    Quoted(QuotedRef),
    Function,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPredicateObject {
    predicate: CompiledTerm,
    object: CompiledObject,
    inverse: Option<CompiledTerm>,
    graphs: Vec<CompiledTerm>,
}

/// A triples map with every template compiled
#[derive(Debug, Clone)]
pub(crate) struct CompiledMap {
    pub(crate) name: String,
    pub(crate) subjects: CompiledSubjects,
    subject_graphs: Vec<CompiledTerm>,
    map_graphs: Vec<CompiledTerm>,
    predicate_objects: Vec<CompiledPredicateObject>,
    /// Functions and conditions carried but not evaluated
    deferred: Vec<ExprKind>,
}

fn compile_iris(
    templates: &[Template],
    resolver: &TermResolver,
) -> MappingResult<Vec<CompiledTerm>> {
    templates
        .iter()
        .map(|t| CompiledTerm::iri(t, resolver))
        .collect()
}

impl CompiledMap {
    pub(crate) fn compile(map: &TriplesMap, resolver: &TermResolver) -> MappingResult<Self> {
        let subjects = match &map.subject.quoted {
            Some(quoted) => CompiledSubjects::Quoted(quoted.clone()),
            None => CompiledSubjects::Templates(compile_iris(&map.subject.templates, resolver)?),
        };

        let mut deferred: Vec<ExprKind> = map.condition.iter().map(|c| c.kind).collect();
        deferred.extend(map.subject.functions.iter().map(|f| f.kind));

        let mut predicate_objects = Vec::with_capacity(map.predicate_objects.len());
        for po in &map.predicate_objects {
            let object = match &po.object {
                ObjectSpec::Term(term) => {
                    CompiledObject::Term(CompiledTerm::object(term, resolver)?)
                }
                ObjectSpec::Reference(r) => CompiledObject::Reference(r.clone()),
                ObjectSpec::Quoted(q) => CompiledObject::Quoted(q.clone()),
                ObjectSpec::Function(expr) => {
                    deferred.push(expr.kind);
                    CompiledObject::Function
                }
            };
            if let Some(cond) = &po.condition {
                deferred.push(cond.kind);
            }
            predicate_objects.push(CompiledPredicateObject {
                predicate: CompiledTerm::iri(&po.predicate, resolver)?,
                object,
                inverse: po
                    .inverse_predicate
                    .as_ref()
                    .map(|t| CompiledTerm::iri(t, resolver))
                    .transpose()?,
                graphs: compile_iris(&po.graphs, resolver)?,
            });
        }
        deferred.sort_by_key(|k| matches!(k, ExprKind::Condition));
        deferred.dedup();

        Ok(Self {
            name: map.name.clone(),
            subjects,
            subject_graphs: compile_iris(&map.subject.graphs, resolver)?,
            map_graphs: compile_iris(&map.graphs, resolver)?,
            predicate_objects,
            deferred,
        })
    }

    /// Template subjects, empty for an annotation map
    pub(crate) fn subject_terms(&self) -> &[CompiledTerm] {
        match &self.subjects {
            CompiledSubjects::Templates(terms) => terms,
            CompiledSubjects::Quoted(_) => &[],
        }
    }

    /// Every join this map performs: index key, and whether it quotes
    pub(crate) fn joins(&self) -> Vec<(IndexKey, bool)> {
        let mut joins = Vec::new();
        if let CompiledSubjects::Quoted(q) = &self.subjects {
            joins.push((join::index_key(&q.mapping, q.condition.as_ref()), true));
        }
        for po in &self.predicate_objects {
            match &po.object {
                CompiledObject::Quoted(q) => {
                    joins.push((join::index_key(&q.mapping, q.condition.as_ref()), true))
                }
                CompiledObject::Reference(r) => {
                    joins.push((join::index_key(&r.mapping, r.condition.as_ref()), false))
                }
                _ => {}
            }
        }
        joins
    }
}

/// Read-only state shared by every map of a level
pub(crate) struct JoinContext<'a> {
    pub(crate) outputs: &'a HashMap<String, MapOutput>,
    pub(crate) quote_indexes: &'a HashMap<IndexKey, QuoteIndex>,
    pub(crate) subject_indexes: &'a HashMap<IndexKey, SubjectIndex>,
}

/// How one child table probes a join
enum Probe<'a> {
    Positional,
    Keyed(KeyColumns<'a>),
    /// The child table lacks a join column: nothing matches
    Unbound,
}

impl<'a> Probe<'a> {
    fn bind(
        table: &'a SourceTable,
        condition: Option<&JoinCondition>,
    ) -> Result<Self, TermFailure> {
        match condition {
            None => Ok(Probe::Positional),
            Some(cond) => KeyColumns::bind(table, &cond.child_columns()).map(Probe::Keyed),
        }
    }
}

impl JoinContext<'_> {
    fn quoted_terms(&self, quoted: &QuotedRef, probe: &Probe<'_>, pos: RowPosition) -> Vec<Term> {
        let Some(output) = self.outputs.get(&quoted.mapping) else {
            return Vec::new();
        };
        match probe {
            Probe::Positional => join::quote_rows(output, &[pos], &quoted.filter),
            Probe::Keyed(keys) => {
                let key = join::index_key(&quoted.mapping, quoted.condition.as_ref());
                match (keys.key(pos.1), self.quote_indexes.get(&key)) {
                    (Some(k), Some(index)) => {
                        join::quote_rows(output, index.lookup(&k), &quoted.filter)
                    }
                    _ => Vec::new(),
                }
            }
            Probe::Unbound => Vec::new(),
        }
    }

    fn referenced_subjects(
        &self,
        reference: &MappingRef,
        probe: &Probe<'_>,
        pos: RowPosition,
    ) -> Vec<Term> {
        let key = join::index_key(&reference.mapping, reference.condition.as_ref());
        let Some(index) = self.subject_indexes.get(&key) else {
            return Vec::new();
        };
        match probe {
            Probe::Positional => index.at(pos).to_vec(),
            Probe::Keyed(keys) => keys
                .key(pos.1)
                .map(|k| index.by_key(&k))
                .unwrap_or_default(),
            Probe::Unbound => Vec::new(),
        }
    }
}

/// Per-table materialized columns of one predicate-object entry
struct PoColumns<'a> {
    spec: &'a CompiledPredicateObject,
    predicate: Vec<Result<Term, TermFailure>>,
    object: Option<Vec<Result<Term, TermFailure>>>,
    inverse: Option<Vec<Result<Term, TermFailure>>>,
    graphs: Vec<Vec<Result<Term, TermFailure>>>,
    probe: Option<Probe<'a>>,
}

struct Emitter<'m> {
    map: &'m str,
    quads: Vec<Quad>,
    quoted_quads: usize,
    diagnostics: Vec<RowDiagnostic>,
}

impl Emitter<'_> {
    fn report(&mut self, row: Option<usize>, kind: DiagnosticKind) {
        self.diagnostics.push(RowDiagnostic {
            mapping: self.map.to_string(),
            row,
            kind,
        });
    }

    fn take<'t>(&mut self, row: usize, result: &'t Result<Term, TermFailure>) -> Option<&'t Term> {
        match result {
            Ok(term) => Some(term),
            Err(failure) => {
                self.report(Some(row), failure.clone().into());
                None
            }
        }
    }

    fn push(&mut self, quad: Quad) {
        if quad.has_quoted_term() {
            self.quoted_quads += 1;
        }
        self.quads.push(quad);
    }
}

fn materialize_all(
    terms: &[CompiledTerm],
    resolver: &TermResolver,
    table: &SourceTable,
) -> Vec<Vec<Result<Term, TermFailure>>> {
    terms
        .iter()
        .map(|t| t.materialize_column(resolver, table))
        .collect()
}

/// Resolve graph IRIs of one row; failed copies are reported and dropped.
fn row_graphs(
    emitter: &mut Emitter<'_>,
    row: usize,
    columns: &[Vec<Result<Term, TermFailure>>],
) -> Vec<Option<Arc<str>>> {
    if columns.is_empty() {
        return vec![None];
    }
    let mut graphs = Vec::with_capacity(columns.len());
    for col in columns {
        if let Some(term) = emitter.take(row, &col[row]) {
            if let Some(iri) = term.as_iri() {
                graphs.push(Some(Arc::from(iri)));
            }
        }
    }
    graphs
}

/// Generate every quad of one map over its tables.
pub(crate) fn generate_map(
    map: &CompiledMap,
    tables: &[&SourceTable],
    resolver: &TermResolver,
    ctx: &JoinContext<'_>,
) -> MapOutput {
    let mut emitter = Emitter {
        map: &map.name,
        quads: Vec::new(),
        quoted_quads: 0,
        diagnostics: Vec::new(),
    };
    for &expr in &map.deferred {
        emitter.report(None, DiagnosticKind::DeferredFunction { expr });
    }

    let mut spans = Vec::with_capacity(tables.len());
    let mut rows = 0;

    for (t, table) in tables.iter().enumerate() {
        rows += table.num_rows;

        let subject_columns = materialize_all(map.subject_terms(), resolver, table);
        let subject_graphs = materialize_all(&map.subject_graphs, resolver, table);
        let map_graphs = materialize_all(&map.map_graphs, resolver, table);

        let subject_probe = match &map.subjects {
            CompiledSubjects::Quoted(q) => {
                Some(bind_probe(&mut emitter, table, q.condition.as_ref()))
            }
            CompiledSubjects::Templates(_) => None,
        };

        let po_columns: Vec<PoColumns<'_>> = map
            .predicate_objects
            .iter()
            .map(|po| {
                let (object, probe) = match &po.object {
                    CompiledObject::Term(term) => {
                        (Some(term.materialize_column(resolver, table)), None)
                    }
                    CompiledObject::Quoted(q) => {
                        (None, Some(bind_probe(&mut emitter, table, q.condition.as_ref())))
                    }
                    CompiledObject::Reference(r) => {
                        (None, Some(bind_probe(&mut emitter, table, r.condition.as_ref())))
                    }
                    CompiledObject::Function => (None, None),
                };
                PoColumns {
                    spec: po,
                    predicate: po.predicate.materialize_column(resolver, table),
                    object,
                    inverse: po
                        .inverse
                        .as_ref()
                        .map(|inv| inv.materialize_column(resolver, table)),
                    graphs: materialize_all(&po.graphs, resolver, table),
                    probe,
                }
            })
            .collect();

        let mut table_spans = Vec::with_capacity(table.num_rows);
        for row in table.row_indices() {
            let start = emitter.quads.len();
            let pos = (t, row);

            let subjects: Vec<Term> = match (&map.subjects, &subject_probe) {
                (CompiledSubjects::Quoted(q), Some(probe)) => {
                    let quoted = ctx.quoted_terms(q, probe, pos);
                    if quoted.is_empty() {
                        emitter.report(
                            Some(row),
                            DiagnosticKind::JoinNoMatch {
                                reference: q.mapping.clone(),
                            },
                        );
                    }
                    quoted
                }
                _ => subject_columns
                    .iter()
                    .filter_map(|col| emitter.take(row, &col[row]).cloned())
                    .collect(),
            };

            if !subjects.is_empty() {
                // graph fallback shared by every entry without its own graphs
                let inherited = if !subject_graphs.is_empty() {
                    row_graphs(&mut emitter, row, &subject_graphs)
                } else {
                    row_graphs(&mut emitter, row, &map_graphs)
                };
                let entries: Vec<RowEntry> = po_columns
                    .iter()
                    .filter_map(|po| row_entry(&mut emitter, ctx, po, pos, &inherited))
                    .collect();
                for subject in &subjects {
                    for entry in &entries {
                        emit_entry(&mut emitter, entry, subject);
                    }
                }
            }

            table_spans.push(start..emitter.quads.len());
        }
        spans.push(table_spans);
    }

    debug!(
        mapping = %map.name,
        rows,
        quads = emitter.quads.len(),
        skipped = emitter.diagnostics.len(),
        "triples map generated"
    );

    MapOutput {
        quads: emitter.quads,
        spans,
        rows,
        quoted_quads: emitter.quoted_quads,
        diagnostics: emitter.diagnostics,
    }
}

fn bind_probe<'a>(
    emitter: &mut Emitter<'_>,
    table: &'a SourceTable,
    condition: Option<&JoinCondition>,
) -> Probe<'a> {
    match Probe::bind(table, condition) {
        Ok(probe) => probe,
        Err(failure) => {
            emitter.report(None, failure.into());
            Probe::Unbound
        }
    }
}

/// Terms of one predicate-object entry for one row
struct RowEntry {
    predicate: Term,
    objects: Vec<Term>,
    inverse: Option<Term>,
    graphs: Vec<Option<Arc<str>>>,
}

/// Resolve an entry's terms for a row. `None` when the entry yields nothing.
fn row_entry(
    emitter: &mut Emitter<'_>,
    ctx: &JoinContext<'_>,
    po: &PoColumns<'_>,
    pos: RowPosition,
    inherited: &[Option<Arc<str>>],
) -> Option<RowEntry> {
    let row = pos.1;
    let predicate = emitter.take(row, &po.predicate[row])?.clone();

    let objects: Vec<Term> = match (&po.spec.object, &po.object, &po.probe) {
        (CompiledObject::Term(_), Some(col), _) => vec![emitter.take(row, &col[row])?.clone()],
        (CompiledObject::Quoted(q), _, Some(probe)) => {
            let found = ctx.quoted_terms(q, probe, pos);
            if found.is_empty() {
                emitter.report(
                    Some(row),
                    DiagnosticKind::JoinNoMatch {
                        reference: q.mapping.clone(),
                    },
                );
                return None;
            }
            found
        }
        (CompiledObject::Reference(r), _, Some(probe)) => {
            let found = ctx.referenced_subjects(r, probe, pos);
            if found.is_empty() {
                emitter.report(
                    Some(row),
                    DiagnosticKind::JoinNoMatch {
                        reference: r.mapping.clone(),
                    },
                );
                return None;
            }
            found
        }
        _ => return None,
    };

    let inverse = match &po.inverse {
        Some(col) => emitter.take(row, &col[row]).cloned(),
        None => None,
    };

    let graphs = if po.graphs.is_empty() {
        inherited.to_vec()
    } else {
        row_graphs(emitter, row, &po.graphs)
    };

    Some(RowEntry {
        predicate,
        objects,
        inverse,
        graphs,
    })
}

/// Quads of one entry for one subject: objects, then graphs, each quad
/// followed by its inverse.
fn emit_entry(emitter: &mut Emitter<'_>, entry: &RowEntry, subject: &Term) {
    for object in &entry.objects {
        for graph in &entry.graphs {
            emitter.push(Quad::new(
                subject.clone(),
                entry.predicate.clone(),
                object.clone(),
                graph.clone(),
            ));
            if let Some(inverse) = &entry.inverse {
                emitter.push(Quad::new(
                    object.clone(),
                    inverse.clone(),
                    subject.clone(),
                    graph.clone(),
                ));
            }
        }
    }
}
