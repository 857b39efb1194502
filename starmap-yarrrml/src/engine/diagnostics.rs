//! Row-scoped diagnostics
//!
//! Nothing here aborts a run. The engine reports every skipped term, join
//! miss and deferred function to a [`DiagnosticSink`], and the caller
//! decides whether a high skip rate matters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::ExprKind;
use crate::materialize::TermFailure;

/// What went wrong for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    MissingColumn { column: String },
    NullValue { column: String },
    /// A term could be built syntactically but is unusable (e.g. empty IRI)
    InvalidTerm { message: String },
    /// A quoted or interlinking join found no partner row
    JoinNoMatch { reference: String },
    /// A function or condition that this engine does not evaluate
    DeferredFunction { expr: ExprKind },
}

impl DiagnosticKind {
    /// Stable label used for counting
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingColumn { .. } => "missing_column",
            DiagnosticKind::NullValue { .. } => "null_value",
            DiagnosticKind::InvalidTerm { .. } => "invalid_term",
            DiagnosticKind::JoinNoMatch { .. } => "join_no_match",
            DiagnosticKind::DeferredFunction { .. } => "deferred_function",
        }
    }
}

impl From<TermFailure> for DiagnosticKind {
    fn from(failure: TermFailure) -> Self {
        match failure {
            TermFailure::MissingColumn(column) => DiagnosticKind::MissingColumn { column },
            TermFailure::NullValue(column) => DiagnosticKind::NullValue { column },
            TermFailure::Invalid(message) => DiagnosticKind::InvalidTerm { message },
        }
    }
}

/// A skipped item, located by mapping and source row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    pub mapping: String,
    /// `None` for diagnostics that concern the whole mapping
    pub row: Option<usize>,
    pub kind: DiagnosticKind,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "{} row {}: ", self.mapping, row)?,
            None => write!(f, "{}: ", self.mapping)?,
        }
        match &self.kind {
            DiagnosticKind::MissingColumn { column } => write!(f, "column '{}' missing", column),
            DiagnosticKind::NullValue { column } => write!(f, "column '{}' is null", column),
            DiagnosticKind::InvalidTerm { message } => write!(f, "invalid term: {}", message),
            DiagnosticKind::JoinNoMatch { reference } => {
                write!(f, "no matching row in '{}'", reference)
            }
            DiagnosticKind::DeferredFunction { expr } => {
                write!(f, "{:?} not evaluated", expr)
            }
        }
    }
}

/// Receives row diagnostics as they are produced
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: RowDiagnostic);
}

impl DiagnosticSink for Vec<RowDiagnostic> {
    fn report(&mut self, diagnostic: RowDiagnostic) {
        self.push(diagnostic);
    }
}

/// Default sink: counts everything, keeps the first `max_recorded` entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    max_recorded: usize,
    recorded: Vec<RowDiagnostic>,
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl Diagnostics {
    pub fn new(max_recorded: usize) -> Self {
        Self {
            max_recorded,
            ..Default::default()
        }
    }

    /// Retained diagnostics, in report order
    pub fn recorded(&self) -> &[RowDiagnostic] {
        &self.recorded
    }

    /// Number of diagnostics of the given kind label
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// All diagnostics reported, including those not retained
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Whether some diagnostics were counted but not retained
    pub fn truncated(&self) -> bool {
        self.total > self.recorded.len()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: RowDiagnostic) {
        self.total += 1;
        *self
            .counts
            .entry(diagnostic.kind.label().to_string())
            .or_insert(0) += 1;
        if self.recorded.len() < self.max_recorded {
            self.recorded.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(row: usize) -> RowDiagnostic {
        RowDiagnostic {
            mapping: "person".to_string(),
            row: Some(row),
            kind: TermFailure::MissingColumn("email".to_string()).into(),
        }
    }

    #[test]
    fn test_cap_and_counts() {
        let mut diags = Diagnostics::new(2);
        for row in 0..5 {
            diags.report(missing(row));
        }
        diags.report(RowDiagnostic {
            mapping: "note".to_string(),
            row: None,
            kind: DiagnosticKind::DeferredFunction {
                expr: ExprKind::Condition,
            },
        });

        assert_eq!(diags.total(), 6);
        assert_eq!(diags.recorded().len(), 2);
        assert!(diags.truncated());
        assert_eq!(diags.count("missing_column"), 5);
        assert_eq!(diags.count("deferred_function"), 1);
        assert_eq!(diags.count("join_no_match"), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            missing(3).to_string(),
            "person row 3: column 'email' missing"
        );
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<RowDiagnostic> = Vec::new();
        sink.report(missing(0));
        assert_eq!(sink.len(), 1);
    }
}
