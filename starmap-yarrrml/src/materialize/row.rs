//! Row access for term resolution

use std::borrow::Cow;
use std::collections::HashMap;

use starmap_tabular::SourceTable;

/// Outcome of looking up one column in a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Value(Cow<'a, str>),
    /// The column exists but holds no value
    Null,
    /// The row has no such column
    Missing,
}

/// A single source row, addressed by column name
pub trait RowValues {
    fn lookup(&self, column: &str) -> Lookup<'_>;
}

impl RowValues for HashMap<String, Option<String>> {
    fn lookup(&self, column: &str) -> Lookup<'_> {
        match self.get(column) {
            Some(Some(v)) => Lookup::Value(Cow::Borrowed(v)),
            Some(None) => Lookup::Null,
            None => Lookup::Missing,
        }
    }
}

/// One row of a [`SourceTable`]
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    pub table: &'a SourceTable,
    pub row: usize,
}

impl<'a> TableRow<'a> {
    pub fn new(table: &'a SourceTable, row: usize) -> Self {
        Self { table, row }
    }
}

impl RowValues for TableRow<'_> {
    fn lookup(&self, column: &str) -> Lookup<'_> {
        match self.table.column_by_name(column) {
            Some(col) => match col.value_str(self.row) {
                Some(v) => Lookup::Value(v),
                None => Lookup::Null,
            },
            None => Lookup::Missing,
        }
    }
}
