//! Columnar source table.
//!
//! Column values are exposed to the mapping engine as text (`value_str`),
//! since every template placeholder substitutes a lexical form. Typed
//! storage keeps numeric and boolean sources compact and lets callers
//! inspect the original type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Result, TabularError};

/// Source column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    Int64,
    Float64,
    String,
}

/// Column information in a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as referenced by `$(name)` placeholders.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Whether the column holds at least one null.
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
}

/// Schema for a source table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Column definitions in column order.
    pub fields: Vec<ColumnInfo>,
    name_to_index: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a schema, rejecting duplicate column names.
    pub fn new(fields: Vec<ColumnInfo>) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            if name_to_index.insert(f.name.clone(), i).is_some() {
                return Err(TabularError::Schema(format!("Duplicate column name '{}'", f.name)));
            }
        }
        Ok(Self {
            fields,
            name_to_index,
        })
    }

    /// Get column index by name.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get column info by name.
    pub fn field(&self, name: &str) -> Option<&ColumnInfo> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Column storage - typed arrays with optional values (nullable).
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Boolean(Vec<Option<bool>>),
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    String(Vec<Option<String>>),
}

impl Column {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if value at index is null. Out-of-range rows count as null.
    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        match self {
            Self::Boolean(v) => v.get(idx).map_or(true, |v| v.is_none()),
            Self::Int64(v) => v.get(idx).map_or(true, |v| v.is_none()),
            Self::Float64(v) => v.get(idx).map_or(true, |v| v.is_none()),
            Self::String(v) => v.get(idx).map_or(true, |v| v.is_none()),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Boolean(_) => FieldType::Boolean,
            Self::Int64(_) => FieldType::Int64,
            Self::Float64(_) => FieldType::Float64,
            Self::String(_) => FieldType::String,
        }
    }

    /// Lexical form of the value at index, whatever the column type.
    pub fn value_str(&self, idx: usize) -> Option<Cow<'_, str>> {
        match self {
            Self::String(v) => v.get(idx).and_then(|v| v.as_deref()).map(Cow::Borrowed),
            Self::Int64(v) => v
                .get(idx)
                .and_then(|v| *v)
                .map(|n| Cow::Owned(n.to_string())),
            Self::Float64(v) => v
                .get(idx)
                .and_then(|v| *v)
                .map(|n| Cow::Owned(n.to_string())),
            Self::Boolean(v) => v
                .get(idx)
                .and_then(|v| *v)
                .map(|b| Cow::Borrowed(if b { "true" } else { "false" })),
        }
    }
}

/// Materialized rows of one source, stored by column.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub schema: Arc<TableSchema>,
    /// Column data in schema order.
    pub columns: Vec<Column>,
    pub num_rows: usize,
}

impl SourceTable {
    /// Create a table from columns in schema order.
    pub fn new(schema: Arc<TableSchema>, columns: Vec<Column>) -> Result<Self> {
        if columns.len() != schema.num_fields() {
            return Err(TabularError::Schema(format!(
                "Column count mismatch: schema has {} fields, got {} columns",
                schema.num_fields(),
                columns.len()
            )));
        }

        let num_rows = columns.first().map_or(0, |c| c.len());

        for (i, (col, info)) in columns.iter().zip(&schema.fields).enumerate() {
            if col.len() != num_rows {
                return Err(TabularError::Schema(format!(
                    "Row count mismatch: column {} has {} rows, expected {}",
                    i,
                    col.len(),
                    num_rows
                )));
            }
            if col.field_type() != info.field_type {
                return Err(TabularError::Schema(format!(
                    "Column '{}' declared {:?} but holds {:?}",
                    info.name,
                    info.field_type,
                    col.field_type()
                )));
            }
        }

        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Build a string-typed table from records of `(column, value)` pairs.
    ///
    /// The schema is the union of all record keys in first-seen order. A record
    /// that lacks a key gets a null in that column.
    pub fn from_records<I, R, K, V>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<Vec<Option<String>>> = Vec::new();
        let mut num_rows = 0usize;

        for (row, record) in records.into_iter().enumerate() {
            for (key, value) in record {
                let key = key.into();
                let col = match index.get(&key) {
                    Some(&c) => c,
                    None => {
                        let c = names.len();
                        index.insert(key.clone(), c);
                        names.push(key);
                        columns.push(vec![None; row]);
                        c
                    }
                };
                let cells = &mut columns[col];
                if cells.len() > row {
                    return Err(TabularError::Record {
                        row,
                        message: format!("column '{}' appears twice", names[col]),
                    });
                }
                cells.push(value.map(Into::into));
            }
            num_rows = row + 1;
            for cells in &mut columns {
                if cells.len() == row {
                    cells.push(None);
                }
            }
        }

        let fields = names
            .into_iter()
            .zip(&columns)
            .map(|(name, cells)| ColumnInfo {
                name,
                field_type: FieldType::String,
                nullable: cells.iter().any(Option::is_none),
            })
            .collect();
        let schema = Arc::new(TableSchema::new(fields)?);
        let columns = columns.into_iter().map(Column::String).collect();
        let mut table = Self::new(schema, columns)?;
        table.num_rows = num_rows;
        Ok(table)
    }

    /// Build a typed table from a JSON array of flat objects.
    ///
    /// A column whose non-null values are all booleans becomes `Boolean`, all
    /// integers `Int64`, all numbers `Float64`; anything else is `String`, with
    /// nested values kept as their JSON text.
    pub fn from_json(rows: &JsonValue) -> Result<Self> {
        let rows = rows
            .as_array()
            .ok_or_else(|| TabularError::Schema("expected a JSON array of records".into()))?;

        let mut names: Vec<String> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (row, record) in rows.iter().enumerate() {
            let obj = record.as_object().ok_or_else(|| TabularError::Record {
                row,
                message: "expected a JSON object".into(),
            })?;
            for key in obj.keys() {
                if !index.contains_key(key.as_str()) {
                    index.insert(key.as_str(), names.len());
                    names.push(key.clone());
                }
            }
        }

        let mut fields = Vec::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            let cells: Vec<&JsonValue> = rows
                .iter()
                .map(|r| r.get(name.as_str()).unwrap_or(&JsonValue::Null))
                .collect();
            let field_type = infer_type(&cells);
            fields.push(ColumnInfo {
                name: name.clone(),
                field_type,
                nullable: cells.iter().any(|v| v.is_null()),
            });
            columns.push(json_column(field_type, &cells));
        }

        let schema = Arc::new(TableSchema::new(fields)?);
        let mut table = Self::new(schema, columns)?;
        // a list of empty objects still has rows
        table.num_rows = rows.len();
        Ok(table)
    }

    /// Get column by name.
    #[inline]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    /// Lexical value of `column` at `row`; `None` for null, unknown column or row.
    pub fn value(&self, row: usize, column: &str) -> Option<Cow<'_, str>> {
        self.column_by_name(column).and_then(|c| c.value_str(row))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Iterator over row indices.
    pub fn row_indices(&self) -> impl Iterator<Item = usize> {
        0..self.num_rows
    }
}

fn infer_type(cells: &[&JsonValue]) -> FieldType {
    let mut present = cells.iter().filter(|v| !v.is_null()).peekable();
    if present.peek().is_none() {
        return FieldType::String;
    }
    let present: Vec<_> = present.collect();
    if present.iter().all(|v| v.is_boolean()) {
        FieldType::Boolean
    } else if present.iter().all(|v| v.is_i64()) {
        FieldType::Int64
    } else if present.iter().all(|v| v.is_number()) {
        FieldType::Float64
    } else {
        FieldType::String
    }
}

fn json_column(field_type: FieldType, cells: &[&JsonValue]) -> Column {
    match field_type {
        FieldType::Boolean => Column::Boolean(cells.iter().map(|v| v.as_bool()).collect()),
        FieldType::Int64 => Column::Int64(cells.iter().map(|v| v.as_i64()).collect()),
        FieldType::Float64 => Column::Float64(cells.iter().map(|v| v.as_f64()).collect()),
        FieldType::String => Column::String(
            cells
                .iter()
                .map(|v| match v {
                    JsonValue::Null => None,
                    JsonValue::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SourceTable {
        SourceTable::from_records(vec![
            vec![("id", Some("1")), ("name", Some("Alice"))],
            vec![("id", Some("2")), ("name", None)],
            vec![("id", Some("3")), ("city", Some("Ghent"))],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_records_union_schema() {
        let table = sample();
        assert_eq!(table.num_rows, 3);
        assert_eq!(
            table.schema.names().collect::<Vec<_>>(),
            vec!["id", "name", "city"]
        );

        assert_eq!(table.value(0, "name").as_deref(), Some("Alice"));
        assert_eq!(table.value(1, "name"), None);
        // row 2 never mentioned "name"
        assert_eq!(table.value(2, "name"), None);
        assert_eq!(table.value(0, "city"), None);
        assert_eq!(table.value(2, "city").as_deref(), Some("Ghent"));
        assert!(!table.schema.field("id").unwrap().nullable);
        assert!(table.schema.field("city").unwrap().nullable);
    }

    #[test]
    fn test_from_records_duplicate_key() {
        let err = SourceTable::from_records(vec![vec![("id", Some("1")), ("id", Some("2"))]])
            .unwrap_err();
        assert!(matches!(err, TabularError::Record { row: 0, .. }));
    }

    #[test]
    fn test_from_json_infers_types() {
        let table = SourceTable::from_json(&json!([
            {"id": 1, "score": 0.5, "ok": true, "tag": "a"},
            {"id": 2, "score": 2, "ok": null, "tag": {"nested": 1}}
        ]))
        .unwrap();

        assert_eq!(
            table.column_by_name("id").unwrap().field_type(),
            FieldType::Int64
        );
        assert_eq!(
            table.column_by_name("score").unwrap().field_type(),
            FieldType::Float64
        );
        assert_eq!(
            table.column_by_name("ok").unwrap().field_type(),
            FieldType::Boolean
        );
        assert_eq!(
            table.column_by_name("tag").unwrap().field_type(),
            FieldType::String
        );

        assert_eq!(table.value(1, "id").as_deref(), Some("2"));
        assert_eq!(table.value(0, "score").as_deref(), Some("0.5"));
        assert_eq!(table.value(0, "ok").as_deref(), Some("true"));
        assert!(table.column_by_name("ok").unwrap().is_null(1));
        assert_eq!(table.value(1, "tag").as_deref(), Some(r#"{"nested":1}"#));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(SourceTable::from_json(&json!({"id": 1})).is_err());
        assert!(matches!(
            SourceTable::from_json(&json!([{"id": 1}, 7])),
            Err(TabularError::Record { row: 1, .. })
        ));
    }

    #[test]
    fn test_new_checks_shape() {
        let schema = Arc::new(
            TableSchema::new(vec![
                ColumnInfo::new("id", FieldType::Int64),
                ColumnInfo::new("name", FieldType::String),
            ])
            .unwrap(),
        );
        let short = SourceTable::new(
            Arc::clone(&schema),
            vec![
                Column::Int64(vec![Some(1), Some(2)]),
                Column::String(vec![Some("A".into())]),
            ],
        );
        assert!(short.is_err());

        let mistyped = SourceTable::new(
            schema,
            vec![Column::String(vec![]), Column::String(vec![])],
        );
        assert!(mistyped.is_err());
    }

    #[test]
    fn test_duplicate_schema_names_rejected() {
        assert!(TableSchema::new(vec![
            ColumnInfo::new("a", FieldType::String),
            ColumnInfo::new("a", FieldType::Int64),
        ])
        .is_err());
    }
}
