//! Source and target descriptors
//!
//! The engine never opens a source itself. A [`SourceRef`] is the key a
//! [`crate::engine::TableProvider`] uses to hand over an already
//! materialized table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference formulation of a source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    JsonPath,
    XPath,
    /// Relational query, with the dialect tag as written (`mysql`, `postgresql`, ...)
    Sql(String),
    Sparql,
    Other(String),
}

impl SourceFormat {
    /// Parse a format tag as written after `~` or in `referenceFormulation`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "csv" | "tsv" => SourceFormat::Csv,
            "jsonpath" | "json" => SourceFormat::JsonPath,
            "xpath" | "xml" => SourceFormat::XPath,
            dialect @ ("sql" | "mysql" | "postgresql" | "postgres" | "sqlite" | "sqlserver"
            | "oracle") => SourceFormat::Sql(dialect.to_string()),
            "sparql" => SourceFormat::Sparql,
            _ => SourceFormat::Other(tag.trim().to_string()),
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn infer(access: &str) -> Self {
        let lower = access.to_ascii_lowercase();
        if lower.ends_with(".json") {
            SourceFormat::JsonPath
        } else if lower.ends_with(".xml") {
            SourceFormat::XPath
        } else {
            SourceFormat::Csv
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => f.write_str("csv"),
            SourceFormat::JsonPath => f.write_str("jsonpath"),
            SourceFormat::XPath => f.write_str("xpath"),
            SourceFormat::Sql(dialect) => f.write_str(dialect),
            SourceFormat::Sparql => f.write_str("sparql"),
            SourceFormat::Other(tag) => f.write_str(tag),
        }
    }
}

/// A logical source: where rows come from and how to iterate them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Root-level name, `None` for sources declared inline in a mapping
    pub name: Option<String>,
    /// Path, URL or connection string
    pub access: String,
    pub format: SourceFormat,
    pub iterator: Option<String>,
    pub query: Option<String>,
    pub delimiter: Option<String>,
    /// Any other descriptor keys, verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl SourceRef {
    pub fn new(access: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            name: None,
            access: access.into(),
            format,
            iterator: None,
            query: None,
            delimiter: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_iterator(mut self, iterator: impl Into<String>) -> Self {
        self.iterator = Some(iterator.into());
        self
    }

    /// Identity used to look up the materialized table: the root-level
    /// name when there is one, the access path otherwise.
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.access)
    }

    /// Whether two references read the same rows
    pub fn same_rows(&self, other: &SourceRef) -> bool {
        self.access == other.access
            && self.format == other.format
            && self.iterator == other.iterator
            && self.query == other.query
    }
}

/// An output target declared by the document
///
/// Serialization is an external concern; targets are carried so that a
/// downstream writer can route each mapping's quads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub name: Option<String>,
    pub access: String,
    pub target_type: Option<String>,
    pub serialization: Option<String>,
    pub compression: Option<String>,
}

impl TargetRef {
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            name: None,
            access: access.into(),
            target_type: None,
            serialization: None,
            compression: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags() {
        assert_eq!(SourceFormat::from_tag("csv"), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_tag("JSONPath"), SourceFormat::JsonPath);
        assert_eq!(
            SourceFormat::from_tag("postgresql"),
            SourceFormat::Sql("postgresql".into())
        );
        assert_eq!(
            SourceFormat::from_tag("ql:Custom"),
            SourceFormat::Other("ql:Custom".into())
        );
        assert_eq!(
            SourceFormat::infer("data/person.json"),
            SourceFormat::JsonPath
        );
        assert_eq!(SourceFormat::infer("people"), SourceFormat::Csv);
    }

    #[test]
    fn test_key_prefers_name() {
        let inline = SourceRef::new("data/products.csv", SourceFormat::Csv);
        assert_eq!(inline.key(), "data/products.csv");

        let named = inline.clone().with_name("products");
        assert_eq!(named.key(), "products");
        assert!(named.same_rows(&inline));
        assert!(!named.same_rows(&SourceRef::new("data/other.csv", SourceFormat::Csv)));
    }
}
