//! Columnar source tables for starmap.
//!
//! A [`SourceTable`] is the materialized form of one mapping source: an
//! ordered sequence of records stored column by column. Readers for CSV,
//! JSON, SQL and friends live outside this crate and hand their rows over
//! through [`SourceTable::from_records`] or [`SourceTable::from_json`].
//!
//! # Design
//!
//! - **Columnar storage**: Data is stored in typed `Vec` per column, not per-row
//! - **Strongly typed**: All column access is through the `Column` enum, no `dyn Any`
//! - **Name canonical**: columns are addressed by the names mapping templates use

pub mod error;
pub mod table;

pub use error::{Result, TabularError};
pub use table::{Column, ColumnInfo, FieldType, SourceTable, TableSchema};
