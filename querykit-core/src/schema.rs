//! Table and column schema abstraction.
//!
//! The query builder never introspects a real database. Columns are grouped by
//! [`FieldType`] per table, and a [`SchemaProvider`] hands those tables to the
//! builder. The field type of a condition is always inferred from the column
//! the user picked.
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::schema::{FieldType, TableSchema};
//!
//! let users = TableSchema::new("Users")
//!     .with_columns(FieldType::String, ["username", "email"])
//!     .with_columns(FieldType::Numeric, ["id", "age"]);
//!
//! assert_eq!(users.field_type_of("age"), Some(FieldType::Numeric));
//! ```

use std::{collections::BTreeMap, fmt, fmt::Debug, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// The semantic type of a column, and therefore of a field condition.
///
/// The declaration order is the order columns are offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Free text.
    String,
    /// Integers and decimals.
    Numeric,
    /// `true` / `false`.
    Boolean,
    /// Calendar dates (`YYYY-MM-DD`).
    Date,
}

impl FieldType {
    /// All field types, in offer order.
    pub const ALL: [FieldType; 4] = [
        FieldType::String,
        FieldType::Numeric,
        FieldType::Boolean,
        FieldType::Date,
    ];

    /// The upper-case name used on the internal tree and in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Numeric => "NUMERIC",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
        }
    }

    /// The lower-case `valueType` of the generic wire dialect.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Numeric => "numeric",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = QueryError;

    /// Parses a field type name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|field_type| field_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| QueryError::InvalidValueType(s.to_string()))
    }
}

/// The columns of a single table, grouped by field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// The table name as offered in the table selector.
    pub name: String,
    /// Column names per field type, each list in declaration order.
    pub columns: BTreeMap<FieldType, Vec<String>>,
}

impl TableSchema {
    /// Creates a table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Appends columns of the given field type.
    pub fn with_columns<I, S>(mut self, field_type: FieldType, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .entry(field_type)
            .or_default()
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// All column names, flattened in field type order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// The column names declared for one field type.
    pub fn columns_of(&self, field_type: FieldType) -> &[String] {
        self.columns
            .get(&field_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Looks up the field type of a column.
    ///
    /// A column name listed under several field types resolves to the first one
    /// in field type order.
    pub fn field_type_of(&self, column: &str) -> Option<FieldType> {
        self.columns
            .iter()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(field_type, _)| *field_type)
    }

    /// Returns `true` if the table declares the column.
    pub fn has_column(&self, column: &str) -> bool {
        self.field_type_of(column).is_some()
    }
}

/// Source of the tables and columns a query can be built against.
///
/// Implementations are expected to be cheap to query: the builder asks for
/// tables and columns on every edit.
pub trait SchemaProvider: Send + Sync + Debug {
    /// The names of all tables, in the order they should be offered.
    fn table_names(&self) -> Vec<&str>;

    /// Returns the schema of a table, if it exists.
    fn table(&self, name: &str) -> Option<&TableSchema>;

    /// Returns `true` if the table exists.
    fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// All columns of a table, or an empty list when the table is unknown.
    fn columns(&self, table: &str) -> Vec<&str> {
        self.table(table)
            .map(TableSchema::columns)
            .unwrap_or_default()
    }

    /// Infers the field type of a column in a table.
    fn field_type_of(&self, table: &str, column: &str) -> Option<FieldType> {
        if column.is_empty() {
            return None;
        }

        self.table(table)?.field_type_of(column)
    }
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for &P {
    fn table_names(&self) -> Vec<&str> {
        (**self).table_names()
    }

    fn table(&self, name: &str) -> Option<&TableSchema> {
        (**self).table(name)
    }
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for Box<P> {
    fn table_names(&self) -> Vec<&str> {
        (**self).table_names()
    }

    fn table(&self, name: &str) -> Option<&TableSchema> {
        (**self).table(name)
    }
}
