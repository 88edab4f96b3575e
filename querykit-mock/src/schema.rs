//! The hardcoded mock schema and its JSON configuration.
//!
//! Queries are never run against a database, so tables and columns come from
//! a fixed mock. The same shape can be loaded from a JSON file:
//!
//! ```json
//! {
//!     "Users": {
//!         "STRING": ["username", "email"],
//!         "NUMERIC": ["id", "age"]
//!     },
//!     "Categories": {}
//! }
//! ```
//!
//! Tables are offered in file order.

use std::{collections::BTreeMap, fs, path::Path};

use serde_json::{Map, Value};

use querykit_core::{
    error::{QueryError, QueryResult},
    schema::{FieldType, SchemaProvider, TableSchema},
};

/// A [`SchemaProvider`] over a fixed list of tables.
///
/// # Example
///
/// ```ignore
/// use querykit_mock::MockSchema;
/// use querykit_core::schema::{FieldType, SchemaProvider};
///
/// let schema = MockSchema::default();
/// assert_eq!(schema.field_type_of("Users", "age"), Some(FieldType::Numeric));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSchema {
    tables: Vec<TableSchema>,
}

impl MockSchema {
    /// Creates a schema with no tables.
    pub fn empty() -> Self {
        Self { tables: Vec::new() }
    }

    /// Creates a builder for assembling a schema table by table.
    pub fn builder() -> MockSchemaBuilder {
        MockSchemaBuilder::default()
    }

    /// Loads a schema from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if the file cannot be read or does not
    /// have the expected shape.
    pub fn from_json_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            QueryError::Config(format!("cannot read schema file {}: {}", path.display(), err))
        })?;

        log::debug!("loading schema from {}", path.display());
        Self::from_json_str(&content)
    }

    /// Parses a schema from JSON text.
    pub fn from_json_str(content: &str) -> QueryResult<Self> {
        let root: Map<String, Value> = serde_json::from_str(content)
            .map_err(|err| QueryError::Config(format!("invalid schema JSON: {err}")))?;

        let mut builder = Self::builder();
        for (name, columns) in root {
            let columns: BTreeMap<FieldType, Vec<String>> = serde_json::from_value(columns)
                .map_err(|err| QueryError::Config(format!("invalid columns for table {name}: {err}")))?;

            builder = builder.table(TableSchema { name, columns });
        }

        builder.build()
    }

    /// The tables of this schema, in offer order.
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }
}

impl Default for MockSchema {
    /// The built-in mock: `Users`, `Orders` and `Products` with columns,
    /// `Categories` and `Customers` without any.
    fn default() -> Self {
        Self {
            tables: vec![
                TableSchema::new("Users")
                    .with_columns(FieldType::String, ["username", "email", "first_name", "last_name"])
                    .with_columns(FieldType::Numeric, ["id", "age", "salary"])
                    .with_columns(FieldType::Boolean, ["is_active", "is_verified"])
                    .with_columns(FieldType::Date, ["created_at", "updated_at", "birth_date"]),
                TableSchema::new("Orders")
                    .with_columns(FieldType::String, ["order_number", "status", "shipping_address"])
                    .with_columns(FieldType::Numeric, ["id", "user_id", "total_amount", "quantity"])
                    .with_columns(FieldType::Boolean, ["is_paid", "is_shipped"])
                    .with_columns(FieldType::Date, ["order_date", "shipped_date", "delivery_date"]),
                TableSchema::new("Products")
                    .with_columns(FieldType::String, ["name", "description", "sku", "category"])
                    .with_columns(FieldType::Numeric, ["id", "price", "stock_quantity", "weight"])
                    .with_columns(FieldType::Boolean, ["is_available", "is_featured"])
                    .with_columns(FieldType::Date, ["created_at", "updated_at"]),
                TableSchema::new("Categories"),
                TableSchema::new("Customers"),
            ],
        }
    }
}

impl SchemaProvider for MockSchema {
    fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }

    fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Builder for [`MockSchema`].
#[derive(Debug, Clone, Default)]
pub struct MockSchemaBuilder {
    tables: Vec<TableSchema>,
}

impl MockSchemaBuilder {
    /// Appends a table.
    pub fn table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if a table name is empty or appears twice.
    pub fn build(self) -> QueryResult<MockSchema> {
        for (index, table) in self.tables.iter().enumerate() {
            if table.name.is_empty() {
                return Err(QueryError::Config("table names must not be empty".to_string()));
            }
            if self.tables[..index].iter().any(|other| other.name == table.name) {
                return Err(QueryError::Config(format!("duplicate table {}", table.name)));
            }
        }

        Ok(MockSchema { tables: self.tables })
    }
}
