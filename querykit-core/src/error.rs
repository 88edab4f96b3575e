//! Error types and result types for query building operations.
//!
//! Parse failures, unknown schema references and rejected edits are reported
//! through [`QueryError`]. Validation problems are not errors: they are
//! collected into a [`ValidationReport`](crate::validate::ValidationReport).

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::{node::NodeId, operator::Operator, schema::FieldType};

/// Represents all possible errors that can occur when loading, editing or
/// encoding a query tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The input text is not valid JSON.
    #[error("Invalid JSON format")]
    InvalidJson,
    /// A wire node has no `type` tag.
    #[error("Invalid query format: missing type")]
    MissingType,
    /// A wire node carries a `type` tag that is not a known query kind.
    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),
    /// A wire node is structurally malformed (wrong JSON kind for a member).
    #[error("Invalid query format: {0}")]
    InvalidFormat(String),
    /// An operator name that is not part of the catalog.
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
    /// A value type name that is not a known field type.
    #[error("Invalid value type: {0}")]
    InvalidValueType(String),
    /// The requested table is not known to the schema provider.
    #[error("Table not found: {0}")]
    UnknownTable(String),
    /// The column does not exist in the given table.
    /// The first argument is the column, the second is the table name.
    #[error("Column {0} not found in table {1}")]
    UnknownColumn(String, String),
    /// The operator cannot be applied to the field type of the condition.
    #[error("Operator {operator} is not supported for {field_type} fields")]
    OperatorNotSupported {
        operator: Operator,
        field_type: FieldType,
    },
    /// An operator was chosen before a column.
    #[error("A column must be selected before choosing an operator")]
    ColumnNotSelected,
    /// No node with the given id exists in the tree.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    /// No flat group entry with the given id exists.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    /// The edit only applies to field nodes.
    #[error("Node {0} is not a field condition")]
    NotAField(NodeId),
    /// The edit only applies to composite nodes.
    #[error("Node {0} is not a group")]
    NotAComposite(NodeId),
    /// The root of the tree cannot be removed from within the tree.
    #[error("The root node cannot be removed, use reset instead")]
    CannotRemoveRoot,
    /// A query was started before a table was selected.
    #[error("No table selected")]
    NoTableSelected,
    /// A query tree already exists in the session.
    #[error("A query has already been started")]
    QueryAlreadyStarted,
    /// The session holds no query tree.
    #[error("No query to save")]
    NoQuery,
    /// Encoding the tree to JSON text failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A schema configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for query building operations.
pub type QueryResult<T> = Result<T, QueryError>;

impl From<SerdeJsonError> for QueryError {
    fn from(err: SerdeJsonError) -> Self {
        QueryError::Serialization(err.to_string())
    }
}
