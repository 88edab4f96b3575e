//! Convenient re-exports of commonly used types from querykit.
//!
//! ```ignore
//! use querykit::prelude::*;
//! ```

pub use querykit_core::{
    builder::{NodeEdit, QueryBuilder, SaveOutcome},
    codec::{TagStyle, WireQuery, encode, from_json_value, parse_query_json, to_json_string, to_json_value},
    error::{QueryError, QueryResult},
    legacy::{LegacyField, LogicalGroup},
    node::{CompositeNode, FieldNode, LogicalOp, NodeId, NodeKind, NodeVisitor, QueryNode},
    operator::{InputKind, Operator, OperatorSpec, catalog, input_kind, operators_for},
    schema::{FieldType, SchemaProvider, TableSchema},
    validate::{ValidationReport, Validator, validate},
};
