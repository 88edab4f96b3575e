//! The logical core of a visual query builder.
//!
//! This crate is the core of the querykit project and provides:
//!
//! - **Schema abstraction** ([`schema`]) - Field types, table schemas and the provider trait
//! - **Operator catalog** ([`operator`]) - Comparison operators and their type compatibility
//! - **Query tree model** ([`node`]) - Composite and field nodes, whole-node edits, visitors
//! - **Validation** ([`validate`]) - Recursive per-node validation reports
//! - **Wire codec** ([`codec`]) - Encoding to and decoding from the external JSON shape
//! - **Builder session** ([`builder`]) - The state machine behind the builder page
//! - **Flat groups** ([`legacy`]) - The single-level group editor and its upgrade path
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::{codec::parse_query_json, validate::validate};
//!
//! let query = parse_query_json(r#"{
//!     "type": "AndQuery",
//!     "children": [
//!         {"type": "FieldQuery", "column": "age", "operator": "GREATER_THAN",
//!          "value": "18", "valueType": "numeric"}
//!     ]
//! }"#)?;
//!
//! assert!(validate(&query).is_valid());
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod legacy;
pub mod node;
pub mod operator;
pub mod schema;
pub mod validate;
