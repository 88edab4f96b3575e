//! Main querykit crate providing the logical core of a visual query builder.
//!
//! This crate is the primary entry point for users of querykit. It re-exports
//! the core types and functionality from the sub-crates and provides access to
//! the mock schema.
//!
//! # Features
//!
//! - **Nested boolean queries** - AND/OR groups of field conditions, edited by whole-node replacement
//! - **Schema-aware editing** - Field types inferred from columns, operators filtered by field type
//! - **Validation** - Per-node error reports that block saving without raising errors
//! - **JSON round trip** - Encoding to and decoding from the `AndQuery`/`OrQuery`/`FieldQuery` shape
//!
//! # Quick Start
//!
//! ```ignore
//! use querykit::{prelude::*, mock::MockSchema};
//!
//! let mut builder = QueryBuilder::new(MockSchema::default());
//! builder.select_table("Users")?;
//!
//! let root = builder.start(NodeKind::Composite)?;
//! let leaf = builder.apply(root, NodeEdit::AddCondition)?;
//! builder.apply(leaf, NodeEdit::SetColumn("age".into()))?;
//! builder.apply(leaf, NodeEdit::SetOperator(Some(Operator::GreaterThan)))?;
//! builder.apply(leaf, NodeEdit::SetValue("18".into()))?;
//!
//! println!("{}", builder.json_output()?);
//!
//! builder.save(|query| println!("Query saved: {query}"))?;
//! ```
//!
//! # Loading
//!
//! Existing queries are parsed from their JSON text and handed to a builder
//! for further editing:
//!
//! ```ignore
//! use querykit::{prelude::*, mock::MockSchema};
//!
//! let query = parse_query_json(text)?;
//! let mut builder = QueryBuilder::new(MockSchema::default()).with_initial(query);
//! ```

pub mod prelude;

pub use querykit_core::{builder, codec, error, legacy, node, operator, schema, validate};

/// Mock schema provider.
pub mod mock {
    pub use querykit_mock::{MockSchema, MockSchemaBuilder};
}
