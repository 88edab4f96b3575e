//! Mock schema provider for querykit.
//!
//! This crate provides the hardcoded tables the query builder is demonstrated
//! against, implementing the `SchemaProvider` trait. A JSON file with the same
//! shape can replace the built-in tables.
//!
//! # Quick Start
//!
//! ```ignore
//! use querykit::{prelude::*, mock::MockSchema};
//!
//! let mut builder = QueryBuilder::new(MockSchema::default());
//! builder.select_table("Users")?;
//! builder.start(NodeKind::Composite)?;
//! ```

pub mod schema;

pub use schema::{MockSchema, MockSchemaBuilder};
