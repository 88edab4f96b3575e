//! Recursive validation of query trees.
//!
//! Validation never fails: it walks the whole tree and collects human-readable
//! messages per node id into a [`ValidationReport`]. A tree is well-formed when
//! the report is empty, i.e. every group has at least one child and every
//! condition has a column, an operator and (unless it compares against null)
//! a value that fits the condition's input widget.
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::{node::{QueryNode, NodeKind}, validate::validate};
//!
//! let report = validate(&QueryNode::empty(NodeKind::Composite));
//! assert_eq!(report.error_count(), 1);
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::{
    node::{CompositeNode, FieldNode, NodeId, NodeVisitor, QueryNode},
    operator::{InputKind, Operator, input_kind},
    schema::{FieldType, SchemaProvider},
};

pub const EMPTY_GROUP: &str = "Composite query must have at least one child condition";
pub const MISSING_COLUMN: &str = "Column must be selected";
pub const MISSING_OPERATOR: &str = "Operator must be selected";
pub const MISSING_VALUE: &str = "Value is required (or check \"Is Null\" if intended)";

/// The messages collected for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeErrors {
    pub id: NodeId,
    pub messages: Vec<String>,
}

/// Per-node validation messages, in tree traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    entries: Vec<NodeErrors>,
}

impl ValidationReport {
    /// Returns `true` when no node has any message.
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages over all nodes.
    pub fn error_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.messages.len()).sum()
    }

    /// The messages recorded for a node, empty if it has none.
    pub fn errors_for(&self, id: NodeId) -> &[String] {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.messages.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if the node has at least one message.
    pub fn has_errors(&self, id: NodeId) -> bool {
        !self.errors_for(id).is_empty()
    }

    /// Iterates over the nodes that have messages.
    pub fn iter(&self) -> impl Iterator<Item = &NodeErrors> {
        self.entries.iter()
    }

    /// Flat `"{id}: {message}"` lines, as listed in the error box.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .messages
                    .iter()
                    .map(move |message| format!("{}: {}", entry.id, message))
            })
            .collect()
    }

    /// The messages keyed by node id.
    pub fn to_map(&self) -> HashMap<NodeId, Vec<String>> {
        self.entries
            .iter()
            .map(|entry| (entry.id, entry.messages.clone()))
            .collect()
    }

    fn record(&mut self, id: NodeId, messages: Vec<String>) {
        if !messages.is_empty() {
            self.entries.push(NodeErrors { id, messages });
        }
    }
}

/// Walks a tree and collects a [`ValidationReport`].
///
/// A validator built with [`Validator::with_schema`] additionally checks that
/// every chosen column exists in the selected table.
#[derive(Default)]
pub struct Validator<'a> {
    schema: Option<(&'a dyn SchemaProvider, &'a str)>,
    report: ValidationReport,
}

impl<'a> Validator<'a> {
    /// Creates a validator checking structure and values only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that also resolves columns against a table.
    pub fn with_schema(provider: &'a dyn SchemaProvider, table: &'a str) -> Self {
        Self {
            schema: Some((provider, table)),
            report: ValidationReport::default(),
        }
    }

    /// Validates the tree rooted at `node`.
    pub fn validate(mut self, node: &QueryNode) -> ValidationReport {
        self.visit_node(node);
        log::debug!(
            "validated query {}: {} error(s)",
            node.id(),
            self.report.error_count()
        );
        self.report
    }

    fn value_error(value: &str, field_type: Option<FieldType>, op: Operator) -> Option<String> {
        let value = value.trim();

        match op {
            Operator::DayOfWeek => {
                return match value.parse::<u8>() {
                    Ok(1..=7) => None,
                    _ => Some("Day of week must be a number between 1 and 7".to_string()),
                };
            }
            Operator::Month => {
                return match value.parse::<u8>() {
                    Ok(1..=12) => None,
                    _ => Some("Month must be a number between 1 and 12".to_string()),
                };
            }
            Operator::Year => {
                return match value.parse::<i32>() {
                    Ok(_) => None,
                    Err(_) => Some("Year must be a whole number".to_string()),
                };
            }
            _ => {}
        }

        match input_kind(field_type, Some(op)) {
            InputKind::Text => None,
            InputKind::Number => (!value.parse::<f64>().is_ok_and(f64::is_finite))
                .then(|| "Value must be a number".to_string()),
            InputKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .is_err()
                .then(|| "Value must be a date (YYYY-MM-DD)".to_string()),
            InputKind::BooleanSelect => (!matches!(value, "true" | "false"))
                .then(|| "Value must be true or false".to_string()),
        }
    }
}

impl NodeVisitor for Validator<'_> {
    type Output = ();

    fn visit_field(&mut self, node: &FieldNode) {
        let mut messages = Vec::new();
        let mut field_type = node.field_type;

        if node.column.is_empty() {
            messages.push(MISSING_COLUMN.to_string());
        } else {
            if let Some((provider, table)) = self.schema {
                match provider.field_type_of(table, &node.column) {
                    None => messages.push(format!(
                        "Column {} does not exist in table {}",
                        node.column, table
                    )),
                    Some(declared) => {
                        let carried = node.field_type.filter(|carried| *carried != declared);
                        if let Some(carried) = carried {
                            messages.push(format!(
                                "Column {} is {}, not {}",
                                node.column, declared, carried
                            ));
                        }
                        // The table decides what the column holds.
                        field_type = Some(declared);
                    }
                }
            }

            if node.operator.is_none() {
                messages.push(MISSING_OPERATOR.to_string());
            }
        }

        if let Some(op) = node.operator {
            if let Some(field_type) = field_type {
                if !op.supports(field_type) {
                    messages.push(format!(
                        "Operator {} is not supported for {} fields",
                        op, field_type
                    ));
                }
            }

            if op.takes_value() && !node.is_null {
                if node.value.is_empty() {
                    messages.push(MISSING_VALUE.to_string());
                } else if let Some(message) = Self::value_error(&node.value, field_type, op) {
                    messages.push(message);
                }
            }
        }

        self.report.record(node.id, messages);
    }

    fn visit_composite(&mut self, node: &CompositeNode) {
        if node.children.is_empty() {
            self.report.record(node.id, vec![EMPTY_GROUP.to_string()]);
            return;
        }

        for child in &node.children {
            self.visit_node(child);
        }
    }
}

/// Validates a tree without a schema.
pub fn validate(node: &QueryNode) -> ValidationReport {
    Validator::new().validate(node)
}
