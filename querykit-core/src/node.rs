//! The query tree model.
//!
//! A query is a tree of [`QueryNode`]s: [`CompositeNode`]s combine their
//! children with a boolean [`LogicalOp`], [`FieldNode`]s compare one column
//! to one value through one [`Operator`].
//!
//! Nodes are never mutated in place. Every edit produces a new node value
//! (`with_*` methods), and [`QueryNode::replace`] rebuilds the path from the
//! root down to the replaced node, so a subtree replacement propagates up to
//! the root the same way an edit callback would.
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::node::{CompositeNode, FieldNode, LogicalOp, QueryNode};
//! use querykit_core::{operator::Operator, schema::FieldType};
//!
//! let age = FieldNode::new()
//!     .with_column("age", Some(FieldType::Numeric))
//!     .with_operator(Some(Operator::GreaterThan))?
//!     .with_value("18");
//!
//! let root = QueryNode::from(CompositeNode::new(LogicalOp::And).with_child(age.into()));
//! assert_eq!(root.to_string(), "(age GREATER_THAN 18)");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{QueryError, QueryResult},
    operator::{InputKind, Operator, input_kind},
    schema::FieldType,
};

/// Generated identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Boolean operator of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
    /// All children must match.
    #[default]
    And,
    /// Any child must match.
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        })
    }
}

/// The two kinds of node a user can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An AND/OR group.
    Composite,
    /// A single field condition.
    Field,
}

/// A leaf condition comparing one column to one value.
///
/// All values are stored as strings regardless of their semantic type. When
/// `is_null` is set the value is ignored and serialized as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: NodeId,
    /// Inferred from the selected column, unknown until one is chosen.
    pub field_type: Option<FieldType>,
    /// Empty until chosen.
    pub column: String,
    pub operator: Option<Operator>,
    pub value: String,
    pub is_null: bool,
}

impl FieldNode {
    /// Creates an empty condition with a fresh id.
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            field_type: None,
            column: String::new(),
            operator: None,
            value: String::new(),
            is_null: false,
        }
    }

    /// Chooses a column.
    ///
    /// The field type is replaced by the given (inferred) type, and the
    /// operator and value are reset since they may not apply to the new type.
    pub fn with_column(self, column: impl Into<String>, field_type: Option<FieldType>) -> Self {
        Self {
            column: column.into(),
            field_type,
            operator: None,
            value: String::new(),
            ..self
        }
    }

    /// Chooses an operator, resetting the value.
    ///
    /// # Errors
    ///
    /// Fails with [`QueryError::ColumnNotSelected`] when no column with a known
    /// field type is set, and with [`QueryError::OperatorNotSupported`] when the
    /// operator does not apply to the field type.
    pub fn with_operator(self, operator: Option<Operator>) -> QueryResult<Self> {
        if let Some(op) = operator {
            let field_type = match self.field_type {
                Some(field_type) if !self.column.is_empty() => field_type,
                _ => return Err(QueryError::ColumnNotSelected),
            };

            if !op.supports(field_type) {
                return Err(QueryError::OperatorNotSupported {
                    operator: op,
                    field_type,
                });
            }
        }

        Ok(Self {
            operator,
            value: String::new(),
            ..self
        })
    }

    /// Sets the value.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self
        }
    }

    /// Sets the is-null flag. The value is kept so unticking restores it.
    pub fn with_null(self, is_null: bool) -> Self {
        Self { is_null, ..self }
    }

    /// Returns `true` when the condition compares against null: either the
    /// flag is set or the operator is a null check.
    pub fn is_null_value(&self) -> bool {
        self.is_null || self.operator.is_some_and(|op| op.is_null_check())
    }

    /// The value as it is serialized, `None` when it is null.
    pub fn effective_value(&self) -> Option<&str> {
        (!self.is_null_value()).then_some(self.value.as_str())
    }
}

impl Default for FieldNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A group combining its children with one boolean operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeNode {
    pub id: NodeId,
    pub operator: LogicalOp,
    pub children: Vec<QueryNode>,
}

impl CompositeNode {
    /// Creates an empty group with a fresh id.
    pub fn new(operator: LogicalOp) -> Self {
        Self {
            id: NodeId::new(),
            operator,
            children: Vec::new(),
        }
    }

    /// Switches between AND and OR.
    pub fn with_logic(self, operator: LogicalOp) -> Self {
        Self { operator, ..self }
    }

    /// Appends a child.
    pub fn with_child(mut self, child: QueryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Replaces the direct child that has the same id as `child`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NodeNotFound`] if no direct child has that id.
    pub fn with_child_replaced(mut self, child: QueryNode) -> QueryResult<Self> {
        let id = child.id();
        let slot = self
            .children
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or(QueryError::NodeNotFound(id))?;
        *slot = child;
        Ok(self)
    }

    /// Removes a direct child.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NodeNotFound`] if no direct child has the id.
    pub fn without_child(self, id: NodeId) -> QueryResult<Self> {
        if !self.children.iter().any(|child| child.id() == id) {
            return Err(QueryError::NodeNotFound(id));
        }

        Ok(Self {
            children: self
                .children
                .into_iter()
                .filter(|child| child.id() != id)
                .collect(),
            ..self
        })
    }
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QueryNode {
    /// A leaf condition.
    Field(FieldNode),
    /// An AND/OR group.
    Composite(CompositeNode),
}

impl From<FieldNode> for QueryNode {
    fn from(node: FieldNode) -> Self {
        QueryNode::Field(node)
    }
}

impl From<CompositeNode> for QueryNode {
    fn from(node: CompositeNode) -> Self {
        QueryNode::Composite(node)
    }
}

impl QueryNode {
    /// Creates a fresh empty node of the given kind. Groups start as AND.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Composite => CompositeNode::new(LogicalOp::And).into(),
            NodeKind::Field => FieldNode::new().into(),
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            QueryNode::Field(node) => node.id,
            QueryNode::Composite(node) => node.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            QueryNode::Field(_) => NodeKind::Field,
            QueryNode::Composite(_) => NodeKind::Composite,
        }
    }

    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            QueryNode::Field(node) => Some(node),
            QueryNode::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeNode> {
        match self {
            QueryNode::Composite(node) => Some(node),
            QueryNode::Field(_) => None,
        }
    }

    /// Finds a node anywhere in this subtree.
    pub fn find(&self, id: NodeId) -> Option<&QueryNode> {
        if self.id() == id {
            return Some(self);
        }

        match self {
            QueryNode::Field(_) => None,
            QueryNode::Composite(node) => node.children.iter().find_map(|child| child.find(id)),
        }
    }

    /// Returns `true` if a node with the id exists in this subtree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Finds the group that directly contains the node.
    pub fn parent_of(&self, id: NodeId) -> Option<&CompositeNode> {
        let QueryNode::Composite(node) = self else {
            return None;
        };

        if node.children.iter().any(|child| child.id() == id) {
            return Some(node);
        }

        node.children.iter().find_map(|child| child.parent_of(id))
    }

    /// All node ids of this subtree, in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id()];
        if let QueryNode::Composite(node) = self {
            ids.extend(node.children.iter().flat_map(QueryNode::ids));
        }
        ids
    }

    /// Number of field conditions in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            QueryNode::Field(_) => 1,
            QueryNode::Composite(node) => node.children.iter().map(QueryNode::leaf_count).sum(),
        }
    }

    /// Nesting depth, a lone node has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            QueryNode::Field(_) => 1,
            QueryNode::Composite(node) => {
                1 + node.children.iter().map(QueryNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Returns a copy of this tree with the node `id` replaced by `replacement`.
    ///
    /// Every group on the path from this node down to the replaced one is
    /// rebuilt. Returns `None` if the id does not occur in the tree.
    pub fn replace(&self, id: NodeId, replacement: &QueryNode) -> Option<QueryNode> {
        if self.id() == id {
            return Some(replacement.clone());
        }

        let QueryNode::Composite(node) = self else {
            return None;
        };

        let (index, child) = node
            .children
            .iter()
            .enumerate()
            .find_map(|(index, child)| child.replace(id, replacement).map(|new| (index, new)))?;

        let mut children = node.children.clone();
        children[index] = child;

        Some(QueryNode::Composite(CompositeNode {
            children,
            ..node.clone()
        }))
    }

    /// Structural equality ignoring node ids.
    ///
    /// Leaves whose value is null compare equal regardless of the stored value
    /// string, since that string is never serialized.
    pub fn same_query(&self, other: &QueryNode) -> bool {
        match (self, other) {
            (QueryNode::Field(a), QueryNode::Field(b)) => {
                a.column == b.column
                    && a.operator == b.operator
                    && a.field_type == b.field_type
                    && a.is_null_value() == b.is_null_value()
                    && a.effective_value() == b.effective_value()
            }
            (QueryNode::Composite(a), QueryNode::Composite(b)) => {
                a.operator == b.operator
                    && a.children.len() == b.children.len()
                    && a.children
                        .iter()
                        .zip(&b.children)
                        .all(|(a, b)| a.same_query(b))
            }
            _ => false,
        }
    }
}

/// Walks a query tree, one callback per node kind.
///
/// Implementors decide whether and in which order to descend into the
/// children of a composite node by calling [`NodeVisitor::visit_node`].
pub trait NodeVisitor {
    type Output;

    fn visit_field(&mut self, node: &FieldNode) -> Self::Output;
    fn visit_composite(&mut self, node: &CompositeNode) -> Self::Output;

    fn visit_node(&mut self, node: &QueryNode) -> Self::Output {
        match node {
            QueryNode::Field(field) => self.visit_field(field),
            QueryNode::Composite(composite) => self.visit_composite(composite),
        }
    }
}

/// Renders a tree as a parenthesized infix expression.
struct InfixFormatter;

impl NodeVisitor for InfixFormatter {
    type Output = String;

    fn visit_field(&mut self, node: &FieldNode) -> String {
        let column = if node.column.is_empty() { "?" } else { node.column.as_str() };

        let Some(op) = node.operator else {
            return format!("{column} ?");
        };

        if op.is_null_check() {
            return format!("{column} {op}");
        }

        match node.effective_value() {
            None => format!("{column} {op} NULL"),
            Some(value) => match input_kind(node.field_type, Some(op)) {
                InputKind::Number | InputKind::BooleanSelect => format!("{column} {op} {value}"),
                InputKind::Text | InputKind::Date => format!("{column} {op} {value:?}"),
            },
        }
    }

    fn visit_composite(&mut self, node: &CompositeNode) -> String {
        let separator = format!(" {} ", node.operator);
        let parts = node
            .children
            .iter()
            .map(|child| self.visit_node(child))
            .collect::<Vec<_>>();

        format!("({})", parts.join(&separator))
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&InfixFormatter.visit_node(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_over(value: &str) -> FieldNode {
        FieldNode::new()
            .with_column("age", Some(FieldType::Numeric))
            .with_operator(Some(Operator::GreaterThan))
            .unwrap()
            .with_value(value)
    }

    fn sample() -> (QueryNode, NodeId, NodeId) {
        let leaf = age_over("18");
        let leaf_id = leaf.id;
        let inner = CompositeNode::new(LogicalOp::Or).with_child(leaf.into());
        let inner_id = inner.id;
        let root = CompositeNode::new(LogicalOp::And)
            .with_child(inner.into())
            .with_child(
                FieldNode::new()
                    .with_column("email", Some(FieldType::String))
                    .with_operator(Some(Operator::IsNull))
                    .unwrap()
                    .into(),
            );

        (root.into(), inner_id, leaf_id)
    }

    #[test]
    fn choosing_a_column_resets_operator_and_value() {
        let node = age_over("18").with_column("created_at", Some(FieldType::Date));

        assert_eq!(node.field_type, Some(FieldType::Date));
        assert_eq!(node.operator, None);
        assert_eq!(node.value, "");
    }

    #[test]
    fn choosing_an_operator_resets_value() {
        let node = age_over("18").with_operator(Some(Operator::LessThan)).unwrap();

        assert_eq!(node.operator, Some(Operator::LessThan));
        assert_eq!(node.value, "");
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        let err = age_over("18").with_operator(Some(Operator::Contains)).unwrap_err();

        assert_eq!(
            err,
            QueryError::OperatorNotSupported {
                operator: Operator::Contains,
                field_type: FieldType::Numeric,
            }
        );
    }

    #[test]
    fn operator_requires_a_column() {
        assert_eq!(
            FieldNode::new().with_operator(Some(Operator::Equals)),
            Err(QueryError::ColumnNotSelected)
        );
        assert!(FieldNode::new().with_operator(None).is_ok());
    }

    #[test]
    fn replace_rebuilds_the_path_to_the_root() {
        let (root, inner_id, leaf_id) = sample();
        let replacement = QueryNode::from(FieldNode {
            id: leaf_id,
            ..age_over("21")
        });

        let updated = root.replace(leaf_id, &replacement).unwrap();

        assert_eq!(updated.id(), root.id());
        assert_eq!(updated.find(leaf_id).unwrap().as_field().unwrap().value, "21");
        assert_eq!(updated.parent_of(leaf_id).unwrap().id, inner_id);
        assert_eq!(root.find(leaf_id).unwrap().as_field().unwrap().value, "18");
        assert!(root.replace(NodeId::new(), &replacement).is_none());
    }

    #[test]
    fn without_child_removes_only_direct_children() {
        let (root, inner_id, leaf_id) = sample();
        let QueryNode::Composite(group) = root else {
            panic!("expected group");
        };

        assert_eq!(
            group.clone().without_child(leaf_id),
            Err(QueryError::NodeNotFound(leaf_id))
        );
        assert_eq!(group.without_child(inner_id).unwrap().children.len(), 1);
    }

    #[test]
    fn with_child_replaced_swaps_by_id() {
        let (root, inner_id, _) = sample();
        let QueryNode::Composite(group) = root else {
            panic!("expected group");
        };
        let emptied = CompositeNode {
            id: inner_id,
            ..CompositeNode::new(LogicalOp::And)
        };

        let updated = group.clone().with_child_replaced(emptied.into()).unwrap();
        assert_eq!(updated.children[0].as_composite().unwrap().children.len(), 0);
        assert_eq!(updated.children[1], group.children[1]);

        let stranger = QueryNode::empty(NodeKind::Field);
        let stranger_id = stranger.id();
        assert_eq!(
            group.with_child_replaced(stranger),
            Err(QueryError::NodeNotFound(stranger_id))
        );
    }

    #[test]
    fn tree_metrics() {
        let (root, inner_id, leaf_id) = sample();

        assert_eq!(root.leaf_count(), 2);
        assert_eq!(root.depth(), 3);
        assert_eq!(root.ids().len(), 4);
        assert_eq!(root.ids()[1], inner_id);
        assert!(root.contains(leaf_id));
    }

    #[test]
    fn display_renders_infix() {
        let (root, _, _) = sample();

        assert_eq!(
            root.to_string(),
            "((age GREATER_THAN 18) AND email IS_NULL)"
        );
        assert_eq!(QueryNode::empty(NodeKind::Field).to_string(), "? ?");
    }

    #[test]
    fn same_query_ignores_ids_and_null_values() {
        let a = age_over("18").with_null(true);
        let b = age_over("18").with_value("null").with_null(true);

        assert!(QueryNode::from(a.clone()).same_query(&b.into()));
        assert!(!QueryNode::from(a).same_query(&age_over("18").into()));
    }

    #[test]
    fn internal_shape_uses_type_tags() {
        let node = QueryNode::from(age_over("18"));
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["type"], "field");
        assert_eq!(value["fieldType"], "NUMERIC");
        assert_eq!(value["operator"], "GREATER_THAN");
        assert_eq!(value["isNull"], false);

        let back: QueryNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }
}
