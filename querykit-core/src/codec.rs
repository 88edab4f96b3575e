//! Conversion between query trees and the external JSON wire shape.
//!
//! Groups are written as `{"type": "AndQuery" | "OrQuery", "children": [...]}`
//! and conditions as
//! `{"type": <tag>, "column", "operator", "value", "valueType"}`, where the
//! condition tag depends on the [`TagStyle`]: a single generic `FieldQuery`
//! tag, or one tag per field type (`StringQuery`, `NumericQuery`,
//! `BoolQuery`, `DateQuery`). The decoder accepts both dialects.
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::codec::{parse_query_json, to_json_string, TagStyle};
//!
//! let query = parse_query_json(r#"{"type":"AndQuery","children":[]}"#)?;
//! let text = to_json_string(&query, TagStyle::Generic)?;
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{QueryError, QueryResult},
    node::{CompositeNode, FieldNode, LogicalOp, NodeId, NodeVisitor, QueryNode},
    operator::Operator,
    schema::FieldType,
};

/// Stored as a condition's value when the wire value is null.
pub const NULL_SENTINEL: &str = "null";

/// The `type` tag of a wire node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    AndQuery,
    OrQuery,
    FieldQuery,
    StringQuery,
    NumericQuery,
    BoolQuery,
    DateQuery,
}

impl QueryKind {
    const ALL: [QueryKind; 7] = [
        QueryKind::AndQuery,
        QueryKind::OrQuery,
        QueryKind::FieldQuery,
        QueryKind::StringQuery,
        QueryKind::NumericQuery,
        QueryKind::BoolQuery,
        QueryKind::DateQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::AndQuery => "AndQuery",
            QueryKind::OrQuery => "OrQuery",
            QueryKind::FieldQuery => "FieldQuery",
            QueryKind::StringQuery => "StringQuery",
            QueryKind::NumericQuery => "NumericQuery",
            QueryKind::BoolQuery => "BoolQuery",
            QueryKind::DateQuery => "DateQuery",
        }
    }

    /// The per-type condition tag of a field type.
    pub fn for_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => QueryKind::StringQuery,
            FieldType::Numeric => QueryKind::NumericQuery,
            FieldType::Boolean => QueryKind::BoolQuery,
            FieldType::Date => QueryKind::DateQuery,
        }
    }

    /// The field type implied by a per-type condition tag.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            QueryKind::StringQuery => Some(FieldType::String),
            QueryKind::NumericQuery => Some(FieldType::Numeric),
            QueryKind::BoolQuery => Some(FieldType::Boolean),
            QueryKind::DateQuery => Some(FieldType::Date),
            _ => None,
        }
    }

    /// The boolean operator of a group tag.
    pub fn logical_op(&self) -> Option<LogicalOp> {
        match self {
            QueryKind::AndQuery => Some(LogicalOp::And),
            QueryKind::OrQuery => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| QueryError::InvalidQueryType(s.to_string()))
    }
}

/// How condition tags and value types are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// Every condition is tagged `FieldQuery`, `valueType` is lower case.
    #[default]
    Generic,
    /// Conditions are tagged by field type, e.g. `NumericQuery`, and
    /// `valueType` is the upper-case field type.
    Typed,
}

/// A node of the external JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQuery {
    #[serde(rename = "type")]
    pub kind: QueryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WireQuery>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// `Some(None)` is written as an explicit null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// Encodes a tree into the wire shape.
struct WireEncoder {
    style: TagStyle,
}

impl NodeVisitor for WireEncoder {
    type Output = WireQuery;

    fn visit_field(&mut self, node: &FieldNode) -> WireQuery {
        let kind = match (self.style, node.field_type) {
            (TagStyle::Typed, Some(field_type)) => QueryKind::for_field_type(field_type),
            _ => QueryKind::FieldQuery,
        };

        WireQuery {
            kind,
            children: None,
            column: Some(node.column.clone()),
            operator: Some(node.operator.map(|op| op.as_str().to_string()).unwrap_or_default()),
            value: Some(node.effective_value().map(str::to_string)),
            value_type: node.field_type.map(|field_type| match self.style {
                TagStyle::Generic => field_type.wire_name().to_string(),
                TagStyle::Typed => field_type.as_str().to_string(),
            }),
        }
    }

    fn visit_composite(&mut self, node: &CompositeNode) -> WireQuery {
        let kind = match node.operator {
            LogicalOp::And => QueryKind::AndQuery,
            LogicalOp::Or => QueryKind::OrQuery,
        };

        WireQuery {
            kind,
            children: Some(node.children.iter().map(|child| self.visit_node(child)).collect()),
            column: None,
            operator: None,
            value: None,
            value_type: None,
        }
    }
}

/// Encodes a tree into the wire shape.
pub fn encode(node: &QueryNode, style: TagStyle) -> WireQuery {
    WireEncoder { style }.visit_node(node)
}

/// Encodes a tree into a JSON value.
pub fn to_json_value(node: &QueryNode, style: TagStyle) -> QueryResult<Value> {
    Ok(serde_json::to_value(encode(node, style))?)
}

/// Encodes a tree into pretty-printed JSON text (two-space indentation).
pub fn to_json_string(node: &QueryNode, style: TagStyle) -> QueryResult<String> {
    Ok(serde_json::to_string_pretty(&encode(node, style))?)
}

/// Parses wire JSON text into a tree with freshly generated node ids.
///
/// # Errors
///
/// - [`QueryError::InvalidJson`] if the text is not JSON
/// - [`QueryError::MissingType`] if a node has no `type`
/// - [`QueryError::InvalidQueryType`] if a `type` is not a known tag
/// - [`QueryError::InvalidOperator`] / [`QueryError::InvalidValueType`] for
///   unknown operator or value type names
///
/// The JSON parser stops at 128 levels of nesting and every group takes two
/// of them (the object and its `children` array), so trees whose groups nest
/// deeper than about 63 levels are rejected with [`QueryError::InvalidJson`].
pub fn parse_query_json(text: &str) -> QueryResult<QueryNode> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        log::debug!("rejecting query text: {err}");
        QueryError::InvalidJson
    })?;

    from_json_value(&value)
}

/// Converts an already parsed JSON value into a tree.
pub fn from_json_value(value: &Value) -> QueryResult<QueryNode> {
    let object = value
        .as_object()
        .ok_or_else(|| QueryError::InvalidFormat("expected an object".to_string()))?;

    let kind = match object.get("type") {
        None | Some(Value::Null) => return Err(QueryError::MissingType),
        Some(Value::String(tag)) if tag.is_empty() => return Err(QueryError::MissingType),
        Some(Value::String(tag)) => tag.parse::<QueryKind>()?,
        Some(other) => return Err(QueryError::InvalidQueryType(other.to_string())),
    };

    match kind.logical_op() {
        Some(operator) => decode_composite(object, operator),
        None => decode_field(object, kind),
    }
}

fn decode_composite(object: &Map<String, Value>, operator: LogicalOp) -> QueryResult<QueryNode> {
    let children = match object.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(children)) => children
            .iter()
            .map(from_json_value)
            .collect::<QueryResult<Vec<_>>>()?,
        Some(_) => {
            return Err(QueryError::InvalidFormat("children must be an array".to_string()));
        }
    };

    Ok(QueryNode::Composite(CompositeNode {
        id: NodeId::new(),
        operator,
        children,
    }))
}

fn decode_field(object: &Map<String, Value>, kind: QueryKind) -> QueryResult<QueryNode> {
    let column = string_member(object, "column")?;

    let operator = match string_member(object, "operator")?.as_str() {
        "" => None,
        name => Some(name.parse::<Operator>()?),
    };

    let field_type = match string_member(object, "valueType")?.as_str() {
        "" => kind.field_type(),
        name => Some(name.parse::<FieldType>()?),
    };

    let (value, is_null) = match object.get("value") {
        Some(Value::Null) => (NULL_SENTINEL.to_string(), true),
        None => (String::new(), false),
        Some(Value::String(value)) => (value.clone(), false),
        Some(Value::Number(value)) => (value.to_string(), false),
        Some(Value::Bool(value)) => (value.to_string(), false),
        Some(_) => {
            return Err(QueryError::InvalidFormat("value must be a scalar".to_string()));
        }
    };

    Ok(QueryNode::Field(FieldNode {
        id: NodeId::new(),
        field_type,
        column,
        operator,
        value,
        is_null,
    }))
}

/// Reads an optional string member, treating absent and null as empty.
fn string_member(object: &Map<String, Value>, key: &str) -> QueryResult<String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(QueryError::InvalidFormat(format!("{key} must be a string"))),
    }
}
