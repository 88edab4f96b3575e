//! The flat logical group editor.
//!
//! Before the recursive tree, queries were a single AND/OR [`LogicalGroup`]
//! holding a flat list of [`LegacyField`] entries with free-form operator
//! names from a fixed offer list. Groups of this shape can still be edited,
//! validated, and upgraded into a [`CompositeNode`] of the recursive model.

use serde::{Deserialize, Serialize};

use crate::{
    error::{QueryError, QueryResult},
    node::{CompositeNode, FieldNode, LogicalOp, NodeId, QueryNode},
    operator::Operator,
    schema::SchemaProvider,
    validate::{MISSING_COLUMN, MISSING_OPERATOR, MISSING_VALUE},
};

/// Columns offered by the flat editor.
///
/// They describe a staff table with a `name`, an `age` and a `salary`. None of
/// the built-in mock tables declares all three, so upgrading a group that uses
/// them needs a provider with such a table.
pub const LEGACY_COLUMNS: [&str; 3] = ["name", "age", "salary"];

/// Operator names offered by the flat editor.
pub const LEGACY_OPERATORS: [&str; 3] = ["equals", "greaterThan", "lessThan"];

/// One condition of a flat group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyField {
    pub id: String,
    pub column: String,
    pub operator: String,
    pub value: String,
    pub is_null: bool,
}

impl LegacyField {
    /// Creates an empty entry with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            column: String::new(),
            operator: String::new(),
            value: String::new(),
            is_null: false,
        }
    }
}

/// A single AND/OR group with a flat list of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalGroup {
    #[serde(rename = "type")]
    pub operator: LogicalOp,
    pub nodes: Vec<LegacyField>,
}

impl Default for LogicalGroup {
    /// An AND group with one empty entry, as the page opens.
    fn default() -> Self {
        Self::new(LogicalOp::And)
    }
}

impl LogicalGroup {
    /// Creates a group holding one empty entry with id `"1"`.
    pub fn new(operator: LogicalOp) -> Self {
        Self {
            operator,
            nodes: vec![LegacyField::new("1")],
        }
    }

    /// Appends an empty entry and returns its id.
    pub fn add_node(&mut self) -> String {
        let id = NodeId::new().to_string();
        self.nodes.push(LegacyField::new(id.clone()));
        id
    }

    /// Replaces the entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EntryNotFound`] if no entry has the id.
    pub fn update_node(&mut self, node: LegacyField) -> QueryResult<()> {
        let slot = self
            .nodes
            .iter_mut()
            .find(|existing| existing.id == node.id)
            .ok_or_else(|| QueryError::EntryNotFound(node.id.clone()))?;
        *slot = node;
        Ok(())
    }

    /// Removes the entry with the given id, returning whether it existed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != id);
        self.nodes.len() != before
    }

    /// Validates every entry with the same per-condition rules as the tree
    /// validator. Returns `(entry id, messages)` for entries with problems.
    pub fn validate(&self) -> Vec<(String, Vec<String>)> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let mut messages = Vec::new();
                if node.column.is_empty() {
                    messages.push(MISSING_COLUMN.to_string());
                } else if node.operator.is_empty() {
                    messages.push(MISSING_OPERATOR.to_string());
                }
                if !node.operator.is_empty() && !node.is_null && node.value.is_empty() {
                    messages.push(MISSING_VALUE.to_string());
                }

                (!messages.is_empty()).then(|| (node.id.clone(), messages))
            })
            .collect()
    }

    /// Converts the group into a composite node of the recursive model.
    ///
    /// Operator names are mapped onto the catalog (`equals` → `EQUALS`,
    /// `greaterThan` → `GREATER_THAN`, ...) and field types are inferred from
    /// the table. Unset columns and operators stay unset.
    ///
    /// # Errors
    ///
    /// Fails if the table is unknown, a column does not exist in it, or an
    /// operator name has no catalog counterpart. The columns of
    /// [`LEGACY_COLUMNS`] are not all present in any built-in mock table
    /// (`Users` has `age` and `salary` but no `name`), so a group using the full
    /// offer list only upgrades against a table that declares all of them.
    pub fn upgrade(&self, provider: &dyn SchemaProvider, table: &str) -> QueryResult<CompositeNode> {
        if !provider.has_table(table) {
            return Err(QueryError::UnknownTable(table.to_string()));
        }

        let children = self
            .nodes
            .iter()
            .map(|node| -> QueryResult<QueryNode> {
                let field_type = match node.column.as_str() {
                    "" => None,
                    column => Some(
                        provider
                            .field_type_of(table, column)
                            .ok_or_else(|| QueryError::UnknownColumn(column.to_string(), table.to_string()))?,
                    ),
                };

                let operator = match node.operator.as_str() {
                    "" => None,
                    name => Some(legacy_operator(name)?),
                };

                Ok(QueryNode::Field(FieldNode {
                    id: NodeId::new(),
                    field_type,
                    column: node.column.clone(),
                    operator,
                    value: node.value.clone(),
                    is_null: node.is_null,
                }))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        log::debug!("upgraded flat group with {} entries", children.len());

        Ok(CompositeNode {
            id: NodeId::new(),
            operator: self.operator,
            children,
        })
    }
}

/// Maps a camelCase operator name onto the catalog.
fn legacy_operator(name: &str) -> QueryResult<Operator> {
    let mut wire = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() && !wire.is_empty() {
            wire.push('_');
        }
        wire.push(c.to_ascii_uppercase());
    }

    wire.parse::<Operator>()
        .map_err(|_| QueryError::InvalidOperator(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, TableSchema};

    #[derive(Debug)]
    struct Staff(TableSchema);

    impl SchemaProvider for Staff {
        fn table_names(&self) -> Vec<&str> {
            vec!["Staff"]
        }

        fn table(&self, name: &str) -> Option<&TableSchema> {
            (name == "Staff").then_some(&self.0)
        }
    }

    fn staff() -> Staff {
        Staff(
            TableSchema::new("Staff")
                .with_columns(FieldType::String, ["name"])
                .with_columns(FieldType::Numeric, ["age", "salary"]),
        )
    }

    #[test]
    fn opens_with_one_empty_entry() {
        let group = LogicalGroup::default();

        assert_eq!(group.operator, LogicalOp::And);
        assert_eq!(group.nodes, vec![LegacyField::new("1")]);
        assert_eq!(group.validate(), vec![("1".to_string(), vec![MISSING_COLUMN.to_string()])]);
    }

    #[test]
    fn add_update_remove() {
        let mut group = LogicalGroup::default();
        let id = group.add_node();

        group
            .update_node(LegacyField {
                column: "age".to_string(),
                operator: "greaterThan".to_string(),
                value: "30".to_string(),
                ..LegacyField::new(id.clone())
            })
            .unwrap();
        assert_eq!(
            group.update_node(LegacyField::new("missing")),
            Err(QueryError::EntryNotFound("missing".to_string()))
        );
        assert_eq!(
            QueryError::EntryNotFound("missing".to_string()).to_string(),
            "Entry not found: missing"
        );

        assert!(group.remove_node("1"));
        assert!(!group.remove_node("1"));
        assert!(group.validate().is_empty());
    }

    #[test]
    fn upgrade_maps_operators_and_infers_types() {
        let group = LogicalGroup {
            operator: LogicalOp::Or,
            nodes: vec![
                LegacyField {
                    column: "salary".to_string(),
                    operator: "lessThan".to_string(),
                    value: "5000".to_string(),
                    ..LegacyField::new("1")
                },
                LegacyField {
                    column: "name".to_string(),
                    operator: "equals".to_string(),
                    is_null: true,
                    ..LegacyField::new("2")
                },
            ],
        };

        let upgraded = group.upgrade(&staff(), "Staff").unwrap();

        assert_eq!(upgraded.operator, LogicalOp::Or);
        let salary = upgraded.children[0].as_field().unwrap();
        assert_eq!(salary.operator, Some(Operator::LessThan));
        assert_eq!(salary.field_type, Some(FieldType::Numeric));
        let name = upgraded.children[1].as_field().unwrap();
        assert_eq!(name.operator, Some(Operator::Equals));
        assert!(name.is_null);
    }

    #[test]
    fn upgrade_rejects_unknown_names() {
        let mut group = LogicalGroup::default();
        group.nodes[0].column = "bonus".to_string();

        assert_eq!(
            group.upgrade(&staff(), "Staff"),
            Err(QueryError::UnknownColumn("bonus".to_string(), "Staff".to_string()))
        );

        group.nodes[0].column = "age".to_string();
        group.nodes[0].operator = "between".to_string();
        assert_eq!(
            group.upgrade(&staff(), "Staff"),
            Err(QueryError::InvalidOperator("between".to_string()))
        );
        assert_eq!(
            group.upgrade(&staff(), "Payroll"),
            Err(QueryError::UnknownTable("Payroll".to_string()))
        );
    }

    #[test]
    fn offer_lists_map_onto_the_catalog() {
        for name in LEGACY_OPERATORS {
            assert!(legacy_operator(name).is_ok(), "{name}");
        }
        for column in LEGACY_COLUMNS {
            assert!(staff().field_type_of("Staff", column).is_some());
        }
    }
}
