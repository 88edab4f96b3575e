//! The query builder session.
//!
//! [`QueryBuilder`] owns the single query tree of a page view together with
//! the selected table and the last validation results. Every user interaction
//! maps to one synchronous call: selecting a table, starting a query,
//! applying a [`NodeEdit`] to a node, saving or resetting.
//!
//! Edits never mutate nodes in place. The edited node is rebuilt and the tree
//! is rebuilt along the path to the root, see [`QueryNode::replace`].
//!
//! # Example
//!
//! ```ignore
//! use querykit_core::builder::{NodeEdit, QueryBuilder, SaveOutcome};
//! use querykit_core::node::NodeKind;
//! use querykit_mock::MockSchema;
//!
//! let mut builder = QueryBuilder::new(MockSchema::default());
//! builder.select_table("Users")?;
//! let root = builder.start(NodeKind::Composite)?;
//! let leaf = builder.apply(root, NodeEdit::AddCondition)?;
//! builder.apply(leaf, NodeEdit::SetColumn("age".into()))?;
//! builder.apply(leaf, NodeEdit::SetOperator(Some(Operator::GreaterThan)))?;
//! builder.apply(leaf, NodeEdit::SetValue("18".into()))?;
//!
//! assert_eq!(builder.save(|query| println!("{query}"))?, SaveOutcome::Saved);
//! ```

use crate::{
    codec::{TagStyle, to_json_string},
    error::{QueryError, QueryResult},
    node::{FieldNode, LogicalOp, NodeId, NodeKind, QueryNode},
    operator::{InputKind, Operator, input_kind, operators_for},
    schema::SchemaProvider,
    validate::{ValidationReport, Validator},
};

/// A single user interaction on one node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEdit {
    /// Choose a column of the selected table, empty to clear it.
    SetColumn(String),
    /// Choose an operator offered for the condition's field type.
    SetOperator(Option<Operator>),
    SetValue(String),
    SetNull(bool),
    /// Switch a group between AND and OR.
    SetLogic(LogicalOp),
    /// Append an empty AND group to a group.
    AddGroup,
    /// Append an empty condition to a group.
    AddCondition,
    /// Remove a direct child of a group.
    RemoveChild(NodeId),
}

/// Result of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The tree was valid and handed to the save callback.
    Saved,
    /// Validation failed with the given number of messages. The callback was
    /// not invoked and the tree is unchanged.
    Rejected(usize),
}

/// The state behind the query builder page.
#[derive(Debug)]
pub struct QueryBuilder<P: SchemaProvider> {
    provider: P,
    selected_table: Option<String>,
    query: Option<QueryNode>,
    validation_errors: Vec<String>,
    node_errors: ValidationReport,
    tag_style: TagStyle,
}

impl<P: SchemaProvider> QueryBuilder<P> {
    /// Creates a session with no table and no query.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            selected_table: None,
            query: None,
            validation_errors: Vec::new(),
            node_errors: ValidationReport::default(),
            tag_style: TagStyle::Typed,
        }
    }

    /// Seeds the session with an existing tree, e.g. one loaded from JSON.
    pub fn with_initial(mut self, query: QueryNode) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the condition tag dialect of [`QueryBuilder::json_output`].
    pub fn with_tag_style(mut self, style: TagStyle) -> Self {
        self.tag_style = style;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    /// The current tree, if a query was started.
    pub fn query(&self) -> Option<&QueryNode> {
        self.query.as_ref()
    }

    /// The `"{id}: {message}"` lines of the last save attempt.
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    /// Per-node messages of the last validation.
    pub fn node_errors(&self) -> &ValidationReport {
        &self.node_errors
    }

    /// Tables offered in the table selector.
    pub fn available_tables(&self) -> Vec<&str> {
        self.provider.table_names()
    }

    /// Columns of the selected table, empty until a table is selected.
    pub fn available_columns(&self) -> Vec<&str> {
        self.selected_table
            .as_deref()
            .map(|table| self.provider.columns(table))
            .unwrap_or_default()
    }

    /// Operators offered for a condition, empty until its field type is known.
    pub fn available_operators(&self, id: NodeId) -> QueryResult<Vec<Operator>> {
        let field = self.field(id)?;
        Ok(field.field_type.map(operators_for).unwrap_or_default())
    }

    /// The input widget used for a condition's value.
    pub fn value_input(&self, id: NodeId) -> QueryResult<InputKind> {
        let field = self.field(id)?;
        Ok(input_kind(field.field_type, field.operator))
    }

    /// Selects the table queries are built against.
    pub fn select_table(&mut self, table: &str) -> QueryResult<()> {
        if !self.provider.has_table(table) {
            return Err(QueryError::UnknownTable(table.to_string()));
        }

        log::debug!("selected table {table}");
        self.selected_table = Some(table.to_string());
        Ok(())
    }

    /// Starts a new query with an empty root of the given kind.
    pub fn start(&mut self, kind: NodeKind) -> QueryResult<NodeId> {
        if self.selected_table.is_none() {
            return Err(QueryError::NoTableSelected);
        }
        if self.query.is_some() {
            return Err(QueryError::QueryAlreadyStarted);
        }

        let root = QueryNode::empty(kind);
        let id = root.id();
        log::debug!("started {kind:?} query {id}");
        self.query = Some(root);
        Ok(id)
    }

    /// Applies one edit to the node `id`.
    ///
    /// Returns the id of the node the edit produced: the new child for
    /// [`NodeEdit::AddGroup`] and [`NodeEdit::AddCondition`], otherwise `id`.
    pub fn apply(&mut self, id: NodeId, edit: NodeEdit) -> QueryResult<NodeId> {
        let root = self.query.as_ref().ok_or(QueryError::NoQuery)?;
        let node = root.find(id).ok_or(QueryError::NodeNotFound(id))?;
        log::trace!("applying {edit:?} to {id}");

        let (replacement, produced) = match (node, edit) {
            (QueryNode::Field(field), NodeEdit::SetColumn(column)) => {
                let field_type = if column.is_empty() {
                    None
                } else {
                    let table = self
                        .selected_table
                        .as_deref()
                        .ok_or(QueryError::NoTableSelected)?;
                    Some(
                        self.provider
                            .field_type_of(table, &column)
                            .ok_or_else(|| QueryError::UnknownColumn(column.clone(), table.to_string()))?,
                    )
                };
                (field.clone().with_column(column, field_type).into(), id)
            }
            (QueryNode::Field(field), NodeEdit::SetOperator(operator)) => {
                (field.clone().with_operator(operator)?.into(), id)
            }
            (QueryNode::Field(field), NodeEdit::SetValue(value)) => {
                (field.clone().with_value(value).into(), id)
            }
            (QueryNode::Field(field), NodeEdit::SetNull(is_null)) => {
                (field.clone().with_null(is_null).into(), id)
            }
            (QueryNode::Composite(group), NodeEdit::SetLogic(operator)) => {
                (group.clone().with_logic(operator).into(), id)
            }
            (QueryNode::Composite(group), NodeEdit::AddGroup) => {
                let child = QueryNode::empty(NodeKind::Composite);
                let child_id = child.id();
                (group.clone().with_child(child).into(), child_id)
            }
            (QueryNode::Composite(group), NodeEdit::AddCondition) => {
                let child = QueryNode::empty(NodeKind::Field);
                let child_id = child.id();
                (group.clone().with_child(child).into(), child_id)
            }
            (QueryNode::Composite(group), NodeEdit::RemoveChild(child)) => {
                (group.clone().without_child(child)?.into(), id)
            }
            (QueryNode::Field(_), _) => return Err(QueryError::NotAComposite(id)),
            (QueryNode::Composite(_), _) => return Err(QueryError::NotAField(id)),
        };

        let updated = root
            .replace(id, &replacement)
            .ok_or(QueryError::NodeNotFound(id))?;
        self.query = Some(updated);
        Ok(produced)
    }

    /// Removes a node from its parent group.
    pub fn remove(&mut self, id: NodeId) -> QueryResult<()> {
        let root = self.query.as_ref().ok_or(QueryError::NoQuery)?;
        if root.id() == id {
            return Err(QueryError::CannotRemoveRoot);
        }

        let parent = root.parent_of(id).ok_or(QueryError::NodeNotFound(id))?.id;
        self.apply(parent, NodeEdit::RemoveChild(id))?;
        Ok(())
    }

    /// The generated wire JSON of the current tree, empty without a tree.
    pub fn json_output(&self) -> QueryResult<String> {
        match &self.query {
            Some(query) => to_json_string(query, self.tag_style),
            None => Ok(String::new()),
        }
    }

    /// Validates the current tree and records the per-node messages.
    pub fn validate(&mut self) -> QueryResult<&ValidationReport> {
        let query = self.query.as_ref().ok_or(QueryError::NoQuery)?;

        let validator = match self.selected_table.as_deref() {
            Some(table) => Validator::with_schema(&self.provider, table),
            None => Validator::new(),
        };
        self.node_errors = validator.validate(query);
        Ok(&self.node_errors)
    }

    /// Validates the tree and, if it is valid, hands it to `on_save`.
    ///
    /// Without a tree the error list becomes `["No query to save"]` and the
    /// save is rejected.
    pub fn save<F>(&mut self, on_save: F) -> QueryResult<SaveOutcome>
    where
        F: FnOnce(&QueryNode),
    {
        if self.query.is_none() {
            self.validation_errors = vec![QueryError::NoQuery.to_string()];
            return Ok(SaveOutcome::Rejected(1));
        }

        let messages = self.validate()?.messages();
        self.validation_errors = messages;

        if !self.validation_errors.is_empty() {
            log::debug!("save rejected with {} error(s)", self.validation_errors.len());
            return Ok(SaveOutcome::Rejected(self.validation_errors.len()));
        }

        if let Some(query) = &self.query {
            log::info!("saving query {}", query.id());
            on_save(query);
        }
        Ok(SaveOutcome::Saved)
    }

    /// Discards the tree and all validation results. The table stays selected.
    pub fn reset(&mut self) {
        self.query = None;
        self.validation_errors.clear();
        self.node_errors = ValidationReport::default();
    }

    fn field(&self, id: NodeId) -> QueryResult<&FieldNode> {
        self.query
            .as_ref()
            .and_then(|root| root.find(id))
            .ok_or(QueryError::NodeNotFound(id))?
            .as_field()
            .ok_or(QueryError::NotAField(id))
    }
}
