use querykit::{mock::MockSchema, prelude::*};
use serde_json::json;

fn build_sample() -> QueryNode {
    let mut builder = QueryBuilder::new(MockSchema::default());
    builder.select_table("Users").unwrap();

    let root = builder.start(NodeKind::Composite).unwrap();

    let age = builder.apply(root, NodeEdit::AddCondition).unwrap();
    builder.apply(age, NodeEdit::SetColumn("age".into())).unwrap();
    builder
        .apply(age, NodeEdit::SetOperator(Some(Operator::GreaterEqual)))
        .unwrap();
    builder.apply(age, NodeEdit::SetValue("21".into())).unwrap();

    let group = builder.apply(root, NodeEdit::AddGroup).unwrap();
    builder.apply(group, NodeEdit::SetLogic(LogicalOp::Or)).unwrap();

    let email = builder.apply(group, NodeEdit::AddCondition).unwrap();
    builder.apply(email, NodeEdit::SetColumn("email".into())).unwrap();
    builder
        .apply(email, NodeEdit::SetOperator(Some(Operator::EndsWith)))
        .unwrap();
    builder.apply(email, NodeEdit::SetValue("@example.com".into())).unwrap();

    let verified = builder.apply(group, NodeEdit::AddCondition).unwrap();
    builder
        .apply(verified, NodeEdit::SetColumn("is_verified".into()))
        .unwrap();
    builder
        .apply(verified, NodeEdit::SetOperator(Some(Operator::Equals)))
        .unwrap();
    builder.apply(verified, NodeEdit::SetNull(true)).unwrap();

    let born = builder.apply(group, NodeEdit::AddCondition).unwrap();
    builder
        .apply(born, NodeEdit::SetColumn("birth_date".into()))
        .unwrap();
    builder
        .apply(born, NodeEdit::SetOperator(Some(Operator::Month)))
        .unwrap();
    builder.apply(born, NodeEdit::SetValue("7".into())).unwrap();

    let mut saved = None;
    assert_eq!(
        builder.save(|query| saved = Some(query.clone())).unwrap(),
        SaveOutcome::Saved
    );
    saved.unwrap()
}

#[test]
fn generic_round_trip_preserves_the_query() {
    let original = build_sample();

    let text = to_json_string(&original, TagStyle::Generic).unwrap();
    let decoded = parse_query_json(&text).unwrap();

    assert!(decoded.same_query(&original), "{decoded} != {original}");
    assert!(validate(&decoded).is_valid());
    assert_ne!(decoded.id(), original.id());
}

#[test]
fn typed_round_trip_preserves_the_query() {
    let original = build_sample();

    let value = to_json_value(&original, TagStyle::Typed).unwrap();
    assert_eq!(value["children"][1]["children"][1]["type"], "BoolQuery");
    assert_eq!(value["children"][1]["children"][1]["valueType"], "BOOLEAN");
    assert_eq!(value["children"][1]["children"][1]["value"], serde_json::Value::Null);

    let decoded = from_json_value(&value).unwrap();
    assert!(decoded.same_query(&original));
}

#[test]
fn sample_renders_as_infix() {
    assert_eq!(
        build_sample().to_string(),
        "(age GREATER_EQUAL 21 AND (email ENDS_WITH \"@example.com\" OR is_verified EQUALS NULL OR birth_date MONTH 7))"
    );
}

#[test]
fn loaded_query_can_be_edited_and_saved() {
    let loaded = parse_query_json(
        &json!({
            "type": "AndQuery",
            "children": [
                {"type": "FieldQuery", "column": "age", "operator": "GREATER_THAN", "value": "18", "valueType": "numeric"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    assert!(validate(&loaded).is_valid());

    let root = loaded.id();
    let mut builder = QueryBuilder::new(MockSchema::default()).with_initial(loaded);
    builder.select_table("Users").unwrap();

    let extra = builder.apply(root, NodeEdit::AddCondition).unwrap();
    assert_eq!(builder.save(|_| {}).unwrap(), SaveOutcome::Rejected(1));
    assert!(builder.node_errors().has_errors(extra));

    builder.remove(extra).unwrap();
    assert_eq!(builder.save(|_| {}).unwrap(), SaveOutcome::Saved);
}

#[test]
fn loaded_columns_are_checked_against_the_selected_table() {
    let loaded = parse_query_json(
        r#"{"type":"OrQuery","children":[{"type":"StringQuery","column":"sku","operator":"EQUALS","value":"A-1"}]}"#,
    )
    .unwrap();

    let mut builder = QueryBuilder::new(MockSchema::default()).with_initial(loaded);
    builder.select_table("Users").unwrap();

    assert_eq!(builder.save(|_| {}).unwrap(), SaveOutcome::Rejected(1));
    assert!(builder.validation_errors()[0].ends_with("Column sku does not exist in table Users"));

    let mut builder = QueryBuilder::new(MockSchema::default())
        .with_initial(builder.query().unwrap().clone());
    builder.select_table("Products").unwrap();
    assert_eq!(builder.save(|_| {}).unwrap(), SaveOutcome::Saved);
}

#[test]
fn flat_groups_upgrade_into_valid_trees() {
    let schema = MockSchema::builder()
        .table(
            TableSchema::new("Staff")
                .with_columns(FieldType::String, ["name"])
                .with_columns(FieldType::Numeric, ["age", "salary"]),
        )
        .build()
        .unwrap();

    let mut group = LogicalGroup::default();
    group.nodes[0] = LegacyField {
        column: "salary".into(),
        operator: "greaterThan".into(),
        value: "1000".into(),
        ..group.nodes[0].clone()
    };
    assert!(group.validate().is_empty());

    let upgraded = QueryNode::from(group.upgrade(&schema, "Staff").unwrap());
    assert!(validate(&upgraded).is_valid());
    assert_eq!(
        to_json_value(&upgraded, TagStyle::Generic).unwrap(),
        json!({
            "type": "AndQuery",
            "children": [
                {"type": "FieldQuery", "column": "salary", "operator": "GREATER_THAN", "value": "1000", "valueType": "numeric"}
            ]
        })
    );
}

#[test]
fn loaded_value_type_cannot_override_the_schema() {
    let loaded = parse_query_json(
        r#"{"type":"AndQuery","children":[{"type":"FieldQuery","column":"age","operator":"CONTAINS","value":"1","valueType":"string"}]}"#,
    )
    .unwrap();
    assert!(validate(&loaded).is_valid());

    let mut saved = false;
    let mut builder = QueryBuilder::new(MockSchema::default()).with_initial(loaded);
    builder.select_table("Users").unwrap();

    assert_eq!(builder.save(|_| saved = true).unwrap(), SaveOutcome::Rejected(2));
    assert!(!saved);
    assert!(builder.validation_errors()[0].ends_with("Column age is NUMERIC, not STRING"));
    assert!(
        builder.validation_errors()[1]
            .ends_with("Operator CONTAINS is not supported for NUMERIC fields")
    );
}

#[test]
fn flat_offer_list_does_not_fit_the_built_in_tables() {
    let mut group = LogicalGroup::default();
    group.nodes[0].column = "name".into();
    group.nodes[0].operator = "equals".into();
    group.nodes[0].value = "Ada".into();

    let schema = MockSchema::default();
    assert_eq!(
        group.upgrade(&schema, "Users"),
        Err(QueryError::UnknownColumn("name".into(), "Users".into()))
    );
    assert!(
        schema
            .tables()
            .iter()
            .all(|table| !querykit::legacy::LEGACY_COLUMNS.iter().all(|column| table.has_column(column)))
    );
}
