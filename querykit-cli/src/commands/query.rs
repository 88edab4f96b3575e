use anyhow::bail;
use log::info;
use querykit::{mock::MockSchema, prelude::*};

use super::read_input;

pub fn load(schema: &MockSchema, input: &str, table: Option<&str>) -> anyhow::Result<()> {
    let query = parse_query_json(&read_input(input)?)?;

    println!("{query}");
    println!(
        "{} condition(s), depth {}",
        query.leaf_count(),
        query.depth()
    );

    let report = match table {
        Some(table) => {
            if !schema.has_table(table) {
                bail!(QueryError::UnknownTable(table.to_string()));
            }
            Validator::with_schema(schema, table).validate(&query)
        }
        None => validate(&query),
    };

    if report.is_valid() {
        println!("Query is valid");
    } else {
        for message in report.messages() {
            println!("  {message}");
        }
    }

    Ok(())
}

pub fn save(schema: MockSchema, input: &str, table: Option<&str>) -> anyhow::Result<()> {
    let query = parse_query_json(&read_input(input)?)?;

    let mut builder = QueryBuilder::new(schema).with_initial(query);
    if let Some(table) = table {
        builder.select_table(table)?;
    }

    let mut saved = None;
    let outcome = builder.save(|query| {
        info!("Query saved: {query}");
        saved = Some(serde_json::to_string_pretty(query));
    })?;

    match (outcome, saved) {
        (SaveOutcome::Saved, Some(json)) => {
            println!("{}", json?);
            Ok(())
        }
        (SaveOutcome::Rejected(count), _) => {
            for message in builder.validation_errors() {
                eprintln!("  {message}");
            }
            bail!("Query rejected with {count} validation error(s)")
        }
        (SaveOutcome::Saved, None) => bail!("Save handler was not invoked"),
    }
}

pub fn encode(input: &str, typed: bool) -> anyhow::Result<()> {
    let query = parse_query_json(&read_input(input)?)?;
    let style = if typed { TagStyle::Typed } else { TagStyle::Generic };

    println!("{}", to_json_string(&query, style)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const AGE_OVER_18: &str = r#"{"type":"AndQuery","children":[{"type":"FieldQuery","column":"age","operator":"GREATER_THAN","value":"18","valueType":"numeric"}]}"#;

    fn fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn path(file: &NamedTempFile) -> &str {
        file.path().to_str().unwrap()
    }

    #[test]
    fn save_accepts_a_valid_query() {
        let file = fixture(AGE_OVER_18);

        assert!(save(MockSchema::default(), path(&file), Some("Users")).is_ok());
    }

    #[test]
    fn save_rejects_an_empty_group() {
        let file = fixture(r#"{"type":"OrQuery","children":[]}"#);

        let err = save(MockSchema::default(), path(&file), None).unwrap_err();
        assert_eq!(err.to_string(), "Query rejected with 1 validation error(s)");
    }

    #[test]
    fn save_rejects_malformed_json() {
        let file = fixture("{\"type\": \"AndQuery\",");

        let err = save(MockSchema::default(), path(&file), Some("Users")).unwrap_err();
        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::InvalidJson));
    }

    #[test]
    fn save_rejects_columns_missing_from_the_table() {
        let file = fixture(AGE_OVER_18);

        assert!(save(MockSchema::default(), path(&file), Some("Products")).is_err());
    }

    #[test]
    fn save_rejects_an_unknown_table() {
        let file = fixture(AGE_OVER_18);

        let err = save(MockSchema::default(), path(&file), Some("Invoices")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<QueryError>(),
            Some(&QueryError::UnknownTable("Invoices".to_string()))
        );
    }

    #[test]
    fn load_reports_invalid_trees_without_failing() {
        let file = fixture(r#"{"type":"AndQuery","children":[{"type":"FieldQuery"}]}"#);

        assert!(load(&MockSchema::default(), path(&file), None).is_ok());
    }

    #[test]
    fn load_fails_on_unknown_query_types() {
        let file = fixture(r#"{"type":"XorQuery","children":[]}"#);

        let err = load(&MockSchema::default(), path(&file), None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<QueryError>(),
            Some(&QueryError::InvalidQueryType("XorQuery".to_string()))
        );
    }

    #[test]
    fn load_fails_on_an_unknown_table() {
        let file = fixture(AGE_OVER_18);

        assert!(load(&MockSchema::default(), path(&file), Some("Invoices")).is_err());
    }

    #[test]
    fn encode_fails_on_missing_type_and_missing_files() {
        let file = fixture(r#"{"children":[]}"#);

        let err = encode(path(&file), true).unwrap_err();
        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::MissingType));

        let missing = file.path().with_extension("missing");
        assert!(encode(missing.to_str().unwrap(), false).is_err());
        assert!(encode(path(&fixture(AGE_OVER_18)), true).is_ok());
    }
}
