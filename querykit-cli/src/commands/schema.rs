use querykit::{mock::MockSchema, prelude::*};

pub fn list_tables(schema: &MockSchema) -> anyhow::Result<()> {
    for table in schema.tables() {
        println!("{:<16} {} column(s)", table.name, table.columns().len());
    }

    Ok(())
}

pub fn list_columns(schema: &MockSchema, table: &str) -> anyhow::Result<()> {
    let table = schema
        .table(table)
        .ok_or_else(|| QueryError::UnknownTable(table.to_string()))?;

    for field_type in FieldType::ALL {
        let columns = table.columns_of(field_type);
        if !columns.is_empty() {
            println!("{:<8} {}", field_type, columns.join(", "));
        }
    }

    Ok(())
}

pub fn list_operators(field_type: Option<&str>) -> anyhow::Result<()> {
    let field_type = field_type.map(str::parse::<FieldType>).transpose()?;

    for spec in catalog() {
        if field_type.is_some_and(|field_type| !spec.operator.supports(field_type)) {
            continue;
        }

        let applies_to = spec
            .supported_field_types
            .iter()
            .map(FieldType::as_str)
            .collect::<Vec<_>>()
            .join("/");
        let input = match field_type {
            Some(field_type) if spec.operator.takes_value() => {
                format!(" [{}]", input_kind(Some(field_type), Some(spec.operator)))
            }
            _ => String::new(),
        };

        println!(
            "{:<14} {:<28} {}{}",
            spec.operator.as_str(),
            applies_to,
            spec.description,
            input
        );
    }

    Ok(())
}
