mod query;
mod schema;

use std::io::Read;

use anyhow::Context;
use querykit::mock::MockSchema;

use crate::argparse::Commands;

pub fn handle_command(command: Commands, schema: MockSchema) -> anyhow::Result<()> {
    match command {
        Commands::Tables => schema::list_tables(&schema),
        Commands::Columns(args) => schema::list_columns(&schema, &args.table),
        Commands::Operators(args) => schema::list_operators(args.field_type.as_deref()),
        Commands::Load(args) => query::load(&schema, &args.input, args.table.as_deref()),
        Commands::Save(args) => query::save(schema, &args.input, args.table.as_deref()),
        Commands::Encode(args) => query::encode(&args.input, args.typed),
    }
}

/// Reads query text from a file, or from standard input for `-`.
fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read query JSON from standard input")?;
        return Ok(text);
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read query JSON from {input}"))
}
