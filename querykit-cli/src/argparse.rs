use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "querykit",
    about = "Build, validate and convert boolean filter queries",
    version,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// JSON file describing tables and columns, defaults to the built-in mock
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Pick which subcommand to use
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tables queries can be built against
    Tables,
    /// List the columns of a table, grouped by field type
    Columns(ColumnsArgs),
    /// Show the operator catalog
    Operators(OperatorsArgs),
    /// Parse query JSON and report its structure and validation errors
    Load(LoadArgs),
    /// Validate query JSON and hand it to the save handler
    Save(SaveArgs),
    /// Re-encode query JSON in normalized form
    Encode(EncodeArgs),
}

#[derive(Args)]
pub struct ColumnsArgs {
    /// Table name
    pub table: String,
}

#[derive(Args)]
pub struct OperatorsArgs {
    /// Only show operators applicable to this field type (string, numeric, boolean, date)
    #[arg(long)]
    pub field_type: Option<String>,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Query JSON file, `-` reads standard input
    pub input: String,

    /// Also check columns against this table
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Args)]
pub struct SaveArgs {
    /// Query JSON file, `-` reads standard input
    pub input: String,

    /// Table the query is built against
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Query JSON file, `-` reads standard input
    pub input: String,

    /// Tag conditions by field type (`NumericQuery`, ...) instead of `FieldQuery`
    #[arg(long)]
    pub typed: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
