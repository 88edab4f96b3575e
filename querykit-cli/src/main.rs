mod argparse;
mod commands;
mod logger;

use argparse::parse_args;
use querykit::mock::MockSchema;

fn main() -> anyhow::Result<()> {
    let cli = parse_args();
    logger::init_logger(cli.verbose);

    let schema = match &cli.schema {
        Some(path) => MockSchema::from_json_file(path)?,
        None => MockSchema::default(),
    };

    commands::handle_command(cli.command, schema)
}
