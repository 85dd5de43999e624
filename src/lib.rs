pub mod cli;
pub mod discovery;
pub mod error;
pub mod io_utils;
pub mod number;
pub mod reader;
pub mod schema;

use std::{collections::HashSet, env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, OutputFormat},
    discovery::{DiscoveryOptions, SchemaDiscovery},
    reader::ReaderOptions,
    schema::TableSchema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("schema_discovery", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    execute(&cli)
}

/// Describes every input file and writes the rendered schemas. Nothing is
/// written unless all files succeed.
pub fn execute(cli: &Cli) -> Result<()> {
    if cli.table.is_some() && cli.files.len() > 1 {
        bail!("--table can only be used with a single input file");
    }
    let encoding = io_utils::resolve_encoding(cli.input_encoding.as_deref())?;

    let mut schemas = Vec::with_capacity(cli.files.len());
    let mut table_names = HashSet::new();
    for path in &cli.files {
        let table_name = cli.table.clone().unwrap_or_else(|| default_table_name(path));
        if !table_names.insert(table_name.clone()) {
            bail!("Table name '{table_name}' is used by more than one input file");
        }
        let delimiter = io_utils::resolve_input_delimiter(path, cli.delimiter);
        info!(
            "Describing '{}' as table '{}' with delimiter '{}'",
            path.display(),
            table_name,
            io_utils::printable_delimiter(delimiter)
        );
        let options = DiscoveryOptions {
            reader: ReaderOptions {
                delimiter,
                skip_lines: cli.skip_lines,
                null_token: cli.null.clone(),
                encoding,
            },
            parallelism: cli.parallelism,
        };
        let schema = SchemaDiscovery::new(table_name, options)
            .run(path)
            .with_context(|| format!("Discovering schema of {path:?}"))?;
        schemas.push(schema);
    }

    let rendered = render(&schemas, cli.format)?;
    io_utils::write_output(cli.output.as_deref(), &rendered)
        .with_context(|| format!("Writing output to {:?}", cli.output))?;
    info!("Described {} table(s)", schemas.len());
    Ok(())
}

pub fn render(schemas: &[TableSchema], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Sql => {
            let statements = schemas
                .iter()
                .map(TableSchema::to_create_table)
                .collect::<Result<Vec<_>>>()?;
            Ok(statements.join("\n\n"))
        }
        OutputFormat::Json => schema::to_json(schemas),
        OutputFormat::Yaml => schema::to_yaml(schemas),
    }
}

/// Table name used when none is given: the file stem, or `stdin` for `-`.
pub fn default_table_name(path: &Path) -> String {
    if io_utils::is_dash(path) {
        return "stdin".to_string();
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "table".to_string())
}
