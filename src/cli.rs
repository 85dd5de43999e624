use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Determine the tightest SQL schema of delimited text files",
    long_about = None
)]
pub struct Cli {
    /// Delimited files to describe ('-' reads stdin)
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
    /// Field delimiter (supports ',', 'tab', ';', '|'); defaults by extension, then '|'
    #[arg(short = 'F', long = "sep", visible_alias = "delimiter", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Skip this many lines before the header row
    #[arg(short = 'B', long = "begin", visible_alias = "skip-lines", default_value_t = 0)]
    pub skip_lines: usize,
    /// Interpret this token as NULL
    #[arg(short = 'N', long = "null", default_value = "")]
    pub null: String,
    /// Classify columns on this many threads (0 or less picks automatically)
    #[arg(
        short = 'P',
        long = "parallelism",
        visible_alias = "parallel",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub parallelism: isize,
    /// Table name for the output (defaults to the input file stem)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "sql")]
    pub format: OutputFormat,
    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// CREATE TABLE statements
    #[default]
    Sql,
    /// JSON list of table schemas
    Json,
    /// YAML list of table schemas
    Yaml,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
