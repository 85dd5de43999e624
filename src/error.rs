//! Errors raised while reading a table and discovering its schema.
//!
//! A column that holds text is not an error: it classifies as `string`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A data row has a different number of fields than the header.
    #[error("{}: line {line} has {found} field(s), expected {expected}", .path.display())]
    MalformedInput {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Nothing left to describe after reading the header.
    #[error("table '{table}' has no columns to describe")]
    EmptySchema { table: String },

    #[error("{}: duplicate column name '{name}'", .path.display())]
    DuplicateColumn { path: PathBuf, name: String },

    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: line {line} is not valid {encoding}", .path.display())]
    Decode {
        path: PathBuf,
        line: u64,
        encoding: &'static str,
    },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
