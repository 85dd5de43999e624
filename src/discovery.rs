//! Runs the number classifier over every column of a table.
//!
//! Columns are independent, so they are classified on a dedicated `rayon`
//! pool. `par_iter().map().collect()` writes each result into the slot of its
//! column index, which keeps the schema in header order whatever the
//! completion order of the workers.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;

use crate::{
    error::DiscoveryError,
    number,
    reader::{self, ColumnarTable, ReaderOptions},
    schema::{ColumnSchema, SqlType, TableSchema},
};

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub reader: ReaderOptions,
    /// Worker threads used for classification; zero or negative picks one
    /// per available core.
    pub parallelism: isize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            reader: ReaderOptions::default(),
            parallelism: 1,
        }
    }
}

/// Discovers the tightest schema of one delimited file.
#[derive(Debug, Clone)]
pub struct SchemaDiscovery {
    table_name: String,
    options: DiscoveryOptions,
}

impl SchemaDiscovery {
    pub fn new(table_name: impl Into<String>, options: DiscoveryOptions) -> Self {
        Self {
            table_name: table_name.into(),
            options,
        }
    }

    /// Reads `path` and classifies each of its columns.
    pub fn run(&self, path: &Path) -> Result<TableSchema, DiscoveryError> {
        info!("Reading {:?}", path);
        let table = reader::read_table(path, &self.options.reader)?;
        info!(
            "Read {} row(s) across {} column(s) from {:?}",
            table.row_count,
            table.headers.len(),
            path
        );
        self.describe(&table)
    }

    /// Classifies the columns of an already loaded table.
    pub fn describe(&self, table: &ColumnarTable) -> Result<TableSchema, DiscoveryError> {
        if table.headers.is_empty() {
            return Err(DiscoveryError::EmptySchema {
                table: self.table_name.clone(),
            });
        }

        let threads = resolve_parallelism(self.options.parallelism, table.columns.len());
        info!(
            "Classifying {} column(s) of '{}' on {} thread(s)",
            table.columns.len(),
            self.table_name,
            threads
        );
        let types = classify_columns(&table.columns, threads)?;

        let columns: Vec<ColumnSchema> = table
            .headers
            .iter()
            .zip(types)
            .map(|(name, sql_type)| {
                debug!("Column '{name}' -> {sql_type}");
                ColumnSchema {
                    name: name.clone(),
                    sql_type,
                }
            })
            .collect();

        let numeric = columns.iter().filter(|c| c.sql_type.is_numeric()).count();
        info!(
            "Discovered {} numeric and {} string column(s) for '{}'",
            numeric,
            columns.len() - numeric,
            self.table_name
        );
        Ok(TableSchema::new(self.table_name.clone(), columns))
    }
}

/// Classifies every column on a pool of `threads` workers. The result has
/// one entry per column, in column order.
pub fn classify_columns(
    columns: &[Vec<String>],
    threads: usize,
) -> Result<Vec<SqlType>, DiscoveryError> {
    if threads <= 1 {
        return Ok(columns.iter().map(number::classify).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("classify-{idx}"))
        .build()?;
    Ok(pool.install(|| columns.par_iter().map(number::classify).collect()))
}

/// Number of worker threads to use for `columns` columns.
pub fn resolve_parallelism(requested: isize, columns: usize) -> usize {
    let wanted = if requested <= 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested as usize
    };
    let threads = wanted.min(columns).max(1);
    debug!("Parallelism requested {requested}, using {threads} for {columns} column(s)");
    threads
}
