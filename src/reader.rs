//! Reads a delimited file into header names and per-column values.
//!
//! Rows must be rectangular: a record whose field count differs from the
//! header fails the whole read with [`DiscoveryError::MalformedInput`].

use std::{collections::HashSet, path::Path};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};

use crate::{error::DiscoveryError, io_utils};

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub delimiter: u8,
    /// Raw lines discarded before the header row.
    pub skip_lines: usize,
    /// Cell text that stands for NULL; matching cells become `""`.
    pub null_token: String,
    pub encoding: &'static Encoding,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_DELIMITER,
            skip_lines: 0,
            null_token: String::new(),
            encoding: UTF_8,
        }
    }
}

/// Header names and the column-major cell values below them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnarTable {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<String>>,
    pub row_count: usize,
}

impl ColumnarTable {
    /// Builds a table from row-major records, rejecting ragged rows.
    pub fn from_rows<H, R, S>(headers: H, rows: R) -> Result<Self, DiscoveryError>
    where
        H: IntoIterator<Item = S>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut table = Self::with_headers(headers);
        for (idx, row) in rows.into_iter().enumerate() {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            table.push_row(row, idx as u64 + 2, Path::new("<memory>"))?;
        }
        Ok(table)
    }

    fn with_headers(headers: Vec<String>) -> Self {
        let columns = vec![Vec::new(); headers.len()];
        Self {
            headers,
            columns,
            row_count: 0,
        }
    }

    fn push_row(&mut self, row: Vec<String>, line: u64, path: &Path) -> Result<(), DiscoveryError> {
        if row.len() != self.headers.len() {
            return Err(DiscoveryError::MalformedInput {
                path: path.to_path_buf(),
                line,
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        self.row_count += 1;
        Ok(())
    }
}

pub fn read_table(path: &Path, options: &ReaderOptions) -> Result<ColumnarTable, DiscoveryError> {
    let input = io_utils::open_input(path, options.skip_lines)?;
    let mut reader = io_utils::open_csv_reader(input, options.delimiter);
    let line_offset = options.skip_lines as u64;

    let header_record = reader
        .byte_headers()
        .map_err(|err| csv_error(path, line_offset, err))?
        .clone();
    let headers = io_utils::decode_record(&header_record, options.encoding).ok_or_else(|| {
        DiscoveryError::Decode {
            path: path.to_path_buf(),
            line: line_offset + 1,
            encoding: options.encoding.name(),
        }
    })?;
    ensure_unique_headers(path, &headers)?;
    debug!("Header row: {:?}", headers);

    let mut table = ColumnarTable::with_headers(headers);
    if table.headers.is_empty() {
        return Ok(table);
    }

    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return Err(csv_error(path, line_offset, err)),
        }
        let line = line_offset + record.position().map_or(0, |pos| pos.line());
        let mut row = io_utils::decode_record(&record, options.encoding).ok_or_else(|| {
            DiscoveryError::Decode {
                path: path.to_path_buf(),
                line,
                encoding: options.encoding.name(),
            }
        })?;
        if !options.null_token.is_empty() {
            for value in row.iter_mut().filter(|value| **value == options.null_token) {
                value.clear();
            }
        }
        table.push_row(row, line, path)?;
    }

    Ok(table)
}

fn ensure_unique_headers(path: &Path, headers: &[String]) -> Result<(), DiscoveryError> {
    let mut seen = HashSet::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        if name.trim().is_empty() {
            warn!("{path:?}: column {} has an empty header name", idx + 1);
        }
        if !seen.insert(name.as_str()) {
            return Err(DiscoveryError::DuplicateColumn {
                path: path.to_path_buf(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn csv_error(path: &Path, line_offset: u64, err: csv::Error) -> DiscoveryError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return DiscoveryError::MalformedInput {
            path: path.to_path_buf(),
            line: line_offset + pos.as_ref().map_or(0, |pos| pos.line()),
            expected: *expected_len as usize,
            found: *len as usize,
        };
    }
    DiscoveryError::Csv {
        path: path.to_path_buf(),
        source: err,
    }
}
