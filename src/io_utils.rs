//! I/O helpers shared by the reader and the command layer.
//!
//! - **Delimiter resolution**: explicit flag first, then the file extension
//!   (`.csv` → comma, `.tsv` → tab), otherwise pipe.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: strict `csv` readers over a file or stdin, with
//!   an optional number of raw lines skipped before the header.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::DiscoveryError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';
pub const DEFAULT_DELIMITER: u8 = b'|';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, DiscoveryError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| DiscoveryError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        Some(ext) if ext.eq_ignore_ascii_case("csv") => DEFAULT_CSV_DELIMITER,
        _ => DEFAULT_DELIMITER,
    })
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

/// Opens `path` (or stdin for `-`) and discards the first `skip_lines` raw
/// lines. Skipping is line based, so quoted newlines are not honoured here.
pub fn open_input(path: &Path, skip_lines: usize) -> Result<Box<dyn BufRead>, DiscoveryError> {
    let mut reader: Box<dyn BufRead> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path).map_err(|source| {
            DiscoveryError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?))
    };

    let mut discarded = Vec::new();
    for _ in 0..skip_lines {
        discarded.clear();
        let read = reader
            .read_until(b'\n', &mut discarded)
            .map_err(|source| DiscoveryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
    }
    Ok(reader)
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: io::Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Option<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Writes `contents` to `path`, or to stdout when no path (or `-`) is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> io::Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(io::BufWriter::new(File::create(p)?)),
        _ => Box::new(io::stdout().lock()),
    };
    writer.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
