//! OpenWrt table-of-hardware reader.
//!
//! The export is tab-separated with a header row. Only rows describing a
//! hardware data page (`toh:hwdata:...`) are turned into pages.

use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::device::Origin;
use crate::error::{DeviceCodeError, Result};

use super::page::{RawField, RawPage};
use super::source::{read_with_hash, DataTable, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';'];

/// Prefix of rows that describe hardware.
pub const HWDATA_PREFIX: &str = "toh:hwdata:";

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: Some(b'\t'),
            max_rows: None,
        }
    }
}

/// Reads table-of-hardware exports.
pub struct TableReader {
    config: TableConfig,
}

impl TableReader {
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
        }
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Read a file and return the table and its metadata.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let (contents, hash) = read_with_hash(path)?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        let table = self.read_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "openwrt-tsv",
            _ => "openwrt-csv",
        };
        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            table.row_count(),
        );
        Ok((table, metadata))
    }

    /// Parse bytes directly.
    pub fn read_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quoting(false)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(DeviceCodeError::EmptyData("table has no columns".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn hardware rows into raw pages. Null cells are dropped.
pub fn pages_from_table(table: &DataTable) -> Vec<RawPage> {
    let Some(page_col) = table.column_index("page") else {
        debug!("table has no page column");
        return Vec::new();
    };

    let mut pages = Vec::new();
    for row in &table.rows {
        let Some(page_id) = row.get(page_col) else { continue };
        let page_id = page_id.trim();
        if !page_id.starts_with(HWDATA_PREFIX) {
            continue;
        }
        let title = page_id.rsplit(':').next().unwrap_or(page_id);

        let mut page = RawPage::new(Origin::OpenWrt, title);
        for (header, value) in table.headers.iter().zip(row) {
            if header.is_empty() || DataTable::is_null_value(value) {
                continue;
            }
            page.fields.push(RawField::new(header.clone(), value.trim()));
        }
        pages.push(page);
    }

    debug!(rows = table.row_count(), pages = pages.len(), "read table of hardware");
    pages
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DeviceCodeError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b'\t';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delim).count())
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // consistent column counts win, tabs break ties
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + usize::from(delim == b'\t') * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}
