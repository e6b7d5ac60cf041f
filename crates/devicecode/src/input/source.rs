//! Source file metadata and tabular data.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DeviceCodeError, Result};

/// Metadata about an input dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Format (mediawiki-xml, openwrt-tsv, ...).
    pub format: String,
    /// Number of pages or rows read.
    pub page_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(path: PathBuf, hash: String, size_bytes: u64, format: impl Into<String>, page_count: usize) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format: format.into(),
            page_count,
            read_at: Utc::now(),
        }
    }
}

/// Read a whole file and compute its hash.
pub(crate) fn read_with_hash(path: &Path) -> Result<(Vec<u8>, String)> {
    let mut file = File::open(path).map_err(|e| DeviceCodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| DeviceCodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let hash = hash_bytes(&contents);
    Ok((contents, hash))
}

/// `sha256:<hex>` digest of some bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Parsed tabular data (header plus rows).
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by (case-insensitive) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a cell is one of the table-of-hardware non-answers.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed == "¿"
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed == "-"
    }
}
