//! Summary persistence - the durable, append-only record of accepted results
//!
//! The orchestrator appends exactly one entry per accepted record, in
//! sweep order, and requires the write to be durable before advancing.
//! A crash therefore loses at most the one in-flight iteration.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::record::ResultRecord;
use crate::{Error, Result};

/// Append-only sink for accepted result records.
pub trait SummaryWriter {
    /// Durably append one entry for `record`.
    ///
    /// # Errors
    ///
    /// Any error here is fatal to the sweep: the orchestrator must not
    /// advance past a record it cannot prove was persisted.
    fn append(&mut self, record: &ResultRecord) -> Result<()>;
}

/// Summary writer backed by an append-only delimited text file.
///
/// One line per record: the sequence index, the creation timestamp
/// (RFC 3339), then the record's fields in sorted key order. The column
/// set is fixed by the first appended record, so every line has the same
/// shape; an optional header line names the columns. The header is only
/// ever written to an empty file, so reopening an existing summary (a
/// resumed sweep) appends entries without injecting a second header.
///
/// String fields containing the delimiter, a backslash, or a line break
/// are backslash-escaped so each entry stays on one line with a stable
/// column count.
///
/// Each append is flushed and synced before returning.
#[derive(Debug)]
pub struct FileSummaryWriter {
    file: File,
    path: PathBuf,
    delimiter: char,
    write_header: bool,
    file_was_empty: bool,
    columns: Option<Vec<String>>,
    entries_written: u64,
}

impl FileSummaryWriter {
    /// Open (or create) a summary file for appending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the file cannot be opened.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| {
                Error::Persistence(format!("cannot open summary file {}: {e}", path.display()))
            })?;
        let file_was_empty = file
            .metadata()
            .map_err(|e| {
                Error::Persistence(format!(
                    "cannot stat summary file {}: {e}",
                    path.display()
                ))
            })?
            .len()
            == 0;
        Ok(Self {
            file,
            path,
            delimiter: '\t',
            write_header: true,
            file_was_empty,
            columns: None,
            entries_written: 0,
        })
    }

    /// Use a different field delimiter (default: tab).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable or disable the header line (default: enabled).
    #[must_use]
    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// Path of the underlying summary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries appended so far (header excluded).
    #[must_use]
    pub const fn entries_written(&self) -> u64 {
        self.entries_written
    }

    fn format_value(&self, value: &Value) -> String {
        match value {
            // Strings go out unquoted; everything else in JSON form.
            Value::String(s) => escape_field(s, self.delimiter),
            other => other.to_string(),
        }
    }
}

/// Backslash-escape the characters that would break the line/column
/// structure of a summary entry: backslash, line breaks, and the active
/// delimiter.
fn escape_field(s: &str, delimiter: char) -> String {
    if !s.contains(&['\\', '\n', '\r', delimiter][..]) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

impl SummaryWriter for FileSummaryWriter {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        if self.columns.is_none() {
            let columns: Vec<String> = record.fields().keys().cloned().collect();
            // A non-empty file already carries its header (and fixed its
            // column order) in an earlier session; never write a second one.
            if self.write_header && self.file_was_empty {
                let mut header = String::from("index");
                header.push(self.delimiter);
                header.push_str("created_at");
                for key in &columns {
                    header.push(self.delimiter);
                    header.push_str(key);
                }
                header.push('\n');
                self.file.write_all(header.as_bytes()).map_err(|e| {
                    Error::Persistence(format!("summary header write failed: {e}"))
                })?;
            }
            self.columns = Some(columns);
        }

        let mut line = record.index().to_string();
        line.push(self.delimiter);
        line.push_str(&record.created_at().to_rfc3339());
        if let Some(columns) = &self.columns {
            for key in columns {
                line.push(self.delimiter);
                if let Some(value) = record.get(key) {
                    line.push_str(&self.format_value(value));
                }
            }
        }
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .and_then(|()| self.file.sync_data())
            .map_err(|e| Error::Persistence(format!("summary append failed: {e}")))?;
        self.entries_written += 1;
        Ok(())
    }
}

/// Summary writer that keeps records in memory. Intended for tests and
/// for callers that post-process results in the same process.
#[derive(Debug, Clone, Default)]
pub struct MemorySummaryWriter {
    records: Vec<ResultRecord>,
}

impl MemorySummaryWriter {
    /// Create an empty in-memory writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All appended records, in sweep order.
    #[must_use]
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Number of appended records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SummaryWriter for MemorySummaryWriter {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
