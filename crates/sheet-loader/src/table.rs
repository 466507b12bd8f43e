//! Sectioned flat-file parsing.
//!
//! One text resource holds several named tables. A `# sheet:<name>` line
//! opens a table, other `#` lines are comments, blank lines are ignored,
//! and everything else is a quoted CSV record. The first record of a
//! section is its header; a synthetic `__sheet` tag column is stripped.

use std::collections::BTreeMap;
use std::path::Path;

use loop_core::LoopError;
use serde::{Deserialize, Serialize};

const SECTION_PREFIX: &str = "# sheet:";

/// Synthetic column the collectors prepend to tag rows with their table.
const SHEET_TAG_COLUMN: &str = "__sheet";

/// A named table of same-shaped string records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(move |cells| Record { table: self, cells })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A borrowed row with by-column access.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a RawTable,
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Cell under `column`, or `""` when the column does not exist.
    pub fn get(&self, column: &str) -> &'a str {
        self.get_opt(column).unwrap_or("")
    }

    /// Cell under `column`, `None` when the column is missing or the cell
    /// is empty after trimming.
    pub fn get_opt(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        let cell = self.cells.get(idx)?.trim();
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }
}

/// All tables parsed out of one snapshot resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSet {
    tables: BTreeMap<String, RawTable>,
}

impl SheetSet {
    /// Parse a sectioned text resource. Malformed records are skipped;
    /// tables that end up with no header or no records are omitted.
    pub fn parse(text: &str) -> Self {
        let mut tables = BTreeMap::new();
        let mut current: Option<RawTable> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix(SECTION_PREFIX) {
                flush(&mut tables, current.take());
                current = Some(RawTable {
                    name: name.trim().to_string(),
                    headers: Vec::new(),
                    rows: Vec::new(),
                });
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            let Some(table) = current.as_mut() else {
                // Records before the first section directive have no home.
                continue;
            };
            let Some(fields) = parse_csv_line(line) else {
                tracing::debug!(table = %table.name, "skipping malformed record");
                continue;
            };

            if table.headers.is_empty() {
                table.headers = fields;
                if let Some(idx) = table.headers.iter().position(|h| h == SHEET_TAG_COLUMN) {
                    table.headers.remove(idx);
                }
            } else {
                table.rows.push(normalize_row(fields, table.headers.len()));
            }
        }
        flush(&mut tables, current.take());

        SheetSet { tables }
    }

    pub fn from_path(path: &Path) -> Result<Self, LoopError> {
        if !path.exists() {
            return Err(LoopError::SnapshotNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let set = Self::parse(&text);
        tracing::debug!(
            path = %path.display(),
            tables = set.tables.len(),
            "loaded snapshot"
        );
        Ok(set)
    }

    pub fn table(&self, name: &str) -> Option<&RawTable> {
        self.tables.get(name)
    }

    /// Fetch the single build-blocking table; every other table is optional.
    pub fn require(&self, name: &str) -> Result<&RawTable, LoopError> {
        self.tables
            .get(name)
            .ok_or_else(|| LoopError::MissingTable(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert(&mut self, table: RawTable) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Re-serialize to the sectioned format. Parsing the output yields an
    /// identical record set.
    pub fn to_sectioned_text(&self) -> String {
        let mut out = String::new();
        for table in self.tables.values() {
            out.push_str(SECTION_PREFIX);
            out.push_str(&table.name);
            out.push('\n');
            write_csv_line(&mut out, &table.headers);
            for row in &table.rows {
                write_csv_line(&mut out, row);
            }
        }
        out
    }
}

fn flush(tables: &mut BTreeMap<String, RawTable>, table: Option<RawTable>) {
    if let Some(table) = table {
        if !table.headers.is_empty() && !table.rows.is_empty() {
            tables.insert(table.name.clone(), table);
        }
    }
}

/// Normalize a record to the header width: a record wider than the header
/// drops its first field (assumed to be the synthetic tag value), short
/// records are right-padded with empty strings, long ones truncated.
fn normalize_row(mut fields: Vec<String>, width: usize) -> Vec<String> {
    if fields.len() > width {
        fields.remove(0);
    }
    while fields.len() < width {
        fields.push(String::new());
    }
    fields.truncate(width);
    fields
}

fn parse_csv_line(line: &str) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = reader.records().next()?.ok()?;
    Some(record.iter().map(str::to_string).collect())
}

fn write_csv_line(out: &mut String, fields: &[String]) {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    if writer.write_record(fields).is_err() {
        return;
    }
    if let Ok(bytes) = writer.into_inner() {
        if let Ok(text) = String::from_utf8(bytes) {
            out.push_str(&text);
        }
    }
}
