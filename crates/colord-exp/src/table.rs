use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use colord_core::errors::{ErrorInfo, SweepError};
use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::persist::atomic_write;
use crate::row::{ResultRow, PREFERRED_COLUMNS};

/// Column order of a result table: the preferred prefix, then metric columns
/// in the order they were first seen across rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableLayout {
    metric_columns: IndexSet<String>,
}

impl TableLayout {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let mut metric_columns = IndexSet::new();
        for row in rows {
            for name in row.metrics.keys() {
                if !PREFERRED_COLUMNS.contains(&name.as_str()) {
                    metric_columns.insert(name.clone());
                }
            }
        }
        Self { metric_columns }
    }

    pub fn metric_columns(&self) -> impl Iterator<Item = &str> {
        self.metric_columns.iter().map(String::as_str)
    }

    pub fn header(&self) -> Vec<String> {
        PREFERRED_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .chain(self.metric_columns.iter().cloned())
            .collect()
    }

    pub fn record(&self, row: &ResultRow) -> Vec<String> {
        row.fixed_cells()
            .into_iter()
            .chain(self.metric_columns.iter().map(|name| row.metric_cell(name)))
            .collect()
    }
}

/// String table, as read back from a CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let layout = TableLayout::from_rows(rows);
        Self {
            columns: layout.header(),
            rows: rows.iter().map(|row| layout.record(row)).collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Renders `rows` as CSV bytes with the canonical column order.
pub fn render_csv(rows: &[ResultRow]) -> Result<Vec<u8>, SweepError> {
    let layout = TableLayout::from_rows(rows);
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(layout.header())
        .map_err(|err| wrap_csv("table-write-header", err))?;
    for row in rows {
        writer
            .write_record(layout.record(row))
            .map_err(|err| wrap_csv("table-write-row", err))?;
    }
    writer
        .into_inner()
        .map_err(|err| SweepError::Serde(ErrorInfo::new("table-flush", err.to_string())))
}

/// Writes the result table to `path`, replacing any previous version atomically.
pub fn write_table(path: &Path, rows: &[ResultRow]) -> Result<(), SweepError> {
    let bytes = render_csv(rows).map_err(|err| match err {
        SweepError::Serde(info) => {
            SweepError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })?;
    atomic_write(path, &bytes)
}

/// Loads a CSV table, keeping every cell as text.
pub fn read_table(path: &Path) -> Result<Table, SweepError> {
    let file = File::open(path).map_err(|err| SweepError::io("table-open", path, err))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));
    let columns = reader
        .headers()
        .map_err(|err| wrap_csv("table-read-header", err))?
        .iter()
        .map(String::from)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| wrap_csv("table-read-row", err))?;
        rows.push(record.iter().map(String::from).collect());
    }
    Ok(Table { columns, rows })
}

fn wrap_csv(code: &str, err: csv::Error) -> SweepError {
    SweepError::Serde(ErrorInfo::new(code, err.to_string()))
}
