//! Generic tabular store collaborator: one CSV file per eye, header row
//! first, cells as strings. Handles the source spreadsheets' quirks so the
//! loader and writer above it see clean canonical columns.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PapilaError, Result};

/// Canonical column set, in write order.
pub const COLUMNS: &[&str] = &[
    "patient_id",
    "age",
    "gender",
    "diagnosis",
    "sphere",
    "cylinder",
    "axis",
    "crystalline_status",
    "pneumatic_iop",
    "perkins_iop",
    "pachymetry",
    "axial_length",
    "mean_defect",
    "image_path",
];

/// Original spreadsheet header spellings mapped onto canonical names.
const HEADER_REMAP: &[(&str, &str)] = &[
    ("unnamed: 0", "patient_id"),
    ("dioptre_1", "sphere"),
    ("dioptre_2", "cylinder"),
    ("astigmatism", "axis"),
    ("phakic/pseudophakic", "crystalline_status"),
    ("pneumatic", "pneumatic_iop"),
    ("perkins", "perkins_iop"),
    ("vf_md", "mean_defect"),
];

/// Lowercase, trim, then remap through the fixed table.
pub fn normalize_header(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    for (old, new) in HEADER_REMAP {
        if lowered == *old {
            return (*new).to_string();
        }
    }
    lowered
}

fn is_absent(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("na")
}

/// One data row as canonical column name -> raw cell. Typed accessors treat
/// empty and NaN-equivalent cells as absent values rather than zeros.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.to_string(), value.into());
    }

    pub fn opt_str(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !is_absent(v))
    }

    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        match self.opt_str(column) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| PapilaError::BadCell {
                    column: column.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    pub fn req_f64(&self, column: &str) -> Result<f64> {
        self.opt_f64(column)?.ok_or_else(|| {
            PapilaError::Validation(format!("missing required value for {column}"))
        })
    }

    /// Required integer cell. Tolerates float spellings like `62.0` the way
    /// the source exports produce them.
    pub fn req_i64(&self, column: &str) -> Result<i64> {
        let raw = self.opt_str(column).ok_or_else(|| {
            PapilaError::Validation(format!("missing required value for {column}"))
        })?;
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(n);
        }
        raw.parse::<f64>()
            .map(|f| f as i64)
            .map_err(|_| PapilaError::BadCell {
                column: column.to_string(),
                value: raw.to_string(),
            })
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>> {
        match self.opt_str(column) {
            None => Ok(None),
            Some(_) => self.req_i64(column).map(Some),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn empty() -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Read a per-eye table. Headers are normalized, and the first data row is
/// dropped unconditionally when present: the source spreadsheets carry a
/// residual duplicate header row beneath the real header.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (i, column) in columns.iter().enumerate() {
            if let Some(value) = record.get(i) {
                row.set(column, value);
            }
        }
        rows.push(row);
    }

    if !rows.is_empty() {
        rows.remove(0);
    }

    tracing::debug!(path = %path.display(), columns = ?columns, rows = rows.len(), "table read");
    Ok(Table { columns, rows })
}

/// Full rewrite of a per-eye table with the canonical column names. A
/// residual duplicate header row is emitted beneath the header so the file
/// keeps the source shape the reader expects.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(&table.columns)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        let record: Vec<&str> = table
            .columns
            .iter()
            .map(|c| row.opt_str(c).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = table.rows.len(), "table written");
    Ok(())
}
