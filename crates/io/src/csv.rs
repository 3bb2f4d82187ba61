// CSV export
//
// Regional layout expected by the downstream spreadsheets: `;` separator,
// decimal comma, `dd-mm-YYYY` dates. A `metadata/<TABLE>.txt` sidecar lists
// column names and types.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use padconv_core::{format_cents, Table, Value};

use crate::error::WriteError;
use crate::writer::{output_path, TableWriter};

pub struct CsvWriter {
    dir: PathBuf,
}

impl CsvWriter {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }
}

impl TableWriter for CsvWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, table: &Table) -> Result<(), WriteError> {
        let path = output_path(&self.dir, &table.name, "csv")?;
        export(table, &path)?;
        let meta = output_path(&self.dir.join("metadata"), &table.name, "txt")?;
        std::fs::write(&meta, metadata(table)).map_err(|e| WriteError::Io {
            path: meta.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Render one value the way the CSV consumers expect.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Text(s) => s.clone(),
        Value::Cents(c) => format_cents(*c).replace('.', ","),
        Value::Date(d) => d.format("%d-%m-%Y").to_string(),
    }
}

pub fn export(table: &Table, path: &Path) -> Result<(), WriteError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(|e| WriteError::Csv(format!("{}: {}", path.display(), e)))?;

    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(|e| WriteError::Csv(e.to_string()))?;

    for row in &table.rows {
        writer
            .write_record(row.iter().map(format_value))
            .map_err(|e| WriteError::Csv(e.to_string()))?;
    }

    writer.flush().map_err(|e| WriteError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::debug!("csv: {} ({} rows)", path.display(), table.len());
    Ok(())
}

fn metadata(table: &Table) -> String {
    let mut out = String::new();
    for col in &table.columns {
        let _ = writeln!(out, "{}: {}", col.name, col.kind);
    }
    out
}
