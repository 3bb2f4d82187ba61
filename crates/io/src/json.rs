// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use padconv_core::{Table, Value};
use serde_json::{Map, Value as Json};

use crate::error::WriteError;
use crate::writer::{output_path, TableWriter};

pub struct JsonWriter {
    dir: PathBuf,
}

impl JsonWriter {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }
}

impl TableWriter for JsonWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, table: &Table) -> Result<(), WriteError> {
        let path = output_path(&self.dir, &table.name, "json")?;
        export(table, &path)
    }
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Integer(n) => Json::from(*n),
        Value::Text(s) => Json::from(s.as_str()),
        // Decimal string keeps the cents exact
        Value::Cents(_) => Json::from(value.to_string()),
        Value::Date(d) => Json::from(d.format("%Y-%m-%d").to_string()),
    }
}

/// Table as an array of objects, keys in column order.
pub fn rows(table: &Table) -> Vec<Json> {
    table
        .rows
        .iter()
        .map(|row| {
            let obj: Map<String, Json> = table
                .columns
                .iter()
                .zip(row)
                .map(|(col, v)| (col.name.clone(), to_json(v)))
                .collect();
            Json::Object(obj)
        })
        .collect()
}

pub fn export(table: &Table, path: &Path) -> Result<(), WriteError> {
    let file = File::create(path).map_err(|e| WriteError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &rows(table)).map_err(|e| WriteError::Json(e.to_string()))?;
    log::debug!("json: {} ({} rows)", path.display(), table.len());
    Ok(())
}
