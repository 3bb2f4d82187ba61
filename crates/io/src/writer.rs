// Output writers

use std::path::{Path, PathBuf};

use padconv_core::Table;
use serde::{Deserialize, Serialize};

use crate::error::WriteError;

/// Writes finished tables somewhere. Writers see tables only; they never
/// reach back into decoding or reconciliation.
pub trait TableWriter {
    fn name(&self) -> &'static str;
    fn write(&self, table: &Table) -> Result<(), WriteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterKind {
    Csv,
    Json,
    Xlsx,
}

impl WriterKind {
    pub fn build(self, out_dir: &Path) -> Box<dyn TableWriter + Send + Sync> {
        match self {
            Self::Csv => Box::new(crate::csv::CsvWriter::new(out_dir)),
            Self::Json => Box::new(crate::json::JsonWriter::new(out_dir)),
            Self::Xlsx => Box::new(crate::xlsx::XlsxWriter::new(out_dir)),
        }
    }
}

/// `<dir>/<TABLE>.<ext>`, creating `dir` if needed.
pub(crate) fn output_path(dir: &Path, table: &str, ext: &str) -> Result<PathBuf, WriteError> {
    std::fs::create_dir_all(dir).map_err(|e| WriteError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(dir.join(format!("{table}.{ext}")))
}
