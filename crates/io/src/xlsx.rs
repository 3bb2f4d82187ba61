// Excel export (one workbook per table)

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use padconv_core::{Table, Value};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::WriteError;
use crate::writer::{output_path, TableWriter};

/// Excel's maximum worksheet name length.
const MAX_SHEET_NAME: usize = 31;

pub struct XlsxWriter {
    dir: PathBuf,
}

impl XlsxWriter {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }
}

impl TableWriter for XlsxWriter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, table: &Table) -> Result<(), WriteError> {
        let path = output_path(&self.dir, &table.name, "xlsx")?;
        export(table, &path)
    }
}

/// Days since 1899-12-30, the serial Excel stores dates as.
pub fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

pub fn export(table: &Table, path: &Path) -> Result<(), WriteError> {
    let mut workbook = Workbook::new();
    let sheet_name: String = table.name.chars().take(MAX_SHEET_NAME).collect();

    let worksheet = workbook
        .add_worksheet()
        .set_name(&sheet_name)
        .map_err(|e| WriteError::Xlsx(format!("Failed to create sheet '{}': {}", sheet_name, e)))?;

    write_cells(table, worksheet)?;

    workbook
        .save(path)
        .map_err(|e| WriteError::Xlsx(format!("Failed to save XLSX file: {}", e)))?;
    log::debug!("xlsx: {} ({} rows)", path.display(), table.len());
    Ok(())
}

fn write_cells(table: &Table, worksheet: &mut Worksheet) -> Result<(), WriteError> {
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let money_format = Format::new().set_num_format("#,##0.00");

    let cell_err = |row: u32, col: u16, e: rust_xlsxwriter::XlsxError| {
        WriteError::Xlsx(format!("Failed to write cell ({}, {}): {}", row, col, e))
    };

    for (col, column) in table.columns.iter().enumerate() {
        let col16 = col as u16;
        worksheet
            .write_string_with_format(0, col16, &column.name, &header)
            .map_err(|e| cell_err(0, col16, e))?;
    }

    for (row, values) in table.rows.iter().enumerate() {
        // Header occupies row 0
        let row32 = row as u32 + 1;
        for (col, value) in values.iter().enumerate() {
            let col16 = col as u16;
            match value {
                Value::Null => {}
                Value::Integer(n) => {
                    worksheet
                        .write_number(row32, col16, *n as f64)
                        .map_err(|e| cell_err(row32, col16, e))?;
                }
                Value::Text(s) => {
                    worksheet
                        .write_string(row32, col16, s)
                        .map_err(|e| cell_err(row32, col16, e))?;
                }
                Value::Cents(c) => {
                    worksheet
                        .write_number_with_format(row32, col16, *c as f64 / 100.0, &money_format)
                        .map_err(|e| cell_err(row32, col16, e))?;
                }
                Value::Date(d) => {
                    worksheet
                        .write_number_with_format(row32, col16, excel_serial(*d), &date_format)
                        .map_err(|e| cell_err(row32, col16, e))?;
                }
            }
        }
    }

    Ok(())
}
