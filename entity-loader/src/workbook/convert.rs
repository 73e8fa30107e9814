//! Sheet-to-CSV conversion
//!
//! Every sheet becomes `<output_dir>/<sheet name>.csv`. A sheet that cannot be
//! read or written is reported and skipped; the remaining sheets still convert.

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of converting a whole workbook
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// `(sheet name, csv path)` in workbook order
    pub written: Vec<(String, PathBuf)>,
    pub failed: Vec<SheetFailure>,
}

/// A sheet that was skipped, and why
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet_name: String,
    pub reason: String,
}

/// Render one cell the way it should appear in the CSV.
///
/// Whole-number floats lose their fractional part, since ids and codes typed
/// into a spreadsheet come back from it as floats. Dates are written as
/// `YYYY-MM-DD HH:MM:SS`; durations keep their serial value.
pub fn cell_to_field(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => datetime.to_string(),
            _ => dt.to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Write a sheet's cells to `path`, one record per row
pub fn write_range_csv(range: &Range<Data>, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let mut rows = 0;
    for row in range.rows() {
        let record: Vec<String> = row.iter().map(cell_to_field).collect();
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write row {} to {}", rows + 1, path.display()))?;
        rows += 1;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(rows)
}

/// Convert every sheet of the workbook at `workbook_path` into a CSV under
/// `output_dir`, creating the directory if needed.
///
/// Failing to open the workbook or create the directory is an error; failures
/// of individual sheets land in [`ConversionReport::failed`].
pub fn convert_sheets<P: AsRef<Path>>(workbook_path: P, output_dir: &Path) -> Result<ConversionReport> {
    let workbook_path = workbook_path.as_ref();

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut workbook: Xlsx<_> = open_workbook(workbook_path)
        .with_context(|| format!("Failed to open Excel file: {}", workbook_path.display()))?;

    let mut report = ConversionReport::default();

    for sheet_name in workbook.sheet_names().to_vec() {
        let csv_path = output_dir.join(format!("{}.csv", sheet_name));

        let result = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))
            .and_then(|range| write_range_csv(&range, &csv_path));

        match result {
            Ok(rows) => {
                info!("Saved {} ({} rows) to {}", sheet_name, rows, csv_path.display());
                report.written.push((sheet_name, csv_path));
            }
            Err(e) => {
                warn!("Error processing sheet '{}': {:#}", sheet_name, e);
                report.failed.push(SheetFailure {
                    sheet_name,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}
