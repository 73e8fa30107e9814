//! Sheet-name template check

use anyhow::{Context, Result, bail};
use calamine::{Reader, Xlsx, open_workbook};
use std::path::Path;

use super::TEMPLATE_SHEETS;

/// Open the workbook and list its sheet names in workbook order
pub fn read_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Require the sheet names to equal [`TEMPLATE_SHEETS`] exactly: same names,
/// same order, nothing extra.
pub fn validate_sheet_names(sheet_names: &[String]) -> Result<()> {
    if sheet_names.iter().map(String::as_str).eq(TEMPLATE_SHEETS) {
        return Ok(());
    }

    bail!(
        "Entity Management Template Not Valid: found sheets [{}], expected [{}]",
        sheet_names.join(", "),
        TEMPLATE_SHEETS.join(", ")
    )
}
