// Excel import (xlsx, xlsm, xls, xlsb, ods) into the read-only grid

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use costgrid_engine::{Cell, Sheet, Workbook};

use crate::error::LoadError;

/// Maximum dimensions for a sheet
const MAX_ROWS: usize = 65536;
const MAX_COLS: usize = 256;

/// Load every sheet of a workbook, in workbook order.
///
/// Formula cells carry their cached result only; nothing is recalculated.
pub fn load_workbook(path: &Path) -> Result<Workbook, LoadError> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| LoadError::Open(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::NoSheets);
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook.worksheet_range(name).map_err(|e| LoadError::Sheet {
            name: name.clone(),
            message: e.to_string(),
        })?;

        let mut sheet = Sheet::new(name);
        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            sheets.push(sheet);
            continue;
        }

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start_row as usize, start_col as usize);

        if start_row + height > MAX_ROWS || start_col + width > MAX_COLS {
            tracing::warn!(
                sheet = %name,
                rows = start_row + height,
                cols = start_col + width,
                "sheet truncated to {}x{}",
                MAX_ROWS,
                MAX_COLS
            );
        }

        for (row_idx, row) in range.rows().enumerate() {
            let target_row = start_row + row_idx;
            if target_row >= MAX_ROWS {
                break;
            }
            for (col_idx, data) in row.iter().enumerate() {
                let target_col = start_col + col_idx;
                if target_col >= MAX_COLS {
                    break;
                }
                let cell = to_cell(data);
                if cell != Cell::Empty {
                    sheet.set_cell(target_row, target_col, cell);
                }
            }
        }

        sheets.push(sheet);
    }

    tracing::debug!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
    Ok(Workbook::from_sheets(sheets))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Serial number, 1900 date system assumed
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        // #REF!, #DIV/0! and friends carry no usable value
        Data::Error(_) => Cell::Empty,
    }
}
