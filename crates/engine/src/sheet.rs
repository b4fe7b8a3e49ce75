use super::cell::Cell;

static EMPTY: Cell = Cell::Empty;

/// A read-only, row-major grid of cells.
///
/// Rows may be ragged; any coordinate outside the stored data reads as
/// [`Cell::Empty`].
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// Set a cell, growing the grid as needed. Only used while loading.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize(col + 1, Cell::Empty);
        }
        r[col] = cell;
    }

    pub fn get_cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Cells of one row; empty slice past the end of the grid.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Cell::is_blank))
    }
}

/// Build a sheet from string literals; numeric-looking strings become numbers.
///
/// Handy for fixtures: `sheet_from_strs("S&U", &[&["Taxes", "", "1,500"]])`.
pub fn sheet_from_strs(name: &str, rows: &[&[&str]]) -> Sheet {
    let rows = rows
        .iter()
        .map(|r| r.iter().map(|s| Cell::from_input(s)).collect())
        .collect();
    Sheet::from_rows(name, rows)
}
