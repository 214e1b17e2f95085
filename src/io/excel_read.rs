use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::table::{Cell, SheetTable};

type Workbook = Xlsx<std::io::BufReader<std::fs::File>>;

/// Lists the sheet names of a workbook in workbook order.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    let workbook = open(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Returns the name of the sheet at `index`.
pub fn sheet_name_at(path: &Path, index: usize) -> Result<String> {
    let sheets = list_sheets(path)?;
    let len = sheets.len();
    sheets
        .into_iter()
        .nth(index)
        .ok_or(ToolError::SheetIndexOutOfRange { index, len })
}

/// Resolves a sheet selection against the workbook. `None` selects every
/// sheet. Entries naming a sheet are kept as is; other entries are read as
/// zero-based sheet positions.
pub fn select_sheets(path: &Path, selection: Option<&[String]>) -> Result<Vec<String>> {
    let sheets = list_sheets(path)?;
    let Some(selection) = selection else {
        return Ok(sheets);
    };

    let mut selected = Vec::with_capacity(selection.len());
    for entry in selection {
        let entry = entry.trim();
        if sheets.iter().any(|sheet| sheet == entry) {
            selected.push(entry.to_string());
        } else if let Ok(index) = entry.parse::<usize>() {
            selected.push(sheet_name_at(path, index)?);
        } else {
            return Err(ToolError::InvalidWorkbook(format!("missing sheet '{entry}'")));
        }
    }
    debug!(?selected, "sheets selected");
    Ok(selected)
}

/// Reads one sheet as a table. Rows above `header_row` are discarded, the
/// row at `header_row` provides column names and the rest are data rows.
/// Trailing rows with no content are dropped.
pub fn read_table(path: &Path, sheet: &str, header_row: usize) -> Result<SheetTable> {
    let mut workbook = open(path)?;
    let range = workbook
        .worksheet_range(sheet)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{sheet}'")))?
        .map_err(ToolError::from)?;

    let mut rows = range.rows().skip(header_row);
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| to_cell(cell).text()).collect(),
        None => Vec::new(),
    };

    let mut table = SheetTable::new(sheet, columns);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        table.push_row(cells);
    }
    while table
        .rows
        .last()
        .is_some_and(|row| row.iter().all(Cell::is_blank))
    {
        table.rows.pop();
    }

    debug!(sheet, rows = table.rows.len(), "sheet read");
    Ok(table)
}

fn open(path: &Path) -> Result<Workbook> {
    ensure_file(path)?;
    Ok(open_workbook(path)?)
}

/// Checks that `path` names an existing regular file.
pub fn ensure_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ToolError::InvalidPath(path.to_path_buf()));
    }
    Ok(())
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Text(value.to_string()),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}
