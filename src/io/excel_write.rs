use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use tracing::debug;

use crate::error::Result;
use crate::table::{Cell, SheetTable, WorkbookData};

/// Writes the provided workbook data to the given path.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();
    let merged_format = Format::new().set_align(FormatAlign::VerticalCenter);

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                write_cell(worksheet, (row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        if table.merge_first_column {
            merge_first_column(worksheet, table, &merged_format)?;
        }
        worksheet.set_freeze_panes(1, 0)?;
    }

    workbook_writer.save(path)?;
    debug!(path = %path.display(), sheets = workbook.tables.len(), "workbook written");
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        Cell::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

/// Collapses each run of identical first-column values into one merged cell.
fn merge_first_column(worksheet: &mut Worksheet, table: &SheetTable, format: &Format) -> Result<()> {
    let values: Vec<String> = table
        .rows
        .iter()
        .map(|row| row.first().map(Cell::text).unwrap_or_default())
        .collect();

    let mut start = 0;
    while start < values.len() {
        let mut end = start;
        while end + 1 < values.len() && values[end + 1] == values[start] {
            end += 1;
        }
        if end > start && !values[start].is_empty() {
            worksheet.merge_range(
                (start + 1) as u32,
                0,
                (end + 1) as u32,
                0,
                &values[start],
                format,
            )?;
        }
        start = end + 1;
    }
    Ok(())
}
