use crate::error::{Result, ToolError};

/// A single spreadsheet cell as seen by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Trimmed textual rendering of the cell. Whole numbers render without a
    /// fractional part so numeric headers such as day numbers read as `"5"`.
    pub fn text(&self) -> String {
        match self {
            Cell::Text(value) => value.trim().to_string(),
            Cell::Number(value) => value.to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(value) => value.trim().is_empty(),
            Cell::Number(_) => false,
            Cell::Empty => true,
        }
    }

    /// Reads the cell as a number; blank cells are an error.
    pub fn number(&self, column: &str) -> Result<f64> {
        match self {
            Cell::Number(value) => Ok(*value),
            Cell::Text(value) => parse_number(column, value),
            Cell::Empty => Err(ToolError::Parse {
                column: column.to_string(),
                value: String::new(),
            }),
        }
    }

    /// Reads the cell as a number, treating blank cells as zero.
    pub fn number_or_zero(&self, column: &str) -> Result<f64> {
        if self.is_blank() {
            Ok(0.0)
        } else {
            self.number(column)
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

fn parse_number(column: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| ToolError::Parse {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// A table that is read from, or will be materialised as, an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Merge vertical runs of equal values in the first column when written.
    pub merge_first_column: bool,
}

impl SheetTable {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
            merge_first_column: false,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.trim() == name)
    }

    /// Fails with every absent column listed, not just the first one.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::MissingColumn {
                sheet: self.sheet_name.clone(),
                columns: missing,
            })
        }
    }

    /// Index of a column that must exist.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ToolError::MissingColumn {
                sheet: self.sheet_name.clone(),
                columns: vec![name.to_string()],
            })
    }

    /// Cell at `column` of `row`; short rows read as empty cells.
    pub fn cell<'a>(&self, row: &'a [Cell], column: usize) -> &'a Cell {
        const EMPTY: &Cell = &Cell::Empty;
        row.get(column).unwrap_or(EMPTY)
    }
}

/// Represents all tables required to materialise an Excel workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn sheet_names(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|table| table.sheet_name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SheetTable {
        SheetTable::new(
            "1月",
            vec!["姓名".to_string(), " RD ".to_string(), "假日".to_string()],
        )
    }

    #[test]
    fn require_columns_lists_every_missing_name() {
        let error = table()
            .require_columns(&["姓名", "天数", "研发/辅助"])
            .unwrap_err();
        match error {
            ToolError::MissingColumn { sheet, columns } => {
                assert_eq!(sheet, "1月");
                assert_eq!(columns, vec!["天数", "研发/辅助"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn column_lookup_ignores_header_padding() {
        assert_eq!(table().column_index("RD"), Some(1));
    }

    #[test]
    fn numeric_cells_render_without_trailing_fraction() {
        assert_eq!(Cell::Number(12.0).text(), "12");
        assert_eq!(Cell::Number(1.5).text(), "1.5");
    }

    #[test]
    fn blank_cells_are_zero_only_when_allowed() {
        assert_eq!(Cell::Empty.number_or_zero("月工资/元").unwrap(), 0.0);
        assert!(Cell::Empty.number("天数").is_err());
        assert!(matches!(
            Cell::from("abc").number("天数"),
            Err(ToolError::Parse { .. })
        ));
        assert_eq!(Cell::from(" 31 ").number("天数").unwrap(), 31.0);
    }
}
