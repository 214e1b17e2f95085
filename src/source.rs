//! Parsing of the monthly attendance sheet into people and work days.

use chrono::NaiveDate;

use crate::error::{Result, ToolError};
use crate::model::{Person, StaffKind};
use crate::schema;
use crate::table::{Cell, SheetTable};

/// Days of one month and the subset that are work days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCalendar {
    /// Every calendar day, `1..=len`.
    pub days: Vec<u32>,
    /// Calendar days minus holidays, ascending.
    pub work_days: Vec<u32>,
}

impl MonthCalendar {
    pub fn new(len: u32, holidays: &[u32]) -> Self {
        let days: Vec<u32> = (1..=len).collect();
        let work_days = days
            .iter()
            .copied()
            .filter(|day| !holidays.contains(day))
            .collect();
        Self { days, work_days }
    }
}

/// People and calendar parsed from one attendance sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSource {
    pub calendar: MonthCalendar,
    pub persons: Vec<Person>,
}

/// Number of days of the month at `sheet_index` (0 = January) of `year`.
pub fn days_in_month(year: i32, sheet_index: usize) -> Result<u32> {
    if sheet_index >= 12 {
        return Err(ToolError::SheetIndexOutOfRange {
            index: sheet_index,
            len: 12,
        });
    }
    let month = sheet_index as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("invalid year {year}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ToolError::InvalidWorkbook(format!("invalid year {year}")))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Parses an attendance sheet.
///
/// With a `year` the month length comes from the calendar, using the sheet's
/// position as the month; without one it is read from the first row of the
/// day-count column.
pub fn parse_source(table: &SheetTable, sheet_index: usize, year: Option<i32>) -> Result<MonthSource> {
    table.require_columns(&[
        schema::NAME,
        schema::STAFF_KIND,
        schema::PROJECTS,
        schema::HOLIDAYS,
    ])?;
    let name_col = table.column(schema::NAME)?;
    let kind_col = table.column(schema::STAFF_KIND)?;
    let projects_col = table.column(schema::PROJECTS)?;
    let holidays_col = table.column(schema::HOLIDAYS)?;

    let month_len = match year {
        Some(year) => days_in_month(year, sheet_index)?,
        None => read_day_count(table)?,
    };

    let mut holidays = Vec::new();
    for row in &table.rows {
        holidays.extend(parse_numbers(schema::HOLIDAYS, table.cell(row, holidays_col))?);
    }
    let calendar = MonthCalendar::new(month_len, &holidays);

    let mut persons = Vec::new();
    for row in &table.rows {
        let name = table.cell(row, name_col).text();
        if name.is_empty() {
            continue;
        }
        let kind = if table.cell(row, kind_col).text() == schema::RESEARCH_KIND {
            StaffKind::Research
        } else {
            StaffKind::Support
        };
        let mut project_codes: Vec<String> = Vec::new();
        for number in parse_numbers(schema::PROJECTS, table.cell(row, projects_col))? {
            let code = schema::project_code(number);
            if !project_codes.contains(&code) {
                project_codes.push(code);
            }
        }
        persons.push(Person {
            name,
            kind,
            total_work_days: calendar.work_days.len(),
            project_codes,
        });
    }

    Ok(MonthSource { calendar, persons })
}

fn read_day_count(table: &SheetTable) -> Result<u32> {
    let column = table.column(schema::DAY_COUNT)?;
    let Some(row) = table.rows.first() else {
        return Err(ToolError::Parse {
            column: schema::DAY_COUNT.to_string(),
            value: String::new(),
        });
    };
    let cell = table.cell(row, column);
    let value = cell.number(schema::DAY_COUNT)?;
    whole_number(schema::DAY_COUNT, value, &cell.text())
}

/// Splits a cell holding one number or a comma separated list of numbers.
fn parse_numbers(column: &str, cell: &Cell) -> Result<Vec<u32>> {
    match cell {
        Cell::Empty => Ok(Vec::new()),
        Cell::Number(value) => Ok(vec![whole_number(column, *value, &cell.text())?]),
        Cell::Text(text) => text
            .split([',', '，'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let value = part.parse::<f64>().map_err(|_| ToolError::Parse {
                    column: column.to_string(),
                    value: part.to_string(),
                })?;
                whole_number(column, value, part)
            })
            .collect(),
    }
}

fn whole_number(column: &str, value: f64, raw: &str) -> Result<u32> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(ToolError::Parse {
            column: column.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(value as u32)
}
