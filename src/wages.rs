//! Wage table: work and research hours joined with base salaries, with
//! salary and insurance prorated by each person's research-time fraction.

use std::collections::HashMap;

use crate::error::{Result, ToolError};
use crate::model::{Timesheet, WageRecord, WageTable};
use crate::schema::{self, HOURS_PER_DAY};
use crate::table::{Cell, SheetTable};

/// Monthly salary and insurance of one person from the base-salary workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseSalary {
    pub name: String,
    pub monthly_salary: f64,
    pub monthly_insurance: f64,
}

const BASE_SALARY_COLUMNS: [&str; 8] = [
    schema::SEQUENCE,
    schema::NAME,
    schema::MONTHLY_SALARY,
    schema::MONTHLY_RESEARCH_SALARY,
    schema::MONTHLY_INSURANCE,
    schema::MONTHLY_RESEARCH_INSURANCE,
    schema::TOTAL_WORK_HOURS,
    schema::TOTAL_RESEARCH_HOURS,
];

const WAGE_COLUMNS: [&str; 8] = [
    schema::SEQUENCE,
    schema::NAME,
    schema::TOTAL_WORK_HOURS,
    schema::TOTAL_RESEARCH_HOURS,
    schema::MONTHLY_SALARY,
    schema::MONTHLY_INSURANCE,
    schema::MONTHLY_RESEARCH_SALARY,
    schema::MONTHLY_RESEARCH_INSURANCE,
];

/// Reads the base-salary sheet. Blank money cells count as zero.
pub fn read_base_salaries(table: &SheetTable) -> Result<Vec<BaseSalary>> {
    table.require_columns(&BASE_SALARY_COLUMNS)?;
    let name_col = table.column(schema::NAME)?;
    let salary_col = table.column(schema::MONTHLY_SALARY)?;
    let insurance_col = table.column(schema::MONTHLY_INSURANCE)?;

    let mut salaries = Vec::new();
    for row in &table.rows {
        let name = table.cell(row, name_col).text();
        if name.is_empty() {
            continue;
        }
        salaries.push(BaseSalary {
            name,
            monthly_salary: table
                .cell(row, salary_col)
                .number_or_zero(schema::MONTHLY_SALARY)?,
            monthly_insurance: table
                .cell(row, insurance_col)
                .number_or_zero(schema::MONTHLY_INSURANCE)?,
        });
    }
    Ok(salaries)
}

/// Builds the wage table of one month.
///
/// Work hours are taken from a person's first timesheet row; research hours
/// are summed over all of their rows. People without a base salary are
/// dropped, and the remaining ones are numbered from 1 in first-seen order.
/// When a name appears twice in the base-salary sheet the later row wins.
pub fn aggregate_wages(timesheet: &Timesheet, salaries: &[BaseSalary]) -> Result<WageTable> {
    let mut records: Vec<WageRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in &timesheet.rows {
        let name = row.name.trim();
        match positions.get(name) {
            Some(&position) => {
                records[position].total_research_hours += row.research_days * HOURS_PER_DAY;
            }
            None => {
                positions.insert(name.to_string(), records.len());
                records.push(WageRecord {
                    name: name.to_string(),
                    total_work_hours: row.total_days * HOURS_PER_DAY,
                    total_research_hours: row.research_days * HOURS_PER_DAY,
                    ..WageRecord::default()
                });
            }
        }
    }

    let by_name: HashMap<&str, &BaseSalary> = salaries
        .iter()
        .map(|salary| (salary.name.as_str(), salary))
        .collect();

    let mut joined = Vec::with_capacity(records.len());
    for mut record in records {
        let Some(salary) = by_name.get(record.name.as_str()) else {
            continue;
        };
        if record.total_work_hours == 0.0 {
            return Err(ToolError::DivisionByZero { name: record.name });
        }
        let research_fraction = record.total_research_hours / record.total_work_hours;
        record.id = joined.len() + 1;
        record.monthly_salary = salary.monthly_salary;
        record.monthly_insurance = salary.monthly_insurance;
        record.monthly_research_salary = salary.monthly_salary * research_fraction;
        record.monthly_research_insurance = salary.monthly_insurance * research_fraction;
        joined.push(record);
    }

    let grand_total = sum_records(&joined);
    Ok(WageTable {
        records: joined,
        grand_total,
    })
}

fn sum_records(records: &[WageRecord]) -> WageRecord {
    records.iter().fold(WageRecord::default(), |mut total, record| {
        total.total_work_hours += record.total_work_hours;
        total.total_research_hours += record.total_research_hours;
        total.monthly_salary += record.monthly_salary;
        total.monthly_insurance += record.monthly_insurance;
        total.monthly_research_salary += record.monthly_research_salary;
        total.monthly_research_insurance += record.monthly_research_insurance;
        total
    })
}

fn record_cells(sequence: Cell, name: Cell, record: &WageRecord) -> Vec<Cell> {
    vec![
        sequence,
        name,
        Cell::Number(record.total_work_hours),
        Cell::Number(record.total_research_hours),
        Cell::Number(record.monthly_salary),
        Cell::Number(record.monthly_insurance),
        Cell::Number(record.monthly_research_salary),
        Cell::Number(record.monthly_research_insurance),
    ]
}

/// Renders the wage table with its trailing grand-total row.
pub fn to_table(sheet_name: &str, wages: &WageTable) -> SheetTable {
    let columns = WAGE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut table = SheetTable::new(sheet_name, columns);
    for record in &wages.records {
        table.push_row(record_cells(
            Cell::Number(record.id as f64),
            Cell::from(record.name.as_str()),
            record,
        ));
    }
    table.push_row(record_cells(
        Cell::from(schema::GRAND_TOTAL),
        Cell::Empty,
        &wages.grand_total,
    ));
    table
}

/// Reads the per-person records of a wage sheet, skipping the grand-total row.
pub fn from_table(table: &SheetTable) -> Result<Vec<WageRecord>> {
    table.require_columns(&WAGE_COLUMNS)?;
    let index = |name: &str| table.column(name);
    let sequence_col = index(schema::SEQUENCE)?;
    let name_col = index(schema::NAME)?;
    let work_col = index(schema::TOTAL_WORK_HOURS)?;
    let research_col = index(schema::TOTAL_RESEARCH_HOURS)?;
    let salary_col = index(schema::MONTHLY_SALARY)?;
    let insurance_col = index(schema::MONTHLY_INSURANCE)?;
    let research_salary_col = index(schema::MONTHLY_RESEARCH_SALARY)?;
    let research_insurance_col = index(schema::MONTHLY_RESEARCH_INSURANCE)?;

    let mut records = Vec::new();
    for row in &table.rows {
        let sequence = table.cell(row, sequence_col);
        let name = table.cell(row, name_col).text();
        if name.is_empty() || sequence.text() == schema::GRAND_TOTAL {
            continue;
        }
        let number = |col: usize, column: &str| table.cell(row, col).number_or_zero(column);
        records.push(WageRecord {
            id: sequence.number(schema::SEQUENCE)? as usize,
            name,
            total_work_hours: number(work_col, schema::TOTAL_WORK_HOURS)?,
            total_research_hours: number(research_col, schema::TOTAL_RESEARCH_HOURS)?,
            monthly_salary: number(salary_col, schema::MONTHLY_SALARY)?,
            monthly_insurance: number(insurance_col, schema::MONTHLY_INSURANCE)?,
            monthly_research_salary: number(research_salary_col, schema::MONTHLY_RESEARCH_SALARY)?,
            monthly_research_insurance: number(
                research_insurance_col,
                schema::MONTHLY_RESEARCH_INSURANCE,
            )?,
        });
    }
    Ok(records)
}
