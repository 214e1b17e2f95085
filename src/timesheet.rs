//! Per-person daily work hours derived from day allocations.

use rand::Rng;

use crate::allocate::allocate_days;
use crate::error::Result;
use crate::model::{Person, Timesheet, TimesheetRow};
use crate::schema::{self, HOURS_PER_DAY};
use crate::source::MonthCalendar;
use crate::table::{Cell, SheetTable};

/// Builds one timesheet row per (person, project) pair.
pub fn build_timesheet<R: Rng + ?Sized>(
    rng: &mut R,
    persons: &[Person],
    calendar: &MonthCalendar,
) -> Result<Timesheet> {
    let mut rows = Vec::new();
    for person in persons {
        rows.extend(build_person_rows(rng, person, calendar)?);
    }
    Ok(Timesheet {
        days: calendar.days.clone(),
        rows,
    })
}

/// Allocates a person's work days and turns every project's days into hours.
///
/// Research staff get 8 hours per allocated day and a research-day count equal
/// to their work days. Support staff get 1 or 2 hours per allocated day and a
/// research-day count of their hours divided by 8.
pub fn build_person_rows<R: Rng + ?Sized>(
    rng: &mut R,
    person: &Person,
    calendar: &MonthCalendar,
) -> Result<Vec<TimesheetRow>> {
    let allocation = allocate_days(
        rng,
        &calendar.work_days,
        person.total_work_days,
        person.project_count(),
    )?;

    let mut rows = Vec::with_capacity(person.project_count());
    for (index, project) in person.project_codes.iter().enumerate() {
        let assigned = allocation.project(index);
        let mut daily_hours = vec![0.0; calendar.days.len()];
        for &day in &calendar.work_days {
            if !assigned.contains(&day) {
                continue;
            }
            let Some(slot) = (day as usize)
                .checked_sub(1)
                .and_then(|index| daily_hours.get_mut(index))
            else {
                continue;
            };
            *slot = if person.is_research() {
                HOURS_PER_DAY
            } else {
                f64::from(rng.random_range(1u8..=2))
            };
        }

        let research_days = if person.is_research() {
            person.total_work_days as f64
        } else {
            daily_hours.iter().sum::<f64>() / HOURS_PER_DAY
        };

        rows.push(TimesheetRow {
            project: project.clone(),
            name: person.name.clone(),
            total_days: person.total_work_days as f64,
            research_days,
            daily_hours,
        });
    }
    Ok(rows)
}

fn header(days: &[u32]) -> Vec<String> {
    let mut columns = vec![
        schema::PROJECT.to_string(),
        schema::NAME.to_string(),
        schema::TOTAL_DAYS.to_string(),
        schema::RESEARCH_DAYS.to_string(),
    ];
    columns.extend(days.iter().map(u32::to_string));
    columns
}

/// Renders a timesheet as a sheet table.
pub fn to_table(sheet_name: &str, timesheet: &Timesheet) -> SheetTable {
    let mut table = SheetTable::new(sheet_name, header(&timesheet.days));
    for row in &timesheet.rows {
        let mut cells = vec![
            Cell::from(row.project.as_str()),
            Cell::from(row.name.as_str()),
            Cell::Number(row.total_days),
            Cell::Number(row.research_days),
        ];
        cells.extend(row.daily_hours.iter().map(|hours| Cell::Number(*hours)));
        table.push_row(cells);
    }
    table
}

/// Reads a timesheet sheet back into typed rows. Day columns are the columns
/// whose header is a day number.
pub fn from_table(table: &SheetTable) -> Result<Timesheet> {
    table.require_columns(&[
        schema::PROJECT,
        schema::NAME,
        schema::TOTAL_DAYS,
        schema::RESEARCH_DAYS,
    ])?;
    let project_col = table.column(schema::PROJECT)?;
    let name_col = table.column(schema::NAME)?;
    let total_col = table.column(schema::TOTAL_DAYS)?;
    let research_col = table.column(schema::RESEARCH_DAYS)?;

    let day_columns: Vec<(usize, u32)> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(index, header)| header.trim().parse::<u32>().ok().map(|day| (index, day)))
        .collect();

    let mut rows = Vec::new();
    for row in &table.rows {
        let project = table.cell(row, project_col).text();
        let name = table.cell(row, name_col).text();
        if project.is_empty() && name.is_empty() {
            continue;
        }
        let daily_hours = day_columns
            .iter()
            .map(|(index, day)| table.cell(row, *index).number_or_zero(&day.to_string()))
            .collect::<Result<Vec<_>>>()?;
        rows.push(TimesheetRow {
            project,
            name,
            total_days: table.cell(row, total_col).number(schema::TOTAL_DAYS)?,
            research_days: table.cell(row, research_col).number(schema::RESEARCH_DAYS)?,
            daily_hours,
        });
    }

    Ok(Timesheet {
        days: day_columns.into_iter().map(|(_, day)| day).collect(),
        rows,
    })
}
