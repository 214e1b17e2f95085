//! Person x project research-hour pivot of a timesheet.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::Result;
use crate::model::{Timesheet, TimeStatistics, TimeStatisticsRow};
use crate::schema::{self, HOURS_PER_DAY};
use crate::table::{Cell, SheetTable};

/// Pivots a timesheet into one row per person and one column per project.
///
/// People keep their first-seen order; projects are sorted so the column
/// layout is stable across months. When a person has several rows for the
/// same project the first one counts.
pub fn aggregate_time(timesheet: &Timesheet) -> TimeStatistics {
    let projects: BTreeSet<&str> = timesheet
        .rows
        .iter()
        .map(|row| row.project.as_str())
        .collect();

    let mut rows: Vec<TimeStatisticsRow> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut recorded: HashSet<(&str, &str)> = HashSet::new();
    for row in &timesheet.rows {
        let name = row.name.trim();
        let position = *positions.entry(name).or_insert_with(|| {
            rows.push(TimeStatisticsRow {
                name: name.to_string(),
                hours: projects
                    .iter()
                    .map(|project| (project.to_string(), 0.0))
                    .collect(),
                total_hours: 0.0,
            });
            rows.len() - 1
        });
        if recorded.insert((name, row.project.as_str())) {
            rows[position]
                .hours
                .insert(row.project.clone(), row.research_days * HOURS_PER_DAY);
        }
    }

    for entry in &mut rows {
        entry.total_hours = entry.hours.values().sum();
    }

    TimeStatistics {
        projects: projects.into_iter().map(str::to_string).collect(),
        rows,
    }
}

/// Renders the pivot: sequence, name, one column per project, total hours.
pub fn to_table(sheet_name: &str, statistics: &TimeStatistics) -> SheetTable {
    let mut columns = vec![schema::SEQUENCE.to_string(), schema::NAME.to_string()];
    columns.extend(statistics.projects.iter().cloned());
    columns.push(schema::TOTAL_HOURS.to_string());

    let mut table = SheetTable::new(sheet_name, columns);
    for (index, row) in statistics.rows.iter().enumerate() {
        let mut cells = vec![Cell::Number((index + 1) as f64), Cell::from(row.name.as_str())];
        cells.extend(
            statistics
                .projects
                .iter()
                .map(|project| Cell::Number(row.hours.get(project).copied().unwrap_or(0.0))),
        );
        cells.push(Cell::Number(row.total_hours));
        table.push_row(cells);
    }
    table
}

/// Reads a statistics sheet. Every column other than sequence, name and
/// total hours is a project column.
pub fn from_table(table: &SheetTable) -> Result<TimeStatistics> {
    table.require_columns(&[schema::SEQUENCE, schema::NAME, schema::TOTAL_HOURS])?;
    let name_col = table.column(schema::NAME)?;
    let total_col = table.column(schema::TOTAL_HOURS)?;

    let project_columns: Vec<(usize, String)> = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, header)| (index, header.trim().to_string()))
        .filter(|(_, header)| {
            !header.is_empty()
                && header != schema::SEQUENCE
                && header != schema::NAME
                && header != schema::TOTAL_HOURS
        })
        .collect();

    let mut rows = Vec::new();
    for row in &table.rows {
        let name = table.cell(row, name_col).text();
        if name.is_empty() {
            continue;
        }
        let mut hours = BTreeMap::new();
        for (index, project) in &project_columns {
            hours.insert(project.clone(), table.cell(row, *index).number_or_zero(project)?);
        }
        rows.push(TimeStatisticsRow {
            name,
            hours,
            total_hours: table.cell(row, total_col).number_or_zero(schema::TOTAL_HOURS)?,
        });
    }

    let mut projects: Vec<String> = project_columns.into_iter().map(|(_, project)| project).collect();
    projects.sort();
    Ok(TimeStatistics { projects, rows })
}
