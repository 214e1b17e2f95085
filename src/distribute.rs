//! Per-project split of a monthly salary or insurance amount.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ToolError};
use crate::model::{
    DistributionKind, ProjectDistribution, ProjectDistributionRow, TimeStatistics, WageRecord,
};
use crate::schema;
use crate::table::{Cell, SheetTable};

impl DistributionKind {
    /// The wage figure that is spread over projects.
    pub fn amount(self, record: &WageRecord) -> f64 {
        match self {
            DistributionKind::Salary => record.monthly_salary,
            DistributionKind::Insurance => record.monthly_research_insurance,
        }
    }

    /// Header of the amount column in the distribution table.
    pub fn label(self) -> &'static str {
        match self {
            DistributionKind::Salary => schema::TOTAL_SALARY,
            DistributionKind::Insurance => schema::TOTAL_INSURANCE,
        }
    }

    /// Stage name used in logs, errors and the run manifest.
    pub fn stage(self) -> &'static str {
        match self {
            DistributionKind::Salary => "salary distribution",
            DistributionKind::Insurance => "insurance distribution",
        }
    }
}

/// Splits each person's amount across projects in proportion to their hours.
///
/// People are matched by name and keep the order of the statistics table;
/// anyone missing from the wage records is skipped.
pub fn distribute(
    statistics: &TimeStatistics,
    wages: &[WageRecord],
    kind: DistributionKind,
) -> Result<ProjectDistribution> {
    let by_name: HashMap<&str, &WageRecord> = wages
        .iter()
        .map(|record| (record.name.as_str(), record))
        .collect();

    let mut rows = Vec::new();
    for stats in &statistics.rows {
        let Some(record) = by_name.get(stats.name.as_str()) else {
            continue;
        };
        if stats.total_hours == 0.0 {
            return Err(ToolError::DivisionByZero {
                name: stats.name.clone(),
            });
        }
        let amount = kind.amount(record);
        let per_project = statistics
            .projects
            .iter()
            .map(|project| {
                let hours = stats.hours.get(project).copied().unwrap_or(0.0);
                (project.clone(), hours / stats.total_hours * amount)
            })
            .collect();
        rows.push(ProjectDistributionRow {
            name: stats.name.clone(),
            per_project,
            total: amount,
        });
    }

    let grand_total = sum_rows(&statistics.projects, &rows);
    Ok(ProjectDistribution {
        kind,
        projects: statistics.projects.clone(),
        rows,
        grand_total,
    })
}

fn sum_rows(projects: &[String], rows: &[ProjectDistributionRow]) -> ProjectDistributionRow {
    let mut per_project: BTreeMap<String, f64> =
        projects.iter().map(|project| (project.clone(), 0.0)).collect();
    let mut total = 0.0;
    for row in rows {
        for (project, value) in &row.per_project {
            *per_project.entry(project.clone()).or_insert(0.0) += value;
        }
        total += row.total;
    }
    ProjectDistributionRow {
        name: String::new(),
        per_project,
        total,
    }
}

/// Renders the distribution with its trailing grand-total row.
pub fn to_table(sheet_name: &str, distribution: &ProjectDistribution) -> SheetTable {
    let mut columns = vec![schema::SEQUENCE.to_string(), schema::NAME.to_string()];
    columns.extend(distribution.projects.iter().cloned());
    columns.push(distribution.kind.label().to_string());

    let render = |sequence: Cell, name: Cell, row: &ProjectDistributionRow| {
        let mut cells = vec![sequence, name];
        cells.extend(
            distribution
                .projects
                .iter()
                .map(|project| Cell::Number(row.per_project.get(project).copied().unwrap_or(0.0))),
        );
        cells.push(Cell::Number(row.total));
        cells
    };

    let mut table = SheetTable::new(sheet_name, columns);
    for (index, row) in distribution.rows.iter().enumerate() {
        table.push_row(render(
            Cell::Number((index + 1) as f64),
            Cell::from(row.name.as_str()),
            row,
        ));
    }
    table.push_row(render(
        Cell::from(schema::GRAND_TOTAL),
        Cell::Empty,
        &distribution.grand_total,
    ));
    table
}
