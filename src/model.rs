use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether a person's hours count fully as research time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffKind {
    /// Every worked hour is research time.
    Research,
    /// Only a random fraction of worked time is research time.
    Support,
}

/// One row of the attendance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub kind: StaffKind,
    /// Number of day slots the person fills this month.
    pub total_work_days: usize,
    /// Project codes in sheet order, without duplicates.
    pub project_codes: Vec<String>,
}

impl Person {
    pub fn is_research(&self) -> bool {
        self.kind == StaffKind::Research
    }

    pub fn project_count(&self) -> usize {
        self.project_codes.len()
    }
}

/// Calendar days assigned to each of a person's projects, indexed like
/// [`Person::project_codes`]. A project's list may contain the same day twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayAllocation {
    pub days: Vec<Vec<u32>>,
}

impl DayAllocation {
    pub fn project(&self, index: usize) -> &[u32] {
        self.days.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of assigned day slots across every project.
    pub fn total_slots(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }
}

/// One (project, person) row of the timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetRow {
    pub project: String,
    pub name: String,
    pub total_days: f64,
    pub research_days: f64,
    /// Hours per calendar day; index `d - 1` holds day `d`.
    pub daily_hours: Vec<f64>,
}

/// A month of timesheet rows together with its calendar day columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timesheet {
    pub days: Vec<u32>,
    pub rows: Vec<TimesheetRow>,
}

/// Per-person wage figures of one month.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WageRecord {
    pub id: usize,
    pub name: String,
    pub total_work_hours: f64,
    pub total_research_hours: f64,
    pub monthly_salary: f64,
    pub monthly_insurance: f64,
    pub monthly_research_salary: f64,
    pub monthly_research_insurance: f64,
}

/// Wage records of one month plus their column sums.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WageTable {
    pub records: Vec<WageRecord>,
    pub grand_total: WageRecord,
}

/// Research hours of one person split by project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStatisticsRow {
    pub name: String,
    pub hours: BTreeMap<String, f64>,
    pub total_hours: f64,
}

/// Person x project hour pivot of one month. `projects` is sorted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeStatistics {
    pub projects: Vec<String>,
    pub rows: Vec<TimeStatisticsRow>,
}

/// A person's monetary amount split across projects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectDistributionRow {
    pub name: String,
    pub per_project: BTreeMap<String, f64>,
    pub total: f64,
}

/// Which wage column is spread across projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    Salary,
    Insurance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDistribution {
    pub kind: DistributionKind,
    pub projects: Vec<String>,
    pub rows: Vec<ProjectDistributionRow>,
    pub grand_total: ProjectDistributionRow,
}
