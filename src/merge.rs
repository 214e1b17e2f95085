//! Project-ordered presentation of a timesheet.

use crate::model::Timesheet;
use crate::table::SheetTable;
use crate::timesheet;

/// Orders rows by project, then by person. Rows are neither summed nor
/// dropped; equal (project, person) pairs keep their relative order.
pub fn merge_by_project(timesheet: &Timesheet) -> Timesheet {
    let mut rows = timesheet.rows.clone();
    rows.sort_by(|lhs, rhs| {
        lhs.project
            .cmp(&rhs.project)
            .then_with(|| lhs.name.cmp(&rhs.name))
    });
    Timesheet {
        days: timesheet.days.clone(),
        rows,
    }
}

/// Renders the merged timesheet with each project's cells merged into one.
pub fn to_table(sheet_name: &str, merged: &Timesheet) -> SheetTable {
    let mut table = timesheet::to_table(sheet_name, merged);
    table.merge_first_column = true;
    table
}
