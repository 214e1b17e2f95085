//! Header names shared by the workbooks the pipeline reads and writes.
//!
//! The names follow the attendance and payroll workbooks used by the finance
//! team, so generated files can be opened next to hand-maintained ones.

/// Person name.
pub const NAME: &str = "姓名";
/// Staff category, either [`RESEARCH_KIND`] or [`SUPPORT_KIND`].
pub const STAFF_KIND: &str = "研发/辅助";
pub const RESEARCH_KIND: &str = "研发";
pub const SUPPORT_KIND: &str = "辅助";
/// Project numbers a person works on.
pub const PROJECTS: &str = "RD";
/// Holiday day numbers of the month.
pub const HOLIDAYS: &str = "假日";
/// Number of calendar days in the month, read when no year is given.
pub const DAY_COUNT: &str = "天数";

pub const PROJECT: &str = "参与项目";
pub const TOTAL_DAYS: &str = "总天数";
pub const RESEARCH_DAYS: &str = "研发天数";

pub const SEQUENCE: &str = "序号";
pub const TOTAL_WORK_HOURS: &str = "总工作时间/小时";
pub const TOTAL_RESEARCH_HOURS: &str = "总研发时间/小时";
pub const MONTHLY_SALARY: &str = "月工资/元";
pub const MONTHLY_INSURANCE: &str = "月五险/元";
pub const MONTHLY_RESEARCH_SALARY: &str = "月研发工资/元";
pub const MONTHLY_RESEARCH_INSURANCE: &str = "月研发五险/元";

pub const TOTAL_HOURS: &str = "总工时/小时";
pub const TOTAL_SALARY: &str = "总工资/元";
pub const TOTAL_INSURANCE: &str = "五险一金/元";

/// Label placed in the sequence column of a grand-total row.
pub const GRAND_TOTAL: &str = "总和";

/// Hours credited for one full research day.
pub const HOURS_PER_DAY: f64 = 8.0;

/// Renders a project number the way project codes appear in every table.
pub fn project_code(number: u32) -> String {
    if number < 10 {
        format!("RD0{number}")
    } else {
        format!("RD{number}")
    }
}
