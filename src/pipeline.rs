//! File-to-file stages. Each stage reads every sheet (month) of its input
//! workbook(s) and writes one output workbook with a sheet per month.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::distribute;
use crate::error::{Result, ToolError};
use crate::io::{excel_read, excel_write};
use crate::merge;
use crate::model::DistributionKind;
use crate::source;
use crate::statistics;
use crate::table::{SheetTable, WorkbookData};
use crate::timesheet;
use crate::wages;

pub const TIMESHEET_FILE: &str = "工时表.xlsx";
pub const MERGED_TIMESHEET_FILE: &str = "工时表(合并RD).xlsx";
pub const WAGES_FILE: &str = "工资表.xlsx";
pub const TIME_STATISTICS_FILE: &str = "工时统计表.xlsx";
pub const SALARY_DISTRIBUTION_FILE: &str = "研发项目工资表.xlsx";
pub const INSURANCE_DISTRIBUTION_FILE: &str = "各研发项目五险一金明细表.xlsx";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Salary workbooks carry a title row above their header.
const SALARY_HEADER_ROW: usize = 1;

/// Inputs of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Attendance workbook, one sheet per month.
    pub source: PathBuf,
    /// Base-salary workbook, sheets paired with the source sheets by position.
    pub salary: PathBuf,
    /// Target year; `None` reads month lengths from the day-count column.
    pub year: Option<i32>,
    pub output_dir: PathBuf,
    /// Attendance sheets to process, by name or position; `None` processes
    /// every sheet.
    pub sheets: Option<Vec<String>>,
    /// Base-salary sheets paired with the processed months. Defaults to the
    /// attendance selection when only that one is given.
    pub salary_sheets: Option<Vec<String>>,
    /// Seed of the day allocator, recorded so a run can be reproduced.
    pub seed: u64,
}

/// One workbook written by a stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutput {
    pub stage: &'static str,
    pub path: PathBuf,
    pub sheets: Vec<String>,
}

/// Summary of a full run, written next to the generated workbooks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    pub config: PipelineConfig,
    pub outputs: Vec<StageOutput>,
}

/// Runs every stage in order and writes the run manifest.
#[instrument(
    level = "info",
    skip_all,
    fields(source = %config.source.display(), salary = %config.salary.display(), seed = config.seed)
)]
pub fn run(config: &PipelineConfig) -> Result<RunManifest> {
    fs::create_dir_all(&config.output_dir)?;
    let dir = &config.output_dir;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut outputs = Vec::new();

    let timesheet_path = dir.join(TIMESHEET_FILE);
    let sheets = generate_timesheet(
        &config.source,
        &timesheet_path,
        config.year,
        config.sheets.as_deref(),
        &mut rng,
    )?;
    outputs.push(output("timesheet", &timesheet_path, sheets));

    let merged_path = dir.join(MERGED_TIMESHEET_FILE);
    let sheets = merge_timesheet(&timesheet_path, &merged_path)?;
    outputs.push(output("merge", &merged_path, sheets));

    let wages_path = dir.join(WAGES_FILE);
    let salary_sheets = config.salary_sheets.as_deref().or(config.sheets.as_deref());
    let sheets = generate_wages(&timesheet_path, &config.salary, &wages_path, None, salary_sheets)?;
    outputs.push(output("wages", &wages_path, sheets));

    let statistics_path = dir.join(TIME_STATISTICS_FILE);
    let sheets = generate_time_statistics(&timesheet_path, &statistics_path, None)?;
    outputs.push(output("statistics", &statistics_path, sheets));

    for (kind, file) in [
        (DistributionKind::Salary, SALARY_DISTRIBUTION_FILE),
        (DistributionKind::Insurance, INSURANCE_DISTRIBUTION_FILE),
    ] {
        let path = dir.join(file);
        let sheets = distribute(&statistics_path, &wages_path, &path, kind)?;
        outputs.push(output(kind.stage(), &path, sheets));
    }

    let manifest = RunManifest {
        config: config.clone(),
        outputs,
    };
    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    info!(manifest = %manifest_path.display(), "pipeline finished");
    Ok(manifest)
}

fn output(stage: &'static str, path: &Path, sheets: Vec<String>) -> StageOutput {
    StageOutput {
        stage,
        path: path.to_path_buf(),
        sheets,
    }
}

/// Generates the timesheet workbook from the attendance workbook.
///
/// With a year, a sheet's month is its position in the workbook, whether or
/// not every sheet is selected.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display(), ?year, ?selection)
)]
pub fn generate_timesheet<R: Rng + ?Sized>(
    input: &Path,
    output: &Path,
    year: Option<i32>,
    selection: Option<&[String]>,
    rng: &mut R,
) -> Result<Vec<String>> {
    let all_sheets = excel_read::list_sheets(input)?;
    let sheets = excel_read::select_sheets(input, selection)?;
    write_sheets("timesheet", &sheets, output, |index, sheet| {
        let month_index = all_sheets
            .iter()
            .position(|name| name == sheet)
            .unwrap_or(index);
        let table = excel_read::read_table(input, sheet, 0)?;
        let month = source::parse_source(&table, month_index, year)?;
        info!(
            sheet,
            persons = month.persons.len(),
            work_days = month.calendar.work_days.len(),
            "attendance parsed"
        );
        let timesheet = timesheet::build_timesheet(&mut *rng, &month.persons, &month.calendar)?;
        Ok(timesheet::to_table(sheet, &timesheet))
    })
}

/// Writes the timesheet ordered by project, with project cells merged.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn merge_timesheet(input: &Path, output: &Path) -> Result<Vec<String>> {
    let sheets = excel_read::list_sheets(input)?;
    write_sheets("merge", &sheets, output, |_, sheet| {
        let timesheet = timesheet::from_table(&excel_read::read_table(input, sheet, 0)?)?;
        Ok(merge::to_table(sheet, &merge::merge_by_project(&timesheet)))
    })
}

/// Joins the timesheet with base salaries into the wage workbook. The n-th
/// selected timesheet sheet is paired with the n-th selected salary sheet.
#[instrument(
    level = "info",
    skip_all,
    fields(
        timesheet = %timesheet_path.display(),
        salary = %salary_path.display(),
        output = %output.display(),
        ?timesheet_selection,
        ?salary_selection
    )
)]
pub fn generate_wages(
    timesheet_path: &Path,
    salary_path: &Path,
    output: &Path,
    timesheet_selection: Option<&[String]>,
    salary_selection: Option<&[String]>,
) -> Result<Vec<String>> {
    let sheets = excel_read::select_sheets(timesheet_path, timesheet_selection)?;
    let salary_sheets = excel_read::select_sheets(salary_path, salary_selection)?;
    write_sheets("wages", &sheets, output, |index, sheet| {
        let salary_sheet = paired_sheet(&salary_sheets, index)?;
        let timesheet = timesheet::from_table(&excel_read::read_table(timesheet_path, sheet, 0)?)?;
        let salaries = wages::read_base_salaries(&excel_read::read_table(
            salary_path,
            salary_sheet,
            SALARY_HEADER_ROW,
        )?)?;
        let wage_table = wages::aggregate_wages(&timesheet, &salaries)?;
        info!(sheet, salary_sheet, people = wage_table.records.len(), "wages aggregated");
        Ok(wages::to_table(sheet, &wage_table))
    })
}

/// Pivots the timesheet into the person x project hour workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display(), ?selection)
)]
pub fn generate_time_statistics(
    input: &Path,
    output: &Path,
    selection: Option<&[String]>,
) -> Result<Vec<String>> {
    let sheets = excel_read::select_sheets(input, selection)?;
    write_sheets("statistics", &sheets, output, |_, sheet| {
        let timesheet = timesheet::from_table(&excel_read::read_table(input, sheet, 0)?)?;
        let statistics = statistics::aggregate_time(&timesheet);
        Ok(statistics::to_table(sheet, &statistics))
    })
}

/// Spreads salary or insurance over projects using the statistics and wage
/// workbooks.
#[instrument(
    level = "info",
    skip_all,
    fields(statistics = %statistics_path.display(), wages = %wages_path.display(), output = %output.display(), ?kind)
)]
pub fn distribute(
    statistics_path: &Path,
    wages_path: &Path,
    output: &Path,
    kind: DistributionKind,
) -> Result<Vec<String>> {
    let sheets = excel_read::list_sheets(statistics_path)?;
    let wage_sheets = excel_read::list_sheets(wages_path)?;
    write_sheets(kind.stage(), &sheets, output, |index, sheet| {
        let wage_sheet = paired_sheet(&wage_sheets, index)?;
        let statistics =
            statistics::from_table(&excel_read::read_table(statistics_path, sheet, 0)?)?;
        let records = wages::from_table(&excel_read::read_table(wages_path, wage_sheet, 0)?)?;
        let distribution = distribute::distribute(&statistics, &records, kind)?;
        Ok(distribute::to_table(sheet, &distribution))
    })
}

fn paired_sheet(sheets: &[String], index: usize) -> Result<&str> {
    sheets
        .get(index)
        .map(String::as_str)
        .ok_or(ToolError::SheetIndexOutOfRange {
            index,
            len: sheets.len(),
        })
}

/// Builds one table per sheet and writes them all to `output`.
///
/// When a sheet fails, the sheets completed before it are still written and
/// the error is returned tagged with the stage and sheet name.
fn write_sheets<F>(stage: &'static str, sheets: &[String], output: &Path, mut build: F) -> Result<Vec<String>>
where
    F: FnMut(usize, &str) -> Result<SheetTable>,
{
    info!(stage, sheet_count = sheets.len(), "stage started");
    let mut workbook = WorkbookData::default();
    for (index, sheet) in sheets.iter().enumerate() {
        match build(index, sheet) {
            Ok(table) => workbook.tables.push(table),
            Err(source) => {
                error!(stage, sheet = %sheet, error = %source, "sheet failed");
                if !workbook.tables.is_empty() {
                    excel_write::write_workbook(output, &workbook)?;
                }
                return Err(ToolError::Stage {
                    stage,
                    sheet: sheet.clone(),
                    source: Box::new(source),
                });
            }
        }
    }
    excel_write::write_workbook(output, &workbook)?;
    info!(stage, output = %output.display(), "stage finished");
    Ok(workbook.sheet_names())
}
