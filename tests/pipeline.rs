use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rd_ledger::io::{excel_read, excel_write};
use rd_ledger::model::DistributionKind;
use rd_ledger::pipeline::{self, PipelineConfig};
use rd_ledger::table::{Cell, SheetTable, WorkbookData};
use rd_ledger::{ToolError, statistics, timesheet, wages};
use tempfile::tempdir;

const MONTHS: [&str; 2] = ["1月", "2月"];

fn text(value: &str) -> Cell {
    Cell::from(value)
}

fn number(value: f64) -> Cell {
    Cell::Number(value)
}

fn attendance_sheet(name: &str) -> SheetTable {
    let columns = ["姓名", "研发/辅助", "RD", "假日", "天数"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut table = SheetTable::new(name, columns);
    table.push_row(vec![text("张三"), text("研发"), text("1,2"), number(1.0), number(31.0)]);
    table.push_row(vec![text("李四"), text("辅助"), number(3.0), number(7.0), Cell::Empty]);
    table.push_row(vec![text(" 王五 "), text("研发"), number(3.0), number(8.0), Cell::Empty]);
    table.push_row(vec![Cell::Empty, Cell::Empty, Cell::Empty, text("14,15"), Cell::Empty]);
    table
}

fn salary_sheet(name: &str, with_insurance: bool) -> SheetTable {
    let mut header = vec!["序号", "姓名", "月工资/元", "月研发工资/元"];
    if with_insurance {
        header.push("月五险/元");
    }
    header.extend(["月研发五险/元", "总工作时间/小时", "总研发时间/小时"]);

    let mut table = SheetTable::new(name, vec!["研发人员工资表".to_string()]);
    table.push_row(header.into_iter().map(text).collect());
    for (id, person, salary, insurance) in [
        (1.0, "张三", 12000.0, 1500.0),
        (2.0, "李四", 8000.0, 900.0),
        (3.0, "王五", 10000.0, 1200.0),
    ] {
        let mut row = vec![number(id), text(person), number(salary), Cell::Empty];
        if with_insurance {
            row.push(number(insurance));
        }
        row.extend([Cell::Empty, Cell::Empty, Cell::Empty]);
        table.push_row(row);
    }
    table
}

fn write_inputs(dir: &Path, insurance_in_second_month: bool) -> (PathBuf, PathBuf) {
    let source = dir.join("attendance.xlsx");
    let salary = dir.join("salary.xlsx");
    excel_write::write_workbook(
        &source,
        &WorkbookData {
            tables: MONTHS.iter().map(|m| attendance_sheet(m)).collect(),
        },
    )
    .expect("attendance written");
    excel_write::write_workbook(
        &salary,
        &WorkbookData {
            tables: vec![
                salary_sheet(MONTHS[0], true),
                salary_sheet(MONTHS[1], insurance_in_second_month),
            ],
        },
    )
    .expect("salary written");
    (source, salary)
}

fn config(source: PathBuf, salary: PathBuf, output_dir: PathBuf, seed: u64) -> PipelineConfig {
    PipelineConfig {
        source,
        salary,
        year: None,
        output_dir,
        sheets: None,
        salary_sheets: None,
        seed,
    }
}

#[test]
fn full_run_writes_every_workbook_and_manifest() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, salary) = write_inputs(temp_dir.path(), true);
    let output_dir = temp_dir.path().join("outputs");

    let manifest =
        pipeline::run(&config(source, salary, output_dir.clone(), 2024)).expect("pipeline run");

    assert_eq!(manifest.outputs.len(), 6);
    for output in &manifest.outputs {
        assert!(output.path.is_file(), "{} missing", output.path.display());
        assert_eq!(output.sheets, MONTHS);
    }

    let written = fs::read_to_string(output_dir.join(pipeline::MANIFEST_FILE)).expect("manifest");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("manifest JSON");
    assert_eq!(parsed["config"]["seed"], 2024);
}

#[test]
fn derived_tables_agree_with_each_other() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, salary) = write_inputs(temp_dir.path(), true);
    let output_dir = temp_dir.path().join("outputs");
    pipeline::run(&config(source, salary, output_dir.clone(), 7)).expect("pipeline run");

    let sheet = MONTHS[0];
    let timesheet_table =
        excel_read::read_table(&output_dir.join(pipeline::TIMESHEET_FILE), sheet, 0).unwrap();
    let month = timesheet::from_table(&timesheet_table).unwrap();
    assert_eq!(month.days.len(), 31);
    assert_eq!(month.rows.len(), 4);

    // 31 days minus holidays 1, 7, 8, 14 and 15.
    for row in month.rows.iter().filter(|row| row.name != "李四") {
        assert_eq!(row.total_days, 26.0);
        assert_eq!(row.research_days, 26.0);
        assert!(row.daily_hours.iter().all(|h| *h == 0.0 || *h == 8.0));
        for holiday in [1usize, 7, 8, 14, 15] {
            assert_eq!(row.daily_hours[holiday - 1], 0.0);
        }
    }
    let support = month.rows.iter().find(|row| row.name == "李四").unwrap();
    let support_hours: f64 = support.daily_hours.iter().sum();
    assert_eq!(support.research_days, support_hours / 8.0);

    let wage_table = excel_read::read_table(&output_dir.join(pipeline::WAGES_FILE), sheet, 0).unwrap();
    let records = wages::from_table(&wage_table).unwrap();
    assert_eq!(records.len(), 3);
    for record in &records {
        let expected = record.monthly_salary * record.total_research_hours / record.total_work_hours;
        assert!((record.monthly_research_salary - expected).abs() < 1e-6);
    }
    let last = wage_table.rows.last().unwrap();
    assert_eq!(last[0], text("总和"));
    let salary_sum: f64 = records.iter().map(|r| r.monthly_salary).sum();
    assert_eq!(last[4], number(salary_sum));

    let stats_table =
        excel_read::read_table(&output_dir.join(pipeline::TIME_STATISTICS_FILE), sheet, 0).unwrap();
    let stats = statistics::from_table(&stats_table).unwrap();
    assert_eq!(stats.projects, vec!["RD01", "RD02", "RD03"]);
    assert_eq!(stats.rows[0].name, "张三");
    assert_eq!(stats.rows[0].total_hours, 2.0 * 26.0 * 8.0);
    assert_eq!(stats.rows[2].name, "王五");
    assert_eq!(stats.rows[2].hours["RD03"], 26.0 * 8.0);

    let distribution = excel_read::read_table(
        &output_dir.join(pipeline::SALARY_DISTRIBUTION_FILE),
        sheet,
        0,
    )
    .unwrap();
    assert_eq!(
        distribution.columns,
        vec!["序号", "姓名", "RD01", "RD02", "RD03", "总工资/元"]
    );
    let (people, total_row) = distribution.rows.split_at(distribution.rows.len() - 1);
    for row in people {
        let split: f64 = row[2..5].iter().map(|c| c.number("RD").unwrap()).sum();
        let amount = row[5].number("总工资/元").unwrap();
        assert!((split - amount).abs() < 1e-6);
    }
    let total_row = &total_row[0];
    assert_eq!(total_row[0], text("总和"));
    for column in 2..6 {
        let sum: f64 = people.iter().map(|row| row[column].number("sum").unwrap()).sum();
        assert!((total_row[column].number("sum").unwrap() - sum).abs() < 1e-6);
    }
}

#[test]
fn same_seed_reproduces_the_timesheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, _) = write_inputs(temp_dir.path(), true);

    let first = temp_dir.path().join("first.xlsx");
    let second = temp_dir.path().join("second.xlsx");
    pipeline::generate_timesheet(&source, &first, Some(2023), None, &mut StdRng::seed_from_u64(5))
        .unwrap();
    pipeline::generate_timesheet(&source, &second, Some(2023), None, &mut StdRng::seed_from_u64(5))
        .unwrap();

    for sheet in MONTHS {
        let lhs = timesheet::from_table(&excel_read::read_table(&first, sheet, 0).unwrap()).unwrap();
        let rhs = timesheet::from_table(&excel_read::read_table(&second, sheet, 0).unwrap()).unwrap();
        assert_eq!(lhs, rhs);
    }
    let february = timesheet::from_table(&excel_read::read_table(&first, MONTHS[1], 0).unwrap()).unwrap();
    assert_eq!(february.days.len(), 28);
}

#[test]
fn failing_sheet_keeps_earlier_sheets_and_names_the_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, salary) = write_inputs(temp_dir.path(), false);
    let timesheet_path = temp_dir.path().join("timesheet.xlsx");
    let wages_path = temp_dir.path().join("wages.xlsx");

    pipeline::generate_timesheet(&source, &timesheet_path, None, None, &mut StdRng::seed_from_u64(1))
        .unwrap();
    let error =
        pipeline::generate_wages(&timesheet_path, &salary, &wages_path, None, None).unwrap_err();

    match error {
        ToolError::Stage { stage, sheet, source } => {
            assert_eq!(stage, "wages");
            assert_eq!(sheet, MONTHS[1]);
            assert!(matches!(*source, ToolError::MissingColumn { ref columns, .. } if columns == &vec!["月五险/元".to_string()]));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(excel_read::list_sheets(&wages_path).unwrap(), vec![MONTHS[0]]);
}

#[test]
fn distribution_rejects_missing_wage_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, salary) = write_inputs(temp_dir.path(), true);
    let output_dir = temp_dir.path().join("outputs");
    pipeline::run(&config(source, salary, output_dir.clone(), 3)).expect("pipeline run");

    let single_month_wages = temp_dir.path().join("wages-january.xlsx");
    let table = excel_read::read_table(&output_dir.join(pipeline::WAGES_FILE), MONTHS[0], 0).unwrap();
    excel_write::write_workbook(&single_month_wages, &WorkbookData { tables: vec![table] }).unwrap();

    let error = pipeline::distribute(
        &output_dir.join(pipeline::TIME_STATISTICS_FILE),
        &single_month_wages,
        &temp_dir.path().join("distribution.xlsx"),
        DistributionKind::Insurance,
    )
    .unwrap_err();
    assert!(matches!(
        error,
        ToolError::Stage { ref sheet, ref source, .. }
            if sheet == MONTHS[1] && matches!(**source, ToolError::SheetIndexOutOfRange { index: 1, len: 1 })
    ));
}

#[test]
fn missing_input_is_reported_before_reading() {
    let temp_dir = tempdir().expect("temporary directory");
    let missing = temp_dir.path().join("absent.xlsx");
    let error = excel_read::list_sheets(&missing).unwrap_err();
    assert!(matches!(error, ToolError::MissingInput(path) if path == missing));

    let error = excel_read::list_sheets(temp_dir.path()).unwrap_err();
    assert!(matches!(error, ToolError::InvalidPath(_)));
}

#[test]
fn sheets_are_listed_and_addressed_by_position() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, _) = write_inputs(temp_dir.path(), true);

    assert_eq!(excel_read::list_sheets(&source).unwrap(), MONTHS);
    assert_eq!(excel_read::sheet_name_at(&source, 1).unwrap(), MONTHS[1]);
    assert!(matches!(
        excel_read::sheet_name_at(&source, 5),
        Err(ToolError::SheetIndexOutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn selected_month_is_the_only_one_processed() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, salary) = write_inputs(temp_dir.path(), false);
    let output_dir = temp_dir.path().join("outputs");

    // The second salary sheet lacks a column, so a full run would fail.
    let mut run_config = config(source.clone(), salary, output_dir.clone(), 11);
    run_config.sheets = Some(vec![MONTHS[0].to_string()]);
    let manifest = pipeline::run(&run_config).expect("pipeline run");

    for output in &manifest.outputs {
        assert_eq!(output.sheets, vec![MONTHS[0]]);
        assert_eq!(excel_read::list_sheets(&output.path).unwrap(), vec![MONTHS[0]]);
    }
    let written = fs::read_to_string(output_dir.join(pipeline::MANIFEST_FILE)).expect("manifest");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("manifest JSON");
    assert_eq!(parsed["config"]["sheets"][0], MONTHS[0]);

    // Positions select sheets too, and the month still follows the workbook order.
    let february = temp_dir.path().join("february.xlsx");
    let sheets = pipeline::generate_timesheet(
        &source,
        &february,
        Some(2023),
        Some(&["1".to_string()]),
        &mut StdRng::seed_from_u64(2),
    )
    .unwrap();
    assert_eq!(sheets, vec![MONTHS[1]]);
    let month = timesheet::from_table(&excel_read::read_table(&february, MONTHS[1], 0).unwrap()).unwrap();
    assert_eq!(month.days.len(), 28);

    let error = excel_read::select_sheets(&source, Some(&["3月".to_string()])).unwrap_err();
    assert!(matches!(error, ToolError::InvalidWorkbook(_)));
}

#[test]
fn merged_timesheet_groups_project_cells() {
    let temp_dir = tempdir().expect("temporary directory");
    let (source, _) = write_inputs(temp_dir.path(), true);
    let timesheet_path = temp_dir.path().join("timesheet.xlsx");
    let merged_path = temp_dir.path().join("merged.xlsx");

    pipeline::generate_timesheet(&source, &timesheet_path, None, None, &mut StdRng::seed_from_u64(4))
        .unwrap();
    pipeline::merge_timesheet(&timesheet_path, &merged_path).unwrap();

    let merged = excel_read::read_table(&merged_path, MONTHS[0], 0).unwrap();
    let rows: Vec<(Cell, String)> = merged
        .rows
        .iter()
        .map(|row| (row[0].clone(), row[1].text()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (text("RD01"), "张三".to_string()),
            (text("RD02"), "张三".to_string()),
            (text("RD03"), "李四".to_string()),
            (Cell::Empty, "王五".to_string()),
        ]
    );
}
