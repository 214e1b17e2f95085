use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rd_ledger::io::excel_read;
use rd_ledger::model::DistributionKind;
use rd_ledger::pipeline::{self, PipelineConfig};
use rd_ledger::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Timesheet(args) => {
            let seed = resolve_seed(args.seed);
            let mut rng = StdRng::seed_from_u64(seed);
            let year = normalize_year(args.year);
            pipeline::generate_timesheet(
                &args.source,
                &args.output,
                year,
                selection(&args.sheets),
                &mut rng,
            )
            .map(|_| ())
        }
        Command::Merge(args) => pipeline::merge_timesheet(&args.input, &args.output).map(|_| ()),
        Command::Wages(args) => pipeline::generate_wages(
            &args.timesheet,
            &args.salary,
            &args.output,
            selection(&args.sheets),
            selection(&args.salary_sheets),
        )
        .map(|_| ()),
        Command::Stats(args) => {
            pipeline::generate_time_statistics(&args.input, &args.output, selection(&args.sheets))
                .map(|_| ())
        }
        Command::Distribute(args) => {
            pipeline::distribute(&args.stats, &args.wages, &args.output, args.kind.into())
                .map(|_| ())
        }
        Command::Sheets(args) => {
            for sheet in excel_read::list_sheets(&args.input)? {
                println!("{sheet}");
            }
            Ok(())
        }
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let source = match args.source {
        Some(path) => path,
        None => PathBuf::from(prompt("attendance workbook")?),
    };
    excel_read::ensure_file(&source)?;

    let salary = match args.salary {
        Some(path) => path,
        None => PathBuf::from(prompt("base-salary workbook")?),
    };
    excel_read::ensure_file(&salary)?;

    let year = match args.year {
        Some(year) => year,
        None => parse_year(&prompt("target year (0 reads the day-count column)")?)?,
    };

    let config = PipelineConfig {
        source,
        salary,
        year: normalize_year(year),
        output_dir: args.output_dir,
        sheets: owned_selection(args.sheets),
        salary_sheets: owned_selection(args.salary_sheets),
        seed: resolve_seed(args.seed),
    };
    let manifest = pipeline::run(&config)?;
    for output in &manifest.outputs {
        println!("{}", output.path.display());
    }
    Ok(())
}

/// An empty repeated flag selects every sheet.
fn selection(sheets: &[String]) -> Option<&[String]> {
    (!sheets.is_empty()).then_some(sheets)
}

fn owned_selection(sheets: Vec<String>) -> Option<Vec<String>> {
    (!sheets.is_empty()).then_some(sheets)
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "allocator seed");
    seed
}

fn normalize_year(year: i32) -> Option<i32> {
    (year != 0).then_some(year)
}

fn parse_year(input: &str) -> Result<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| ToolError::Parse {
        column: "year".to_string(),
        value: trimmed.to_string(),
    })
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate R&D timesheets, wage tables and per-project cost distributions."
)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every stage and write all workbooks into one directory.
    Run(RunArgs),
    /// Generate the timesheet workbook from an attendance workbook.
    Timesheet(TimesheetArgs),
    /// Reorder a timesheet by project with project cells merged.
    Merge(TransformArgs),
    /// Build the wage workbook from a timesheet and base salaries.
    Wages(WagesArgs),
    /// Pivot a timesheet into person x project hours.
    Stats(StatsArgs),
    /// Spread salary or insurance across projects.
    Distribute(DistributeArgs),
    /// List the sheets of a workbook.
    Sheets(SheetsArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Attendance workbook; prompted for when absent.
    #[arg(long, env = "RD_LEDGER_SOURCE")]
    source: Option<PathBuf>,

    /// Base-salary workbook; prompted for when absent.
    #[arg(long, env = "RD_LEDGER_SALARY")]
    salary: Option<PathBuf>,

    /// Target year, 0 to read month lengths from the day-count column.
    #[arg(long, env = "RD_LEDGER_YEAR")]
    year: Option<i32>,

    /// Directory receiving the generated workbooks; created when missing.
    #[arg(long, env = "RD_LEDGER_OUTPUT_DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Seed of the day allocator; drawn at random when absent.
    #[arg(long, env = "RD_LEDGER_SEED")]
    seed: Option<u64>,

    /// Attendance sheet to process, by name or zero-based position. Repeat
    /// for several; all sheets when omitted.
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Base-salary sheet paired with each processed month. Defaults to the
    /// `--sheet` selection.
    #[arg(long = "salary-sheet")]
    salary_sheets: Vec<String>,
}

#[derive(clap::Args)]
struct TimesheetArgs {
    #[arg(long)]
    source: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// Target year, 0 to read month lengths from the day-count column.
    #[arg(long, default_value_t = 0)]
    year: i32,

    #[arg(long)]
    seed: Option<u64>,

    /// Attendance sheet to process, by name or zero-based position.
    #[arg(long = "sheet")]
    sheets: Vec<String>,
}

#[derive(clap::Args)]
struct TransformArgs {
    /// Timesheet workbook.
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct StatsArgs {
    /// Timesheet workbook.
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long = "sheet")]
    sheets: Vec<String>,
}

#[derive(clap::Args)]
struct WagesArgs {
    #[arg(long)]
    timesheet: PathBuf,

    #[arg(long)]
    salary: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// Timesheet sheet to process, by name or zero-based position.
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Salary sheet paired with each processed timesheet sheet.
    #[arg(long = "salary-sheet")]
    salary_sheets: Vec<String>,
}

#[derive(clap::Args)]
struct DistributeArgs {
    /// Time-statistics workbook.
    #[arg(long)]
    stats: PathBuf,

    /// Wage workbook.
    #[arg(long)]
    wages: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long, value_enum)]
    kind: DistributionKindArg,
}

#[derive(clap::Args)]
struct SheetsArgs {
    #[arg(long)]
    input: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DistributionKindArg {
    Salary,
    Insurance,
}

impl From<DistributionKindArg> for DistributionKind {
    fn from(kind: DistributionKindArg) -> Self {
        match kind {
            DistributionKindArg::Salary => DistributionKind::Salary,
            DistributionKindArg::Insurance => DistributionKind::Insurance,
        }
    }
}
