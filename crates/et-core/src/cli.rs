//! Command-line surface for et-core.
//!
//! Every command reads one JSON-stat document (a path, or `-` for stdin),
//! decodes it with the resolved engine config and prints either a JSON
//! envelope or TSV on stdout. Errors go to stderr and map to an exit code.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use et_common::{OutputFormat, SCHEMA_VERSION};
use et_config::{resolve_config, ConfigPaths, DatasetRequest, EngineConfig, RequestReport};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::dataset::{Dataset, DatasetSummary};
use crate::error::{Error, Result};
use crate::exit_codes::ExitCode;
use crate::logging::LogFormat;
use crate::output::{table_records, write_pivot_tsv, write_table_tsv};
use crate::view::{parse_assignments, PivotField};

#[derive(Parser, Debug)]
#[command(
    name = "et-core",
    version,
    about = "Decode JSON-stat datasets into tables and pivots"
)]
pub struct Cli {
    /// Engine config file (overrides ET_CONFIG and the XDG location)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print dataset metadata
    Info(InputArgs),

    /// Print the flattened table
    Table {
        #[command(flatten)]
        input: InputArgs,

        /// Emit category positions instead of codes
        #[arg(long)]
        indexed: bool,
    },

    /// Print the geo × time cross-tab
    Pivot {
        #[command(flatten)]
        input: InputArgs,

        /// Fix a non-axis dimension to one code
        #[arg(long = "fix", value_name = "DIM=CODE")]
        fix: Vec<String>,

        /// Fill cells with status flags instead of values
        #[arg(long)]
        status: bool,
    },

    /// Find the latest period whose fill reaches a level
    Latest {
        #[command(flatten)]
        input: InputArgs,

        /// Fraction of the best-filled period, in [0, 1]
        #[arg(long, value_name = "LEVEL")]
        fill_level: Option<f64>,

        /// Restrict to rows with DIM=CODE
        #[arg(long = "fix", value_name = "DIM=CODE")]
        fix: Vec<String>,
    },

    /// Print the JSON schema of `info` output
    Schema,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON-stat document, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

/// Run a parsed command line.
pub fn run(cli: &Cli) -> ExitCode {
    match execute(cli) {
        Ok(code) => code,
        Err(err) => report_error(cli.format, &err),
    }
}

fn execute(cli: &Cli) -> Result<ExitCode> {
    if let Commands::Schema = cli.command {
        return run_schema();
    }

    let (config, source) = resolve_config(&ConfigPaths::discover(cli.config.clone()))?;
    debug!(source = ?source, none_value = %config.none_value, "resolved config");

    match &cli.command {
        Commands::Info(input) => {
            let dataset = load_dataset(&input.input, &config)?;
            let request = config.request.as_ref().map(DatasetRequest::report);
            run_info(cli.format, &dataset, request.as_ref())
        }
        Commands::Table { input, indexed } => {
            let dataset = load_dataset(&input.input, &config)?;
            run_table(cli.format, &dataset, *indexed)
        }
        Commands::Pivot { input, fix, status } => {
            let dataset = load_dataset(&input.input, &config)?;
            let field = if *status {
                PivotField::Status
            } else {
                PivotField::Value
            };
            run_pivot(cli.format, &dataset, fix, field)
        }
        Commands::Latest {
            input,
            fill_level,
            fix,
        } => {
            let dataset = load_dataset(&input.input, &config)?;
            let fill_level = fill_level.unwrap_or(config.default_fill_level);
            run_latest(cli.format, &dataset, fix, fill_level)
        }
        Commands::Schema => run_schema(),
    }
}

fn load_dataset(input: &Path, config: &EngineConfig) -> Result<Dataset> {
    if input == Path::new("-") {
        Dataset::from_reader(io::stdin().lock(), config)
    } else {
        Dataset::from_path(input, config)
    }
}

fn envelope(command: &str, body: Value) -> Value {
    let mut output = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": Utc::now().to_rfc3339(),
        "command": command,
    });
    if let (Value::Object(fields), Value::Object(body)) = (&mut output, body) {
        fields.extend(body);
    }
    output
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}

fn run_info(
    format: OutputFormat,
    dataset: &Dataset,
    request: Option<&RequestReport>,
) -> Result<ExitCode> {
    let summary = dataset.summary();
    match format {
        OutputFormat::Json => {
            let mut body = json!({ "dataset": summary });
            if let Some(request) = request {
                body["request"] = serde_json::to_value(request)?;
            }
            print_json(&envelope("info", body))?;
        }
        OutputFormat::Tsv => {
            let mut out = io::stdout().lock();
            let optional = |v: &Option<String>| v.clone().unwrap_or_default();
            writeln!(out, "label\t{}", optional(&summary.label))?;
            writeln!(out, "language\t{}", optional(&summary.language))?;
            writeln!(out, "updated\t{}", summary.updated.to_rfc3339())?;
            let ids: Vec<&str> = summary.dimension_ids.iter().map(|d| d.0.as_str()).collect();
            writeln!(out, "dimensions\t{}", ids.join(","))?;
            let shape: Vec<String> = summary.data_shape.iter().map(|s| s.to_string()).collect();
            writeln!(out, "shape\t{}", shape.join(","))?;
            writeln!(out, "rows\t{}", summary.row_count)?;
            let count = summary
                .observation_count
                .map(|c| c.to_string())
                .unwrap_or_default();
            writeln!(out, "observation_count\t{count}")?;
            writeln!(out, "latest_period\t{}", optional(&summary.latest_period))?;
            writeln!(out, "oldest_period\t{}", optional(&summary.oldest_period))?;
            if let Some(request) = request {
                writeln!(out, "request_dataset\t{}", request.dataset)?;
                writeln!(out, "request_language\t{}", request.language)?;
                let filters: Vec<String> = request
                    .dimension_filter
                    .iter()
                    .map(|(dim, codes)| format!("{dim}={}", codes.join("+")))
                    .collect();
                writeln!(out, "dimension_filter\t{}", filters.join(","))?;
                let periods: Vec<String> =
                    request.time_period_filter.iter().map(|c| c.to_string()).collect();
                writeln!(out, "time_period_filter\t{}", periods.join(","))?;
            }
        }
    }
    Ok(ExitCode::Clean)
}

fn run_table(format: OutputFormat, dataset: &Dataset, indexed: bool) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => {
            let rows = if indexed {
                table_records(dataset.index_table())?
            } else {
                table_records(dataset.coded_table())?
            };
            print_json(&envelope(
                "table",
                json!({
                    "indexed": indexed,
                    "columns": dataset.dataframe_columns(),
                    "row_count": rows.len(),
                    "rows": rows,
                }),
            ))?;
        }
        OutputFormat::Tsv => {
            let mut out = io::stdout().lock();
            if indexed {
                write_table_tsv(&mut out, dataset.index_table())?;
            } else {
                write_table_tsv(&mut out, dataset.coded_table())?;
            }
        }
    }
    Ok(ExitCode::Clean)
}

fn run_pivot(
    format: OutputFormat,
    dataset: &Dataset,
    fix: &[String],
    field: PivotField,
) -> Result<ExitCode> {
    let fixed = parse_assignments(fix)?;
    let pivot = dataset.pivot(&fixed, field)?;
    match format {
        OutputFormat::Json => {
            print_json(&envelope(
                "pivot",
                json!({ "fixed": fixed, "pivot": pivot }),
            ))?;
        }
        OutputFormat::Tsv => write_pivot_tsv(&mut io::stdout().lock(), &pivot)?,
    }
    Ok(ExitCode::Clean)
}

fn run_latest(
    format: OutputFormat,
    dataset: &Dataset,
    fix: &[String],
    fill_level: f64,
) -> Result<ExitCode> {
    let fixed = parse_assignments(fix)?;
    let period = dataset.latest_period_at_fill_level(fill_level, &fixed)?;
    match format {
        OutputFormat::Json => {
            print_json(&envelope(
                "latest",
                json!({
                    "fill_level": fill_level,
                    "fixed": fixed,
                    "period": period,
                }),
            ))?;
        }
        OutputFormat::Tsv => {
            if let Some(period) = &period {
                writeln!(io::stdout().lock(), "{period}")?;
            }
        }
    }
    Ok(if period.is_some() {
        ExitCode::Clean
    } else {
        ExitCode::NoResult
    })
}

fn run_schema() -> Result<ExitCode> {
    let schema = schemars::schema_for!(DatasetSummary);
    print_json(&serde_json::to_value(&schema)?)?;
    Ok(ExitCode::Clean)
}

fn report_error(format: OutputFormat, err: &Error) -> ExitCode {
    let code = ExitCode::from(err);
    debug!(code = err.code(), kind = err.kind().as_str(), "command failed: {err}");
    match format {
        OutputFormat::Json => {
            let output = json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": Utc::now().to_rfc3339(),
                "error": {
                    "code": err.code(),
                    "kind": err.kind().as_str(),
                    "message": err.to_string(),
                },
            });
            match serde_json::to_string_pretty(&output) {
                Ok(text) => eprintln!("{text}"),
                Err(_) => eprintln!("Error: {err}"),
            }
        }
        OutputFormat::Tsv => eprintln!("Error: {err}"),
    }
    code
}
