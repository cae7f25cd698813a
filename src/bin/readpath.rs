//! readpath CLI - Command-line interface for readpath
//!
//! Commands:
//! - summarize: Summarize a reading trace into per-sentence statistics
//! - aggregate: Average stored summaries per sentence
//! - validate: Report suspicious samples and regions in a trace
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output shapes

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use readpath::adapter::{parse_trace, validate_trace};
use readpath::encoder::{decode_summary, SummaryEncoder, SUMMARY_SCHEMA_VERSION};
use readpath::{
    ReadingSummarizer, ReadingSummary, SentenceAggregator, SummaryConfig, PRODUCER_NAME,
    READPATH_VERSION,
};

/// readpath - Summarize cursor traces into per-sentence reading behavior
#[derive(Parser)]
#[command(name = "readpath")]
#[command(version = READPATH_VERSION)]
#[command(about = "Turn cursor traces into per-sentence reading statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a reading trace
    Summarize {
        /// Input trace file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        /// Summarizer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Longest interval (ms) one sample may contribute to a sentence
        #[arg(long)]
        max_gap_ms: Option<i64>,

        /// Hit-test slack added to every region edge
        #[arg(long)]
        edge_margin: Option<f64>,

        /// Reject non-finite coordinates and duplicate region ids
        #[arg(long)]
        strict: bool,
    },

    /// Average stored summaries (bare or enveloped) per sentence
    Aggregate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Load aggregate state from file before folding
        #[arg(long)]
        load: Option<PathBuf>,

        /// Save aggregate state to file after folding
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Validate a reading trace
    Validate {
        /// Input trace file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a summarizer configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one summary per line)
    Ndjson,
    /// JSON array of summaries
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact bare summary
    Json,
    /// Pretty-printed bare summary
    JsonPretty,
    /// Summary wrapped with producer metadata
    Envelope,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (reading trace)
    Input,
    /// Output schema (reading summary)
    Output,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ReadpathCliError> {
    match cli.command {
        Commands::Summarize {
            input,
            output,
            format,
            config,
            max_gap_ms,
            edge_margin,
            strict,
        } => {
            let config = build_config(config.as_deref(), max_gap_ms, edge_margin, strict)?;
            cmd_summarize(&input, &output, format, config)
        }

        Commands::Aggregate {
            input,
            input_format,
            load,
            save,
        } => cmd_aggregate(&input, input_format, load.as_deref(), save.as_deref()),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn build_config(
    path: Option<&Path>,
    max_gap_ms: Option<i64>,
    edge_margin: Option<f64>,
    strict: bool,
) -> Result<SummaryConfig, ReadpathCliError> {
    let mut config = match path {
        Some(path) => SummaryConfig::from_json(&fs::read_to_string(path)?)?,
        None => SummaryConfig::default(),
    };
    if let Some(max_gap_ms) = max_gap_ms {
        config = config.with_max_gap_ms(max_gap_ms);
    }
    if let Some(edge_margin) = edge_margin {
        config = config.with_edge_margin(edge_margin);
    }
    if strict {
        config = config.strict();
    }
    config.validate()?;
    debug!("summarizer config: {:?}", config);
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, ReadpathCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            info!("reading input from terminal; end with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), ReadpathCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn cmd_summarize(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: SummaryConfig,
) -> Result<(), ReadpathCliError> {
    let trace = parse_trace(&read_input(input)?)?;
    let summary = ReadingSummarizer::new(config).summarize(&trace.samples, &trace.regions)?;

    let encoder = SummaryEncoder::new();
    let data = match format {
        OutputFormat::Json => encoder.encode_compact(&summary)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Envelope => encoder.encode_to_json(&summary, trace.trace_id.as_deref())?,
    };

    write_output(output, &data)
}

fn cmd_aggregate(
    input: &Path,
    input_format: InputFormat,
    load: Option<&Path>,
    save: Option<&Path>,
) -> Result<(), ReadpathCliError> {
    let mut aggregator = match load {
        Some(path) => SentenceAggregator::from_json(&fs::read_to_string(path)?)?,
        None => SentenceAggregator::new(),
    };

    let input_data = read_input(input)?;
    let summaries = parse_summaries(&input_data, &input_format)?;
    if summaries.is_empty() && aggregator.attempt_count() == 0 {
        return Err(ReadpathCliError::NoSummaries);
    }

    for summary in &summaries {
        aggregator.add(summary);
    }
    info!(
        "folded {} summaries ({} total)",
        summaries.len(),
        aggregator.attempt_count()
    );

    if let Some(path) = save {
        fs::write(path, aggregator.to_json()?)?;
    }

    println!("{}", serde_json::to_string_pretty(&aggregator.report())?);
    Ok(())
}

fn parse_summaries(
    data: &str,
    format: &InputFormat,
) -> Result<Vec<ReadingSummary>, ReadpathCliError> {
    match format {
        InputFormat::Ndjson => {
            let mut summaries = Vec::new();
            for (line_num, line) in data.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let summary = decode_summary(trimmed).map_err(|e| {
                    ReadpathCliError::ParseError(format!("line {}: {}", line_num + 1, e))
                })?;
                summaries.push(summary);
            }
            Ok(summaries)
        }
        InputFormat::Json => {
            let values: Vec<serde_json::Value> = serde_json::from_str(data)?;
            values
                .iter()
                .map(|v| decode_summary(&v.to_string()).map_err(ReadpathCliError::from))
                .collect()
        }
    }
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), ReadpathCliError> {
    let trace = parse_trace(&read_input(input)?)?;
    let issues = validate_trace(&trace);

    let report = ValidationReport {
        samples: trace.samples.len(),
        regions: trace.regions.len(),
        issues: issues.len(),
        details: issues.iter().map(|i| i.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Samples: {}", report.samples);
        println!("Regions: {}", report.regions);
        println!("Issues:  {}", report.issues);

        if !report.details.is_empty() {
            println!("\nIssues:");
            for detail in &report.details {
                println!("  - {}", detail);
            }
        }
    }

    if report.issues > 0 {
        Err(ReadpathCliError::ValidationFailed(report.issues))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ReadpathCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "readpath_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("readpath version {}", READPATH_VERSION),
    });

    checks.push(DoctorCheck {
        name: "output_schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("Envelope schema: {}", SUMMARY_SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match SummaryConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (max_gap_ms={}, edge_margin={}, policy={:?})",
                            parsed.max_gap_ms, parsed.edge_margin, parsed.coordinate_policy
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass a file with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: READPATH_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("readpath Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ReadpathCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), ReadpathCliError> {
    let schema = match schema_type {
        SchemaType::Input => serde_json::json!({
            "title": "readpath reading trace",
            "type": "object",
            "properties": {
                "trace_id": { "type": "string" },
                "samples": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["x", "y", "timestamp"],
                        "properties": {
                            "x": { "type": "number" },
                            "y": { "type": "number" },
                            "timestamp": { "type": "integer", "description": "milliseconds (alias: t)" }
                        }
                    }
                },
                "regions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "left", "top", "right", "bottom"],
                        "properties": {
                            "id": { "type": "integer", "minimum": 0 },
                            "text": { "type": "string" },
                            "left": { "type": "number" },
                            "top": { "type": "number" },
                            "right": { "type": "number" },
                            "bottom": { "type": "number" }
                        }
                    }
                }
            }
        }),
        SchemaType::Output => serde_json::json!({
            "title": "readpath reading summary",
            "type": "object",
            "required": ["total_time_ms", "sentences"],
            "properties": {
                "total_time_ms": { "type": "integer", "minimum": 0 },
                "sentences": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["index", "text", "dwell_ms", "visits", "first_visit_order"],
                        "properties": {
                            "index": { "type": "integer" },
                            "text": { "type": "string" },
                            "dwell_ms": { "type": "integer", "minimum": 0 },
                            "visits": { "type": "integer", "minimum": 0 },
                            "first_visit_order": { "type": ["integer", "null"], "minimum": 0 }
                        }
                    }
                }
            }
        }),
    };

    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum ReadpathCliError {
    Io(io::Error),
    Readpath(readpath::ReadpathError),
    Json(serde_json::Error),
    NoSummaries,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for ReadpathCliError {
    fn from(e: io::Error) -> Self {
        ReadpathCliError::Io(e)
    }
}

impl From<readpath::ReadpathError> for ReadpathCliError {
    fn from(e: readpath::ReadpathError) -> Self {
        ReadpathCliError::Readpath(e)
    }
}

impl From<serde_json::Error> for ReadpathCliError {
    fn from(e: serde_json::Error) -> Self {
        ReadpathCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ReadpathCliError> for CliError {
    fn from(e: ReadpathCliError) -> Self {
        match e {
            ReadpathCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ReadpathCliError::Readpath(e) => {
                let (code, hint) = match &e {
                    readpath::ReadpathError::InvalidSample { .. }
                    | readpath::ReadpathError::InvalidRegion { .. } => (
                        "INVALID_INPUT",
                        "Run 'readpath validate' for details, or drop --strict",
                    ),
                    readpath::ReadpathError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Check --max-gap-ms, --edge-margin or the config file")
                    }
                    _ => ("PARSE_ERROR", "Ensure input matches 'readpath schema input'"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ReadpathCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ReadpathCliError::NoSummaries => CliError {
                code: "NO_SUMMARIES".to_string(),
                message: "No summaries found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ReadpathCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} issues found in trace", count),
                hint: Some("The summarizer tolerates these; use --strict to reject them".to_string()),
            },
            ReadpathCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            ReadpathCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    samples: usize,
    regions: usize,
    issues: usize,
    details: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
