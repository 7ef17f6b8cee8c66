//! lmi CLI - Command-line interface for the Life Morale engine
//!
//! Commands:
//! - score: Score one or more requests (JSON or NDJSON)
//! - validate: Report coercion flags and malformed requests
//! - schema: Print request or output schema
//! - doctor: Diagnose engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use life_morale::encoder::REPORT_SCHEMA_VERSION;
use life_morale::schema::{RequestAdapter, REQUEST_SCHEMA_VERSION};
use life_morale::types::{Dimension, TimeCategory};
use life_morale::{LmiEngine, ScoreError, ScoringConfig, ENGINE_VERSION, PRODUCER_NAME};

/// lmi - Life Morale Index scoring engine
#[derive(Parser)]
#[command(name = "lmi")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score weekly morale check-ins into a Life Morale Index", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score requests and write results
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Default scoring config (JSON); request configs overlay it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wrap each result in a score report envelope
        #[arg(long)]
        envelope: bool,
    },

    /// Validate requests without scoring them
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose engine configuration
    Doctor {
        /// Check a scoring config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single request object or a JSON array of requests
    Json,
    /// Newline-delimited JSON (one request per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON array
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Request schema (lmi.score_request.v1)
    Input,
    /// Output schema (lmi.score_report.v1 result)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("failed to initialise logging: {e}");
    }

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

fn init_tracing(verbose: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), LmiCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
            config,
            envelope,
        } => cmd_score(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            envelope,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    envelope: bool,
) -> Result<(), LmiCliError> {
    let engine = match config {
        Some(path) => {
            let config_json = fs::read_to_string(path)?;
            LmiEngine::from_config_json(&config_json)?
        }
        None => LmiEngine::new(),
    };

    let defaults = engine.config();
    debug!(
        calibration_max = defaults.calibration.max,
        ri_multiplier = defaults.ri.global_multiplier,
        cross_lift = defaults.cross_lift.enabled,
        eli_model = defaults.eli.model.as_str(),
        "engine defaults"
    );

    let requests = read_requests(input, &input_format)?;
    if requests.is_empty() {
        return Err(LmiCliError::NoRequests);
    }
    info!(count = requests.len(), "scoring requests");

    let mut results: Vec<serde_json::Value> = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let scored = engine
            .score_value(request)
            .map_err(|source| LmiCliError::Request { index, source })?;
        debug!(index, final_lmi = scored.final_lmi, "scored request");

        let value = if envelope {
            serde_json::to_value(engine.encoder().encode(scored))?
        } else {
            serde_json::to_value(scored)?
        };
        results.push(value);
    }

    let output_data = format_output(&results, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), LmiCliError> {
    let requests = read_requests(input, &input_format)?;
    let defaults = ScoringConfig::default();

    let entries: Vec<ValidationEntry> = requests
        .iter()
        .enumerate()
        .map(
            |(index, request)| match RequestAdapter::from_value(request, &defaults) {
                Ok(parsed) => ValidationEntry {
                    index,
                    valid: true,
                    flags: parsed.flags.iter().map(|f| f.as_str().to_string()).collect(),
                    error: None,
                },
                Err(e) => ValidationEntry {
                    index,
                    valid: false,
                    flags: Vec::new(),
                    error: Some(e.to_string()),
                },
            },
        )
        .collect();

    let invalid = entries.iter().filter(|e| !e.valid).count();
    let report = ValidationReport {
        schema_version: REQUEST_SCHEMA_VERSION.to_string(),
        total_requests: entries.len(),
        valid_requests: entries.len() - invalid,
        invalid_requests: invalid,
        flagged_requests: entries.iter().filter(|e| !e.flags.is_empty()).count(),
        requests: entries,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total requests:   {}", report.total_requests);
        println!("Valid requests:   {}", report.valid_requests);
        println!("Invalid requests: {}", report.invalid_requests);
        println!("Flagged requests: {}", report.flagged_requests);

        for entry in &report.requests {
            if let Some(error) = &entry.error {
                println!("  - Request {}: {}", entry.index, error);
            } else if !entry.flags.is_empty() {
                println!("  - Request {}: coerced {}", entry.index, entry.flags.join(", "));
            }
        }
    }

    if report.invalid_requests > 0 {
        Err(LmiCliError::ValidationFailed(report.invalid_requests))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), LmiCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", REQUEST_SCHEMA_VERSION);
                println!();
                println!("- answers: up to 24 entries {{ score?, scenarioScore?, note? }}");
                println!("  - score: 1-10, missing or null means unanswered");
                for dimension in Dimension::ALL {
                    let range = dimension.indices();
                    println!(
                        "  - questions {}-{}: {}",
                        range.start,
                        range.end - 1,
                        dimension.as_str()
                    );
                }
                println!("- timeMap: weekly rows {{ category, hours, ri }}");
                let categories: Vec<&str> = TimeCategory::ALL.iter().map(|c| c.as_str()).collect();
                println!("  - category: {} (Gym is accepted for Health)", categories.join(", "));
                println!("  - hours: 0-168 per row");
                println!("  - ri: Residual Influence 1-10, 5 = neutral");
                println!("- ELI: Emotional Load Index 1-10 (default 5)");
                println!("- config: optional overrides");
                println!("  - calibration {{ k, max }}, ri {{ globalMultiplier }},");
                println!("    crossLift {{ enabled, alpha }}, eli {{ model: ceiling | centered }}");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", REPORT_SCHEMA_VERSION);
                println!();
                println!("- finalLMI: score after RI and emotional ceiling");
                println!("- rawLMS: time-weighted quality before adjustment");
                println!("- riAdjusted: rawLMS after Residual Influence");
                println!("- band: high | solid | needs_attention | low");
                println!("- calibrated: 24 calibrated answers (null when unanswered)");
                println!("- dimensionAverages: {{ Fulfillment, Connection, Autonomy, Vitality, Peace }}");
                println!("- topDrainers / topUplifters: up to 3 {{ index, score, note }}");
                println!("- breakdown: blend and adjustment intermediates");
                println!("- summary: {{ answered, completionPct, loggedHours, remainingHours, timeBudget }}");
                println!("- scenario: present when any answer has scenarioScore");
                println!("- flags: coercions applied to the request");
                println!();
                println!("With --envelope: {{ schemaVersion, producer, computedAtUtc, result }}");
            }
        }
    }
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), LmiCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "engine_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Engine version {}", ENGINE_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Request schema: {}, report schema: {}",
                REQUEST_SCHEMA_VERSION, REPORT_SCHEMA_VERSION
            ),
        },
    ];

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match ScoringConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (ELI model {}, cross-lift {})",
                            parsed.eli.model.as_str(),
                            if parsed.cross_lift.enabled { "on" } else { "off" }
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
            message: "stdin is a TTY (pass --input or pipe requests)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for requests)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("lmi Doctor Report");
        println!("=================");
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
        Err(LmiCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_requests(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<serde_json::Value>, LmiCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let requests = match input_format {
        InputFormat::Json => RequestAdapter::parse_batch(&input_data)?,
        InputFormat::Ndjson => RequestAdapter::parse_ndjson(&input_data)?,
    };
    Ok(requests)
}

fn format_output(
    results: &[serde_json::Value],
    format: &OutputFormat,
) -> Result<String, LmiCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(results)? + "\n"),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": REQUEST_SCHEMA_VERSION,
        "description": "Life Morale score request",
        "type": "object",
        "anyOf": [
            { "required": ["answers"] },
            { "required": ["timeMap"] }
        ],
        "properties": {
            "answers": {
                "type": "array",
                "maxItems": 24,
                "items": {
                    "type": ["object", "null"],
                    "properties": {
                        "score": { "type": ["number", "null"], "minimum": 1, "maximum": 10 },
                        "scenarioScore": { "type": ["number", "null"], "minimum": 1, "maximum": 10 },
                        "note": { "type": "string" }
                    }
                }
            },
            "timeMap": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["category"],
                    "properties": {
                        "category": {
                            "type": "string",
                            "enum": ["Sleep", "Work", "Commute", "Relationships", "Leisure",
                                     "Health", "Gym", "Chores", "Growth", "Other"]
                        },
                        "hours": { "type": "number", "minimum": 0, "maximum": 168 },
                        "ri": { "type": "number", "minimum": 1, "maximum": 10 }
                    }
                }
            },
            "ELI": { "type": "number", "minimum": 1, "maximum": 10, "default": 5 },
            "config": {
                "type": "object",
                "properties": {
                    "calibration": {
                        "type": "object",
                        "properties": {
                            "k": { "type": "number", "exclusiveMinimum": 0 },
                            "max": { "type": "number", "exclusiveMinimum": 0, "maximum": 10 }
                        }
                    },
                    "ri": {
                        "type": "object",
                        "properties": { "globalMultiplier": { "type": "number" } }
                    },
                    "crossLift": {
                        "type": "object",
                        "properties": {
                            "enabled": { "type": "boolean" },
                            "alpha": { "type": "number", "minimum": 0 }
                        }
                    },
                    "eli": {
                        "type": "object",
                        "properties": {
                            "model": { "type": "string", "enum": ["ceiling", "centered"] }
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let ranked = serde_json::json!({
        "type": "array",
        "maxItems": 3,
        "items": {
            "type": "object",
            "properties": {
                "index": { "type": "integer" },
                "score": { "type": "number" },
                "note": { "type": "string" }
            }
        }
    });
    let dimension = serde_json::json!({
        "type": ["string", "null"],
        "enum": ["Fulfillment", "Connection", "Autonomy", "Vitality", "Peace", null]
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": REPORT_SCHEMA_VERSION,
        "description": "Life Morale score result",
        "type": "object",
        "required": ["finalLMI", "rawLMS", "riAdjusted", "band", "calibrated",
                     "dimensionAverages", "topDrainers", "topUplifters"],
        "properties": {
            "finalLMI": { "type": "number" },
            "rawLMS": { "type": "number" },
            "riAdjusted": { "type": "number" },
            "band": { "type": "string", "enum": ["high", "solid", "needs_attention", "low"] },
            "calibrated": {
                "type": "array",
                "minItems": 24,
                "maxItems": 24,
                "items": { "type": ["number", "null"] }
            },
            "dimensionAverages": { "type": "object" },
            "overallAverage": { "type": ["number", "null"] },
            "topDrainers": ranked.clone(),
            "topUplifters": ranked,
            "dominantDrainer": dimension,
            "dominantUplifter": dimension,
            "breakdown": { "type": "object" },
            "summary": { "type": "object" },
            "scenario": { "type": "object" },
            "flags": { "type": "array", "items": { "type": "string" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum LmiCliError {
    Io(io::Error),
    Score(ScoreError),
    Json(serde_json::Error),
    Request { index: usize, source: ScoreError },
    NoRequests,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for LmiCliError {
    fn from(e: io::Error) -> Self {
        LmiCliError::Io(e)
    }
}

impl From<ScoreError> for LmiCliError {
    fn from(e: ScoreError) -> Self {
        LmiCliError::Score(e)
    }
}

impl From<serde_json::Error> for LmiCliError {
    fn from(e: serde_json::Error) -> Self {
        LmiCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LmiCliError> for CliError {
    fn from(e: LmiCliError) -> Self {
        match e {
            LmiCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LmiCliError::Score(ScoreError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'lmi doctor --config <file>' for details".to_string()),
            },
            LmiCliError::Score(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {}", REQUEST_SCHEMA_VERSION)),
            },
            LmiCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LmiCliError::Request { index, source } => CliError {
                code: "MALFORMED_REQUEST".to_string(),
                message: format!("Request {}: {}", index, source),
                hint: Some("Run 'lmi validate' for details".to_string()),
            },
            LmiCliError::NoRequests => CliError {
                code: "NO_REQUESTS".to_string(),
                message: "No requests found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            LmiCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} requests failed validation", count),
                hint: Some("Each request must be a JSON object with answers or timeMap".to_string()),
            },
            LmiCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_requests: usize,
    valid_requests: usize,
    invalid_requests: usize,
    flagged_requests: usize,
    requests: Vec<ValidationEntry>,
}

#[derive(serde::Serialize)]
struct ValidationEntry {
    index: usize,
    valid: bool,
    flags: Vec<String>,
    error: Option<String>,
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
