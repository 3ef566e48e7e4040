use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use optspec_core::{
    OptionKind, OptionSpec, OptionValue, OutcomeStatus, ParsedArguments, ParserConfig,
    load_registry, parse_all, validate_registry,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Token conventions selectable from the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliStyle {
    Platform,
    Posix,
    Windows,
}

impl From<CliStyle> for ParserConfig {
    fn from(style: CliStyle) -> Self {
        match style {
            CliStyle::Platform => ParserConfig::platform(),
            CliStyle::Posix => ParserConfig::posix(),
            CliStyle::Windows => ParserConfig::windows(),
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "optspec")]
#[command(about = "Run option registries against argument vectors")]
struct Cli {
    /// Log parser decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an argument vector against a registry and report every option.
    Parse(ParseArgs),
    /// Check one or more registry files for defects and clashes.
    Validate(ValidateArgs),
    /// Print the descriptors of a registry.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Registry file (YAML, or JSON with a .json extension).
    #[arg(long)]
    registry: PathBuf,
    /// Parser configuration YAML; missing fields use the platform defaults.
    #[arg(long, conflicts_with = "style")]
    config: Option<PathBuf>,
    /// Token conventions to use when no configuration file is given.
    #[arg(long, default_value = "platform")]
    style: CliStyle,
    /// Program name placed at argv[0].
    #[arg(long, default_value = "prog")]
    program: String,
    /// Also fail when a token is left unclaimed.
    #[arg(long)]
    strict: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Registry files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Registry file.
    #[arg(long)]
    registry: PathBuf,
}

#[derive(Debug, Serialize)]
struct ParseReport {
    program: String,
    options: Vec<OptionReport>,
    missing_required: Vec<String>,
    unclaimed: Vec<UnclaimedToken>,
}

#[derive(Debug, Serialize)]
struct OptionReport {
    name: String,
    kind: OptionKind,
    status: OutcomeStatus,
    value: Option<OptionValue>,
    consumed: Vec<usize>,
    tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UnclaimedToken {
    index: usize,
    token: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let registry = load_registry(&args.registry)
        .map_err(|err| format!("Failed to load '{}': {err}", args.registry.display()))?;
    let config = match &args.config {
        Some(path) => ParserConfig::load(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?,
        None => args.style.into(),
    };
    debug!(?config, "Using parser configuration");

    let argv: Vec<String> = std::iter::once(args.program).chain(args.args).collect();
    let parsed = parse_all(&argv, &registry, &config);
    let report = build_report(&argv, &parsed);

    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(&report).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
        CliOutputFormat::Table => report_to_table(&report),
    };
    println!("{}", raw.trim_end());

    let mut problems = Vec::new();
    for outcome in parsed.invalid() {
        let tokens = tokens_at(&argv, outcome.consumed()).join(" ");
        problems.push(format!(
            "invalid {} value for `{}`: {tokens}",
            outcome.owner().kind(),
            outcome.owner().name()
        ));
    }
    for spec in parsed.missing_required() {
        problems.push(format!("missing required option `{}`", spec.name()));
    }
    if args.strict {
        for token in &report.unclaimed {
            problems.push(format!("unexpected argument: {}", token.token));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("{problem}");
        }
        Err(format!("{} problem(s) in argument vector", problems.len()))
    }
}

fn build_report(argv: &[String], parsed: &ParsedArguments<'_>) -> ParseReport {
    let options = parsed
        .outcomes()
        .iter()
        .map(|outcome| OptionReport {
            name: outcome.owner().name().to_string(),
            kind: outcome.owner().kind(),
            status: outcome.status(),
            value: outcome.resolved_value().cloned(),
            consumed: outcome.consumed().to_vec(),
            tokens: tokens_at(argv, outcome.consumed()),
        })
        .collect();

    ParseReport {
        program: argv.first().cloned().unwrap_or_default(),
        options,
        missing_required: parsed
            .missing_required()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect(),
        unclaimed: parsed
            .unclaimed()
            .into_iter()
            .map(|index| UnclaimedToken {
                index,
                token: argv[index].clone(),
            })
            .collect(),
    }
}

fn tokens_at(argv: &[String], indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&index| argv.get(index).cloned())
        .collect()
}

fn report_to_table(report: &ParseReport) -> String {
    let width = report
        .options
        .iter()
        .map(|o| o.name.len())
        .max()
        .unwrap_or(0)
        .max("OPTION".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:<8}  {:<8}  VALUE", "OPTION", "KIND", "STATUS");
    for option in &report.options {
        let status = match option.status {
            OutcomeStatus::Absent => "default",
            OutcomeStatus::Invalid => "invalid",
            OutcomeStatus::Valid => "parsed",
        };
        let value = option
            .value
            .as_ref()
            .map_or_else(|| format!("<{}>", option.tokens.join(" ")), ToString::to_string);
        let _ = writeln!(
            out,
            "{:<width$}  {:<8}  {:<8}  {value}",
            option.name,
            option.kind.as_str(),
            status
        );
    }

    if !report.unclaimed.is_empty() {
        let tokens: Vec<&str> = report.unclaimed.iter().map(|t| t.token.as_str()).collect();
        let _ = writeln!(out, "\nUnclaimed: {}", tokens.join(" "));
    }
    out
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failures = 0usize;
    let mut option_count = 0usize;

    for path in &args.inputs {
        let registry = match load_registry(path) {
            Ok(registry) => registry,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        let errors = validate_registry(&registry);
        for err in &errors {
            eprintln!("{}: {err}", path.display());
        }
        failures += errors.len();
        option_count += registry.len();
    }

    if failures > 0 {
        return Err(format!("{failures} registry problem(s) found"));
    }

    println!(
        "Validated {} registry file(s) with {option_count} option(s).",
        args.inputs.len()
    );
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let registry: Vec<OptionSpec> = load_registry(&args.registry)
        .map_err(|err| format!("Failed to load '{}': {err}", args.registry.display()))?;
    for spec in &registry {
        println!("{spec}");
    }
    Ok(())
}
