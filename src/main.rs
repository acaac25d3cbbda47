// cxxscan: error-tolerant C++ front end

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::{ArgAction, Parser};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cxxscan::checks::{CheckRegistry, Violation};
use cxxscan::config::{AnalysisConfig, Charset};
use cxxscan::parser::DiagnosticKind;
use cxxscan::pipeline::{Analysis, Pipeline};
use cxxscan::source::{SourceError, SourceFile};

/// Deep but legal nesting recurses far; give workers room.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Tokenize and parse C++ files, then report syntax errors and rule violations.
#[derive(Parser, Debug)]
#[command(name = "cxxscan", version, about)]
struct Cli {
    /// Source files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Charset used to decode the sources (UTF-8, US-ASCII, ISO-8859-1)
    #[arg(long, value_name = "NAME")]
    charset: Option<Charset>,

    /// Stop each file at its first syntax error
    #[arg(long)]
    no_error_recovery: bool,

    /// Properties file with sonar.sourceEncoding / sonar.cxx.errorRecoveryEnabled
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the token stream of each file
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree of each file
    #[arg(long)]
    ast: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Result of one worker thread
struct FileReport {
    analysis: Analysis,
    violations: Vec<Violation>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };
    debug!(charset = %config.charset, error_recovery = config.error_recovery, "configuration");

    let results = analyze_all(&cli.files, config);

    let color = io::stdout().is_tty();
    let mut stdout = io::stdout().lock();
    let mut setup_errors = 0;

    for (path, result) in cli.files.iter().zip(results) {
        match result {
            Ok(report) => {
                if let Err(e) = print_report(&mut stdout, &cli, &report, color) {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            }
            Err(message) => {
                warn!(path = %path.display(), "{message}");
                setup_errors += 1;
            }
        }
    }

    if setup_errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "cxxscan=warn",
        1 => "cxxscan=debug",
        _ => "cxxscan=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Defaults, then the properties file, then command-line flags
fn resolve_config(cli: &Cli) -> Result<AnalysisConfig, cxxscan::config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(charset) = cli.charset {
        config.charset = charset;
    }
    if cli.no_error_recovery {
        config.error_recovery = false;
    }
    Ok(config)
}

/// One scoped worker per file; results come back in input order.
fn analyze_all(files: &[PathBuf], config: AnalysisConfig) -> Vec<Result<FileReport, String>> {
    thread::scope(|scope| {
        let handles: Vec<_> = files
            .iter()
            .map(|path| {
                thread::Builder::new()
                    .name(format!("cxxscan:{}", path.display()))
                    .stack_size(WORKER_STACK_SIZE)
                    .spawn_scoped(scope, move || analyze_file(path, config))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle {
                Ok(handle) => match handle.join() {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(_) => Err("analysis thread panicked".to_string()),
                },
                Err(e) => Err(format!("cannot spawn analysis thread: {e}")),
            })
            .collect()
    })
}

fn analyze_file(path: &Path, config: AnalysisConfig) -> Result<FileReport, SourceError> {
    let source = SourceFile::read(path, config.charset)?;
    let pipeline = Pipeline::new(config);
    let analysis = pipeline.analyze(&source);
    let violations = pipeline.check(&analysis, &mut CheckRegistry::with_defaults());
    Ok(FileReport {
        analysis,
        violations,
    })
}

fn print_report(out: &mut impl Write, cli: &Cli, report: &FileReport, color: bool) -> io::Result<()> {
    let analysis = &report.analysis;
    let path = analysis.path.display().to_string();

    if cli.tokens {
        for token in &analysis.tokens {
            writeln!(
                out,
                "{}:{} {} {:?}",
                token.location.line,
                token.location.column,
                token.kind.as_str(),
                token.value
            )?;
        }
    }
    if cli.ast {
        write!(out, "{}", analysis.ast.pretty())?;
    }

    // parse errors are reported through the ParsingError check
    for diagnostic in analysis
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::LexError)
    {
        let label = format!("[{}]", diagnostic.kind);
        let label = if color { label.yellow().to_string() } else { label };
        writeln!(out, "{}:{}: {} {}", path, diagnostic.line, label, diagnostic.message)?;
    }

    for violation in &report.violations {
        let label = format!("[{}]", violation.rule);
        let label = if color { label.red().bold().to_string() } else { label };
        match violation.line {
            Some(line) => writeln!(out, "{path}:{line}: {label} {}", violation.message)?,
            None => writeln!(out, "{path}: {label} {}", violation.message)?,
        }
    }

    Ok(())
}
