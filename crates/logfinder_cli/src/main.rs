// logfinder: print lines from FILE1 that have no similar line in FILE2
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use logfinder_core::{compare_files, LogfinderError, MalformedPolicy, UnmatchedLine};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnMalformed {
    /// Stop at the first line without a syslog timestamp
    Abort,
    /// Warn about the line and keep going
    Skip,
}

impl From<OnMalformed> for MalformedPolicy {
    fn from(v: OnMalformed) -> Self {
        match v {
            OnMalformed::Abort => MalformedPolicy::Abort,
            OnMalformed::Skip => MalformedPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The unmatched line as read
    Text,
    /// One JSON object per unmatched line with its number and tokens
    Ndjson,
}

/// Lines from FILE1 will be output if similar lines do not exist in FILE2.
///
/// Both files are syslog formatted. The leading timestamp is ignored and
/// numbers anywhere in the message match any other number.
#[derive(Debug, Parser)]
#[command(name = "logfinder", version)]
struct Cli {
    /// Candidate log whose lines are reported
    file1: PathBuf,

    /// Reference log of known lines
    file2: PathBuf,

    #[arg(long, value_enum, env = "LOGFINDER_ON_MALFORMED", default_value_t = OnMalformed::Abort)]
    on_malformed: OnMalformed,

    #[arg(long, value_enum, env = "LOGFINDER_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print run statistics as JSON on stderr
    #[arg(long)]
    summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if verbose {
        filter = filter.add_directive(LevelFilter::DEBUG.into());
    }
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn write_unmatched<W: Write>(out: &mut W, format: OutputFormat, u: &UnmatchedLine<'_>) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", u.line),
        OutputFormat::Ndjson => {
            serde_json::to_writer(&mut *out, u)?;
            out.write_all(b"\n")
        }
    }
}

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn run<W: Write>(cli: &Cli, sink: W) -> Result<()> {
    debug!(file1 = %cli.file1.display(), file2 = %cli.file2.display(), "comparing");
    let mut out = BufWriter::new(sink);

    let stats = compare_files(&cli.file1, &cli.file2, cli.on_malformed.into(), |u| {
        write_unmatched(&mut out, cli.format, u)
    })?;
    out.flush().map_err(LogfinderError::Output)?;

    if cli.summary {
        eprintln!("{}", serde_json::to_string(&stats)?);
    }
    Ok(())
}

// A reader closing the pipe early (`| head`) ends the run normally.
fn is_broken_pipe(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<LogfinderError>(),
        Some(LogfinderError::Output(io_err)) if io_err.kind() == io::ErrorKind::BrokenPipe
    )
}

/// Report a failed run on `diag` and map the outcome to an exit status.
fn exit_status<D: Write>(result: &Result<()>, diag: &mut D) -> u8 {
    match result {
        Ok(()) => EXIT_OK,
        Err(e) if is_broken_pipe(e) => {
            debug!("output closed early");
            EXIT_OK
        }
        Err(e) => {
            let _ = writeln!(diag, "logfinder: {e}");
            EXIT_FAILURE
        }
    }
}

/// The parse error goes to `diag`, the help text to `out`.
fn usage<O: Write, D: Write>(err: &clap::Error, out: &mut O, diag: &mut D) -> u8 {
    let _ = write!(diag, "{err}");
    let _ = write!(out, "{}", Cli::command().render_help());
    EXIT_USAGE
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return ExitCode::from(usage(&e, &mut io::stdout(), &mut io::stderr())),
    };

    init_tracing(cli.verbose);
    let result = run(&cli, io::stdout().lock());
    ExitCode::from(exit_status(&result, &mut io::stderr()))
}
