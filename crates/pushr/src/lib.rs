//! Push runner.
//!
//! Loads a state document into a fresh interpreter, runs it and renders the
//! resulting state.

use std::path::PathBuf;
use std::sync::Once;

use push_snapshot::{dump_state, load_state, SnapshotError};
use push_vm::{CollectStats, Interpreter};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Snapshot {
        path: PathBuf,
        source: SnapshotError,
    },
}

/// Parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub path: PathBuf,
    /// Step budget; zero or negative runs until done or interrupted.
    pub steps: i64,
    pub seed: Option<u64>,
    pub collect: bool,
}

pub const USAGE: &str = "Usage: pushr <state-file> [--steps N] [--seed S] [--collect]";

/// Parse arguments, not counting the program name.
pub fn parse_args(args: &[String]) -> Result<Options, CliError> {
    let mut path = None;
    let mut steps = 0;
    let mut seed = None;
    let mut collect = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--steps" => steps = parse_number(arg, iter.next())?,
            "--seed" => seed = Some(parse_number(arg, iter.next())?),
            "--collect" => collect = true,
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option `{flag}`")));
            }
            file if path.is_none() => path = Some(PathBuf::from(file)),
            extra => {
                return Err(CliError::Usage(format!("unexpected argument `{extra}`")));
            }
        }
    }

    let path = path.ok_or_else(|| CliError::Usage("missing state file".to_owned()))?;
    Ok(Options {
        path,
        steps,
        seed,
        collect,
    })
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, CliError> {
    let value = value.ok_or_else(|| CliError::Usage(format!("`{flag}` needs a value")))?;
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid value `{value}` for `{flag}`")))
}

/// Result of one run.
#[derive(Debug)]
pub struct Report {
    pub steps: u64,
    pub collected: Option<CollectStats>,
    pub state: String,
}

/// Load `source` into a fresh interpreter and run it.
pub fn run_source(options: &Options, source: &str) -> Result<Report, CliError> {
    let mut builder = Interpreter::builder();
    if let Some(seed) = options.seed {
        builder = builder.seed(seed);
    }
    let interp = builder.build();

    let snapshot_error = |source| CliError::Snapshot {
        path: options.path.clone(),
        source,
    };
    load_state(&interp, source).map_err(snapshot_error)?;
    let steps = interp.run(options.steps);
    let collected = if options.collect {
        interp.collector().collect(true)
    } else {
        None
    };
    let state = dump_state(&interp).map_err(snapshot_error)?;
    tracing::debug!(steps, done = interp.done(), "run finished");

    Ok(Report {
        steps,
        collected,
        state,
    })
}

/// Read the file named in `options` and run it.
pub fn run_file(options: &Options) -> Result<Report, CliError> {
    let source = std::fs::read_to_string(&options.path).map_err(|source| CliError::Read {
        path: options.path.clone(),
        source,
    })?;
    run_source(options, &source)
}

#[cfg(test)]
mod tests;
