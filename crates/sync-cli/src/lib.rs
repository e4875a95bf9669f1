//! schema-sync command line
//!
//! Argument parsing and command execution behind the `schema-sync` binary:
//! - **check**: compare the local schema against the documentation
//! - **status**: show the local schema and backend counters
//!
//! Exit codes: [`EXIT_OK`] when in sync or the status call succeeds,
//! [`EXIT_BREAKING`] when breaking changes are detected, [`EXIT_ERROR`] on any
//! failure.
//!
//! # Example
//!
//! ```rust,ignore
//! let matches = sync_cli::cli().get_matches();
//! let invocation = sync_cli::Invocation::from_matches(&matches)?;
//! let code = sync_cli::run(&invocation).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use sync_core::{ConfigError, LocalSummary, SchemaSync, SyncConfig, SyncError, SyncStatus};
use sync_diff::{format_report, DiffReport};
use tracing_subscriber::EnvFilter;

/// Schemas in sync, or status succeeded
pub const EXIT_OK: u8 = 0;
/// Any failure
pub const EXIT_ERROR: u8 = 1;
/// Breaking changes detected
pub const EXIT_BREAKING: u8 = 2;

/// Subcommand to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Compare local and remote schemas
    Check,
    /// Local schema and backend summary
    Status,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Subcommand
    pub action: Action,
    /// TOML config file
    pub config: Option<PathBuf>,
    /// Local schema path overriding the configured one
    pub local: Option<PathBuf>,
    /// Emit JSON instead of text
    pub json: bool,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Invocation {
    /// Extract the invocation from parsed matches
    ///
    /// # Errors
    /// Returns error if no subcommand was given
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let (action, args) = match matches.subcommand() {
            Some(("check", args)) => (Action::Check, args),
            Some(("status", args)) => (Action::Status, args),
            _ => anyhow::bail!("no subcommand given; try `schema-sync --help`"),
        };

        Ok(Self {
            action,
            config: args.get_one::<PathBuf>("config").cloned(),
            local: args.get_one::<PathBuf>("local").cloned(),
            json: args.get_flag("json"),
            log_json: args.get_flag("log-json"),
        })
    }
}

/// Command definition
#[must_use]
pub fn cli() -> Command {
    Command::new("schema-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep a local configuration schema in sync with its documentation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Compare the local schema against the documentation")
                .arg(local_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Show the local schema and retrieval backend")
                .arg(local_arg())
                .arg(json_arg()),
        )
}

fn local_arg() -> Arg {
    Arg::new("local")
        .long("local")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Local schema file (defaults to the configured path)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Install the tracing subscriber; logs go to stderr
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // a second install (e.g. from tests) is ignored
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Configuration from `path` (or defaults) with environment overrides applied
///
/// # Errors
/// Returns error if the file cannot be read or an override is invalid
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let config = match path {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::new(),
    };
    config.with_env_overrides()
}

/// Rendered output and exit code of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text written to stdout
    pub output: String,
    /// Process exit code
    pub code: u8,
}

/// Exit code for a comparison result
#[inline]
#[must_use]
pub fn exit_code_for(report: &DiffReport) -> u8 {
    if report.breaking {
        EXIT_BREAKING
    } else {
        EXIT_OK
    }
}

/// Run one command against a connected pipeline
///
/// # Errors
/// Returns error if the command fails or its output cannot be serialized
pub async fn execute(sync: &SchemaSync, invocation: &Invocation) -> anyhow::Result<Outcome> {
    let local = invocation.local.as_deref();

    match invocation.action {
        Action::Check => {
            let report = sync.check(local).await.context("schema check failed")?;
            let output = if invocation.json {
                serde_json::to_string_pretty(&report)?
            } else {
                format_report(&report)
            };
            Ok(Outcome {
                output,
                code: exit_code_for(&report),
            })
        }
        Action::Status => {
            let status = sync.status(local).await.context("status failed")?;
            let output = if invocation.json {
                serde_json::to_string_pretty(&status)?
            } else {
                render_status(&status)
            };
            Ok(Outcome {
                output,
                code: EXIT_OK,
            })
        }
    }
}

/// Status output when the backend cannot be reached
///
/// The local summary is still reported; the exit code is [`EXIT_ERROR`].
///
/// # Errors
/// Returns error if the JSON output cannot be serialized
pub fn degraded_status(
    summary: &LocalSummary,
    err: &SyncError,
    json: bool,
) -> anyhow::Result<Outcome> {
    let output = if json {
        let mut value = serde_json::to_value(summary)?;
        value["retrieval"] = serde_json::Value::Null;
        value["retrieval_error"] = err.to_string().into();
        serde_json::to_string_pretty(&value)?
    } else {
        let mut out = render_local(summary);
        out.push_str(&format!("Retrieval: unavailable ({})\n", err));
        out
    };

    Ok(Outcome {
        output,
        code: EXIT_ERROR,
    })
}

/// Connect, run the command, print its output and release the backend
///
/// For `status` the local schema is summarised before connecting, so an
/// unreachable backend still yields the local part.
///
/// # Errors
/// Returns error if configuration, connection or the command fails
pub async fn run(invocation: &Invocation) -> anyhow::Result<u8> {
    let config = load_config(invocation.config.as_deref())?;
    let summary = match invocation.action {
        Action::Status => {
            let path = invocation.local.as_deref().unwrap_or(&config.local_schema);
            Some(LocalSummary::load(path).context("failed to load local schema")?)
        }
        Action::Check => None,
    };

    let sync = match (SchemaSync::connect(config).await, summary) {
        (Ok(sync), _) => sync,
        (Err(err), Some(summary)) => {
            tracing::warn!("retrieval backend unavailable: {}", err);
            let outcome = degraded_status(&summary, &err, invocation.json)?;
            println!("{}", outcome.output);
            return Ok(outcome.code);
        }
        (Err(err), None) => {
            return Err(err).context("failed to connect to the documentation backend");
        }
    };

    let outcome = execute(&sync, invocation).await;
    if let Err(err) = sync.close().await {
        tracing::warn!("failed to release retrieval backend: {}", err);
    }

    let outcome = outcome?;
    println!("{}", outcome.output);
    Ok(outcome.code)
}

/// Plain-text status
#[must_use]
pub fn render_status(status: &SyncStatus) -> String {
    let mut out = render_local(&LocalSummary {
        local_path: status.local_path.clone(),
        local_version: status.local_version.clone(),
        local_nodes: status.local_nodes,
    });

    out.push_str(&format!("Retrieval: {}\n", status.retrieval.mode));
    for (name, value) in &status.retrieval.counters {
        out.push_str(&format!("  {}: {}\n", name, value));
    }

    out
}

fn render_local(summary: &LocalSummary) -> String {
    let mut out = String::new();

    out.push_str("Schema sync status\n");
    out.push_str(&format!("Local schema: {}\n", summary.local_path.display()));
    out.push_str(&format!("  Version: {}\n", summary.local_version));
    out.push_str(&format!("  Nodes: {}\n", summary.local_nodes));

    out
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
