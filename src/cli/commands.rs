use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::dispatcher::Dispatcher;
use crate::logging::{init_logging, LogConfig, LogFormat};
use crate::manifest::load_manifest;
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for mrouter
#[derive(Parser, Debug)]
#[command(name = "mrouter")]
#[command(about = "Inspect and test mrouter route manifests", long_about = None)]
pub struct Cli {
    /// Log level: trace/debug/info/warn/error
    #[arg(long, global = true, env = "MROUTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: json or pretty
    #[arg(long, global = true, env = "MROUTER_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every route a manifest registers
    Routes {
        /// Path to the route manifest (TOML)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Show which route a request would dispatch to
    Match {
        /// Path to the route manifest (TOML)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Request method (e.g. GET)
        method: String,

        /// Request path, query string allowed
        path: String,
    },
}

impl Cli {
    /// Logging configuration: environment defaults overridden by flags
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = LogFormat::parse(format);
        }
        config
    }
}

/// Initialize logging and run the selected command against stdout
///
/// # Errors
///
/// Propagates logging setup and command failures.
pub fn run_cli(cli: Cli) -> Result<()> {
    init_logging(&cli.log_config())?;
    let config = RuntimeConfig::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &config, &mut out)
}

/// Run a command, writing its report to `out`
///
/// # Errors
///
/// Fails if no manifest is given, the manifest is invalid, the method is not
/// a valid HTTP method or `out` cannot be written.
pub fn execute<W: Write>(command: &Commands, config: &RuntimeConfig, out: &mut W) -> Result<()> {
    match command {
        Commands::Routes { manifest } => {
            let dispatcher = load_dispatcher(manifest.as_deref(), config)?;
            writeln!(
                out,
                "{} route(s), base path {}",
                dispatcher.len(),
                display_base(&dispatcher)
            )?;
            for line in dispatcher.route_table() {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Commands::Match {
            manifest,
            method,
            path,
        } => {
            let dispatcher = load_dispatcher(manifest.as_deref(), config)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid method: {method}"))?;

            let Some(matched) = dispatcher.find_route(&method, path) else {
                writeln!(
                    out,
                    "no route for {method} {}",
                    dispatcher.normalize_request_path(path)
                )?;
                return Ok(());
            };

            let route = matched.route;
            writeln!(out, "{} {} -> {}", route.method, route.path, route.handler.describe())?;
            for (name, value) in matched.params.iter() {
                writeln!(out, "  param {name} = {value}")?;
            }
            let middleware = dispatcher.route_middleware(&route.method, &route.path);
            if !middleware.is_empty() {
                writeln!(out, "  middleware: {}", middleware.join(", "))?;
            }
            for name in dispatcher.names_for(&route.path) {
                writeln!(out, "  name: {name}")?;
            }
            Ok(())
        }
    }
}

fn load_dispatcher(manifest: Option<&Path>, config: &RuntimeConfig) -> Result<Dispatcher> {
    let path = manifest
        .or(config.manifest.as_deref())
        .ok_or_else(|| anyhow!("No manifest given: pass --manifest or set MROUTER_MANIFEST"))?;
    let manifest = load_manifest(path)?;

    let mut router = crate::router::Router::with_config(config);
    manifest.apply(&mut router)?;
    Ok(router.into_dispatcher())
}

fn display_base(dispatcher: &Dispatcher) -> &str {
    if dispatcher.base_path().is_empty() {
        "/"
    } else {
        dispatcher.base_path()
    }
}
