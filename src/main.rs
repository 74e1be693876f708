//! envflag - show where each option's value comes from
//!
//! A small program whose options can be set on the command line or through
//! the environment:
//!
//! ```text
//! envflag
//! envflag --port=2113
//! PORT=2114 envflag
//! PORT=2114 envflag --port=2113
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use clap::{CommandFactory, Parser};
use envflag::observability::{init_tracing, LOG_LEVELS};
use envflag::{ClapRegistry, OptionRegistry, Reconciler, Result};

/// Print each option's value and where it came from
#[derive(Parser, Debug)]
#[command(name = "envflag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "2112")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", value_parser = LOG_LEVELS)]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long)]
    log_json: bool,
}

fn main() {
    if let Err(err) = run() {
        err.exit();
    }
}

fn run() -> Result<()> {
    let mut registry = ClapRegistry::new(Cli::command());
    let reconciler = Reconciler::default();
    reconciler.parse(&mut registry, std::env::args_os())?;
    let cli: Cli = registry.extract()?;

    init_tracing(&cli.log_level, cli.log_json);
    tracing::info!(?cli, "Configuration resolved");

    let Some(matches) = registry.matches() else {
        return Ok(());
    };

    for option in registry.options() {
        let value = matches
            .get_raw(&option.name)
            .map(|raw| {
                raw.map(|v| v.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        let source = registry
            .source_of(&option.name)
            .map_or_else(|| "unset".to_string(), |s| s.to_string());
        println!("{}={value} ({source})", option.name);
    }

    let environ = reconciler.environ_of(&registry);
    if !environ.is_empty() {
        println!();
        for line in environ {
            println!("{line}");
        }
    }

    Ok(())
}
