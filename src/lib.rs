//! envflag
//!
//! Fill command-line options that were not given on the command line from
//! environment variables. Precedence is command-line argument, environment
//! variable, default.
//!
//! Options are declared with `clap` as usual. Wrap the command in a
//! [`ClapRegistry`] and parse through a [`Reconciler`] instead of calling
//! `get_matches`:
//!
//! ```no_run
//! use clap::{Arg, Command};
//! use envflag::{ClapRegistry, Reconciler};
//!
//! # fn main() -> envflag::Result<()> {
//! let command = Command::new("server").arg(Arg::new("port").long("port").default_value("2112"));
//! let mut registry = ClapRegistry::new(command);
//! Reconciler::default().parse(&mut registry, std::env::args_os())?;
//! // PORT=2114 server            -> 2114
//! // PORT=2114 server --port=2113 -> 2113
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod env;
pub mod error;
pub mod observability;
pub mod reconcile;
pub mod registry;

pub use config::{Config, Naming};
pub use env::Environment;
pub use error::{Error, RegistryError, Result};
pub use reconcile::{defaulted, parse, Reconciler};
pub use registry::{ClapRegistry, OptionInfo, OptionRegistry, Source};
