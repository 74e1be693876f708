//! Error types and Result aliases for envflag.
//!
//! Reconciliation adds no error kinds of its own. Bad values, whether they
//! came from the command line or from the environment, surface as the
//! `clap::Error` clap would have produced for a bad argument.

use thiserror::Error;

/// Result type alias using envflag's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for envflag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Naming configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Option registry error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Argument parsing or value coercion error reported by clap.
    #[error(transparent)]
    Clap(#[from] clap::Error),
}

/// Option registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No option with this name is registered.
    #[error("unknown option '{name}'")]
    UnknownOption { name: String },

    /// A value was set before the argument list was parsed.
    #[error("arguments have not been parsed yet")]
    NotParsed,
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Exit the process the way clap would for its own errors.
    ///
    /// Clap errors keep clap's exit policy (usage on stderr, exit code 2,
    /// help and version on stdout with code 0). Anything else is printed to
    /// stderr with exit code 1.
    pub fn exit(&self) -> ! {
        match self {
            Self::Clap(err) => err.exit(),
            other => {
                eprintln!("error: {other}");
                std::process::exit(1)
            }
        }
    }
}

impl RegistryError {
    /// Create an unknown-option error.
    pub fn unknown_option(name: impl Into<String>) -> Self {
        Self::UnknownOption { name: name.into() }
    }
}
