//! Reconciler settings and validation.

use std::ffi::OsStr;
use std::path::Path;

use super::Naming;
use crate::{Error, Result};

/// Settings held by a [`Reconciler`](crate::Reconciler).
///
/// Set these before the first parse. Changing them afterwards has no effect
/// on values that were already reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How option names map to environment variable keys.
    pub naming: Naming,

    /// Basename of the running program, used by [`Naming::Program`].
    pub program: String,
}

impl Default for Config {
    fn default() -> Self {
        let program = std::env::args_os()
            .next()
            .map(|arg0| program_name(&arg0))
            .unwrap_or_default();

        Self {
            naming: Naming::default(),
            program,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the naming scheme.
    #[must_use]
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Replace the program name.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if a derived key could never be a valid environment
    /// variable name.
    pub fn validate(&self) -> Result<()> {
        if let Naming::Prefix(prefix) = &self.naming {
            check_key_part("prefix", prefix)?;
        }

        if self.naming == Naming::Program {
            if self.program.is_empty() {
                return Err(Error::config(
                    "program name cannot be empty with program naming",
                ));
            }
            check_key_part("program name", &self.program)?;
        }

        Ok(())
    }

    /// Environment variable key for the option `name`.
    #[must_use]
    pub fn env_key(&self, name: &str) -> String {
        self.naming.key_for(name, &self.program)
    }
}

/// Basename of an invocation path such as `argv[0]`.
#[must_use]
pub fn program_name(arg0: &OsStr) -> String {
    Path::new(arg0)
        .file_name()
        .unwrap_or(arg0)
        .to_string_lossy()
        .into_owned()
}

fn check_key_part(what: &str, value: &str) -> Result<()> {
    if value.contains(['=', '\0']) {
        return Err(Error::config(format!(
            "{what} '{}' cannot contain '=' or NUL",
            value.escape_default()
        )));
    }
    Ok(())
}
