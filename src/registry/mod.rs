//! Option registries the reconciler reads and writes.
//!
//! A registry owns the options a program declares and the values they
//! currently hold. The reconciler never registers options itself; it only
//! needs the four capabilities of [`OptionRegistry`]. [`ClapRegistry`]
//! provides them for a `clap::Command`.

mod command;

use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::Result;

pub use command::ClapRegistry;

/// A registered option as the reconciler sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInfo {
    /// Unique option name.
    pub name: String,

    /// Registered default, rendered as a string.
    pub default: Option<String>,
}

impl OptionInfo {
    /// Create an option description.
    pub fn new(name: impl Into<String>, default: Option<String>) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// Where an option's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    /// The registered default.
    Default,
    /// An environment variable.
    Environment,
    /// The argument list.
    CommandLine,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Environment => "environment",
            Self::CommandLine => "command line",
        };
        f.write_str(s)
    }
}

/// The capabilities the reconciler needs from an option registry.
pub trait OptionRegistry {
    /// Every registered option.
    fn options(&self) -> Vec<OptionInfo>;

    /// Names of the options that appeared in the parsed argument list,
    /// whatever value they were given. Empty before parsing.
    fn explicit(&self) -> BTreeSet<String>;

    /// Set an option from a raw value, using the same coercion and
    /// validation as a command-line value. A value that is not valid
    /// Unicode is rejected the way the option would reject it as an
    /// argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is unknown or the value is rejected.
    fn set(&mut self, name: &str, value: &OsStr) -> Result<()>;

    /// Whether an argument list has been parsed.
    fn is_parsed(&self) -> bool;

    /// Parse an argument list. The first element is the program name.
    ///
    /// # Errors
    ///
    /// Returns the parser's error for a malformed argument list.
    fn parse_args(&mut self, args: Vec<OsString>) -> Result<()>;
}
