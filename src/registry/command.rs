//! Option registry backed by a `clap::Command`.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, FromArgMatches};

use super::{OptionInfo, OptionRegistry, Source};
use crate::error::RegistryError;
use crate::Result;

/// Registry over the named top-level options of a `clap::Command`.
///
/// Values set through [`OptionRegistry::set`] become the option's default
/// for a fresh parse of the stored argument list. They are checked with the
/// option's own value parser first, so an environment value that does not
/// fit the option's type fails with the same error a bad argument would.
/// An argument on the command line still beats the new default.
///
/// Positional arguments are not options and are never reconciled.
#[derive(Debug, Clone)]
pub struct ClapRegistry {
    template: Command,
    built: Command,
    args: Vec<OsString>,
    overrides: BTreeMap<String, OsString>,
    matches: Option<ArgMatches>,
}

impl ClapRegistry {
    /// Wrap a command.
    #[must_use]
    pub fn new(command: Command) -> Self {
        let mut built = command.clone();
        built.build();
        Self {
            template: command,
            built,
            args: Vec::new(),
            overrides: BTreeMap::new(),
            matches: None,
        }
    }

    /// The wrapped command, built, as registered.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.built
    }

    /// Matches from the latest parse.
    #[must_use]
    pub const fn matches(&self) -> Option<&ArgMatches> {
        self.matches.as_ref()
    }

    /// Consume the registry and return its matches.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotParsed` if nothing was parsed.
    pub fn into_matches(self) -> Result<ArgMatches> {
        Ok(self.matches.ok_or(RegistryError::NotParsed)?)
    }

    /// Build a `clap` derive type from the latest matches.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotParsed` if nothing was parsed, or clap's
    /// error if the matches do not fit `T`.
    pub fn extract<T: FromArgMatches>(&self) -> Result<T> {
        let matches = self.matches.as_ref().ok_or(RegistryError::NotParsed)?;
        Ok(T::from_arg_matches(matches)?)
    }

    /// Where the current value of `name` came from, or `None` when the
    /// option is unknown, unparsed, or holds no value at all.
    #[must_use]
    pub fn source_of(&self, name: &str) -> Option<Source> {
        self.find(name)?;
        match self.matches.as_ref()?.value_source(name)? {
            ValueSource::CommandLine => Some(Source::CommandLine),
            ValueSource::EnvVariable => Some(Source::Environment),
            _ if self.overrides.contains_key(name) => Some(Source::Environment),
            _ => Some(Source::Default),
        }
    }

    fn registered(&self) -> impl Iterator<Item = &Arg> {
        self.built
            .get_arguments()
            .filter(|arg| !arg.is_positional() && !is_generated(arg))
    }

    fn find(&self, name: &str) -> Option<&Arg> {
        self.registered().find(|arg| arg.get_id() == name)
    }

    /// Run `value` through the option's value parser the way clap does for
    /// a command-line value, by parsing `--long=value` against a one-option
    /// command. The scratch option has no default, so clap's own checks on
    /// defaults never see an unvalidated value.
    fn check(&self, arg: &Arg, value: &OsStr) -> Result<()> {
        let mut flag = if let Some(long) = arg.get_long() {
            OsString::from(format!("--{long}="))
        } else if let Some(short) = arg.get_short() {
            OsString::from(format!("-{short}="))
        } else {
            return Ok(());
        };
        flag.push(value);

        let mut scratch = Arg::new(arg.get_id().clone())
            .action(ArgAction::Append)
            .value_parser(arg.get_value_parser().clone());
        if let Some(long) = arg.get_long() {
            scratch = scratch.long(long.to_string());
        }
        if let Some(short) = arg.get_short() {
            scratch = scratch.short(short);
        }
        if let Some(delim) = arg.get_value_delimiter() {
            scratch = scratch.value_delimiter(delim);
        }
        if let Some(names) = arg.get_value_names() {
            scratch = scratch.value_names(names.to_vec());
        }

        Command::new(self.built.get_name().to_string())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(scratch)
            .try_get_matches_from([OsString::from(self.built.get_name()), flag])?;
        Ok(())
    }

    fn reparse(&mut self) -> Result<()> {
        let mut command = self.template.clone();
        for (name, value) in &self.overrides {
            command = command.mut_arg(name, |arg| arg.default_value(value.clone()));
        }
        let matches = command.try_get_matches_from_mut(self.args.iter().cloned())?;
        self.matches = Some(matches);
        Ok(())
    }
}

impl OptionRegistry for ClapRegistry {
    fn options(&self) -> Vec<OptionInfo> {
        self.registered()
            .map(|arg| {
                let defaults = arg.get_default_values();
                let default = (!defaults.is_empty()).then(|| {
                    defaults
                        .iter()
                        .map(|v| v.to_string_lossy())
                        .collect::<Vec<_>>()
                        .join(",")
                });
                OptionInfo::new(arg.get_id().as_str(), default)
            })
            .collect()
    }

    fn explicit(&self) -> BTreeSet<String> {
        let Some(matches) = self.matches.as_ref() else {
            return BTreeSet::new();
        };
        self.registered()
            .map(|arg| arg.get_id().as_str())
            .filter(|id| matches.value_source(id) == Some(ValueSource::CommandLine))
            .map(str::to_string)
            .collect()
    }

    fn set(&mut self, name: &str, value: &OsStr) -> Result<()> {
        let arg = self
            .find(name)
            .ok_or_else(|| RegistryError::unknown_option(name))?;
        if self.matches.is_none() {
            return Err(RegistryError::NotParsed.into());
        }
        self.check(arg, value)?;
        self.overrides.insert(name.to_string(), value.to_os_string());
        self.reparse()
    }

    fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    fn parse_args(&mut self, args: Vec<OsString>) -> Result<()> {
        self.args = args;
        self.overrides.clear();
        self.reparse()
    }
}

fn is_generated(arg: &Arg) -> bool {
    matches!(
        arg.get_action(),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    )
}
