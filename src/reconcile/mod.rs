//! Filling unset options from the environment.
//!
//! Precedence per option is command line, then environment, then default.
//! An option counts as set on the command line when it appeared in the
//! argument list, even if its value equals the default.

use std::collections::BTreeSet;
use std::ffi::OsString;

use clap::Command;

use crate::config::Config;
use crate::env::Environment;
use crate::registry::{ClapRegistry, OptionRegistry};
use crate::Result;

/// Applies environment values to the options a parse left at their defaults.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: Config,
}

impl Reconciler {
    /// Create a reconciler with the given naming configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The naming configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Environment variable key for the option `name`.
    #[must_use]
    pub fn env_key(&self, name: &str) -> String {
        self.config.env_key(name)
    }

    /// Parse `args` and fill unset options from the process environment.
    ///
    /// `args` starts with the program name, as `std::env::args_os()` does.
    /// If `registry` already parsed an argument list, `args` is ignored and
    /// only the environment pass runs.
    ///
    /// # Errors
    ///
    /// Returns the registry's error for a malformed argument list or for an
    /// environment value the option's type rejects.
    pub fn parse<R, I, T>(&self, registry: &mut R, args: I) -> Result<()>
    where
        R: OptionRegistry + ?Sized,
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.parse_with(registry, args, &Environment::capture())
    }

    /// Like [`parse`](Self::parse), against a given environment snapshot.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_with<R, I, T>(&self, registry: &mut R, args: I, env: &Environment) -> Result<()>
    where
        R: OptionRegistry + ?Sized,
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if registry.is_parsed() {
            tracing::debug!("Arguments already parsed, reconciling environment only");
        } else {
            registry.parse_args(args.into_iter().map(Into::into).collect())?;
        }

        let applied = self.reconcile(registry, env)?;
        tracing::debug!(count = applied.len(), "Options set from environment");
        Ok(())
    }

    /// Set every defaulted option whose key is present in `env`.
    ///
    /// Returns the names of the options that took an environment value.
    ///
    /// # Errors
    ///
    /// Returns the registry's error for a value the option rejects.
    pub fn reconcile<R>(&self, registry: &mut R, env: &Environment) -> Result<Vec<String>>
    where
        R: OptionRegistry + ?Sized,
    {
        let pending = defaulted(registry);
        tracing::trace!(?pending, "Defaulted options");

        let mut applied = Vec::new();
        for name in pending {
            let key = self.env_key(&name);
            if let Some(value) = env.get(&key) {
                tracing::debug!(option = %name, %key, "Setting option from environment");
                registry.set(&name, value)?;
                applied.push(name);
            }
        }
        Ok(applied)
    }

    /// `KEY=VALUE` lines for the registered options whose key is set in the
    /// process environment.
    #[must_use]
    pub fn environ_of<R>(&self, registry: &R) -> Vec<String>
    where
        R: OptionRegistry + ?Sized,
    {
        self.environ_of_with(registry, &Environment::capture())
    }

    /// Like [`environ_of`](Self::environ_of), against a given snapshot.
    ///
    /// Lines are sorted and unique.
    #[must_use]
    pub fn environ_of_with<R>(&self, registry: &R, env: &Environment) -> Vec<String>
    where
        R: OptionRegistry + ?Sized,
    {
        registry
            .options()
            .iter()
            .filter_map(|option| {
                let key = self.env_key(&option.name);
                env.get(&key)
                    .map(|value| format!("{key}={}", value.to_string_lossy()))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Names of the registered options that did not appear in the parsed
/// argument list.
#[must_use]
pub fn defaulted<R>(registry: &R) -> BTreeSet<String>
where
    R: OptionRegistry + ?Sized,
{
    let all: BTreeSet<String> = registry.options().into_iter().map(|o| o.name).collect();
    let explicit = registry.explicit();
    all.difference(&explicit).cloned().collect()
}

/// Parse `command` against the process arguments and environment with the
/// default naming.
///
/// # Errors
///
/// See [`Reconciler::parse`].
pub fn parse(command: Command) -> Result<ClapRegistry> {
    let mut registry = ClapRegistry::new(command);
    Reconciler::default().parse(&mut registry, std::env::args_os())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Naming;
    use crate::registry::{OptionInfo, Source};
    use crate::Error;
    use clap::{Arg, ArgAction};
    use std::collections::BTreeMap;

    /// In-memory registry recording every value it is given.
    #[derive(Default)]
    struct FakeRegistry {
        options: Vec<&'static str>,
        explicit: Vec<&'static str>,
        values: BTreeMap<String, String>,
        parsed: bool,
        parse_calls: usize,
    }

    impl FakeRegistry {
        fn with_options(options: &[&'static str]) -> Self {
            Self {
                options: options.to_vec(),
                ..Default::default()
            }
        }
    }

    impl OptionRegistry for FakeRegistry {
        fn options(&self) -> Vec<OptionInfo> {
            self.options
                .iter()
                .map(|name| OptionInfo::new(*name, None))
                .collect()
        }

        fn explicit(&self) -> BTreeSet<String> {
            self.explicit.iter().map(|s| (*s).to_string()).collect()
        }

        fn set(&mut self, name: &str, value: &std::ffi::OsStr) -> Result<()> {
            self.values
                .insert(name.to_string(), value.to_string_lossy().into_owned());
            Ok(())
        }

        fn is_parsed(&self) -> bool {
            self.parsed
        }

        fn parse_args(&mut self, _args: Vec<OsString>) -> Result<()> {
            self.parsed = true;
            self.parse_calls += 1;
            Ok(())
        }
    }

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs.iter().copied().collect()
    }

    fn plain() -> Reconciler {
        Reconciler::new(Config::new().with_program("prog")).unwrap()
    }

    fn command() -> Command {
        Command::new("prog")
            .arg(Arg::new("name").long("name").default_value("Michael"))
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_parser(clap::value_parser!(u16))
                    .default_value("2112"),
            )
            .arg(Arg::new("log-level").long("log-level").default_value("info"))
            .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue))
    }

    fn name_of(registry: &ClapRegistry) -> String {
        registry
            .matches()
            .unwrap()
            .get_one::<String>("name")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_defaulted_is_set_difference() {
        let mut registry = FakeRegistry::with_options(&["a", "b", "c"]);
        registry.explicit = vec!["b"];
        let result = defaulted(&registry);
        let expected: BTreeSet<String> = ["a", "c"].iter().map(|s| (*s).to_string()).collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_defaulted_with_no_options() {
        let registry = FakeRegistry::default();
        assert!(defaulted(&registry).is_empty());
    }

    #[test]
    fn test_reconcile_sets_only_defaulted_options_present_in_env() {
        let mut registry = FakeRegistry::with_options(&["name", "port", "host"]);
        registry.explicit = vec!["port"];
        let env = env(&[("NAME", "Gob"), ("PORT", "1"), ("OTHER", "x")]);

        let applied = plain().reconcile(&mut registry, &env).unwrap();

        assert_eq!(applied, vec!["name".to_string()]);
        assert_eq!(registry.values.len(), 1);
        assert_eq!(registry.values["name"], "Gob");
    }

    #[test]
    fn test_parse_only_parses_once() {
        let mut registry = FakeRegistry::with_options(&["name"]);
        let reconciler = plain();
        reconciler
            .parse_with(&mut registry, ["prog"], &Environment::empty())
            .unwrap();
        reconciler
            .parse_with(&mut registry, ["prog"], &env(&[("NAME", "Gob")]))
            .unwrap();
        assert_eq!(registry.parse_calls, 1);
        assert_eq!(registry.values["name"], "Gob");
    }

    #[test]
    fn test_env_value_fills_default() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(&mut registry, ["prog"], &env(&[("NAME", "Gob")]))
            .unwrap();
        assert_eq!(name_of(&registry), "Gob");
        assert_eq!(registry.source_of("name"), Some(Source::Environment));
    }

    #[test]
    fn test_prefix_consults_only_derived_key() {
        let reconciler =
            Reconciler::new(Config::new().with_naming(Naming::prefix("CUSTOM_"))).unwrap();
        let mut registry = ClapRegistry::new(command());
        reconciler
            .parse_with(
                &mut registry,
                ["prog"],
                &env(&[("NAME", "Gob"), ("CUSTOM_NAME", "Tobias")]),
            )
            .unwrap();
        assert_eq!(name_of(&registry), "Tobias");
    }

    #[test]
    fn test_command_line_beats_env() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(
                &mut registry,
                ["prog", "--name=George Oscar Bluth"],
                &env(&[("NAME", "George Michael")]),
            )
            .unwrap();
        assert_eq!(name_of(&registry), "George Oscar Bluth");
        assert_eq!(registry.source_of("name"), Some(Source::CommandLine));
    }

    #[test]
    fn test_explicit_default_value_is_not_overridden() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(
                &mut registry,
                ["prog", "--name", "Michael"],
                &env(&[("NAME", "Gob")]),
            )
            .unwrap();
        assert_eq!(name_of(&registry), "Michael");
    }

    #[test]
    fn test_dashed_option_uses_underscore_key() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(&mut registry, ["prog"], &env(&[("LOG_LEVEL", "debug")]))
            .unwrap();
        let matches = registry.matches().unwrap();
        assert_eq!(matches.get_one::<String>("log-level").unwrap(), "debug");
    }

    #[test]
    fn test_program_naming() {
        let reconciler = Reconciler::new(
            Config::new()
                .with_naming(Naming::Program)
                .with_program("myprog"),
        )
        .unwrap();
        let mut registry = ClapRegistry::new(command());
        reconciler
            .parse_with(
                &mut registry,
                ["myprog"],
                &env(&[("PORT", "1"), ("MYPROG_PORT", "3000")]),
            )
            .unwrap();
        let matches = registry.matches().unwrap();
        assert_eq!(*matches.get_one::<u16>("port").unwrap(), 3000);
    }

    #[test]
    fn test_invalid_env_value_is_clap_error() {
        let mut registry = ClapRegistry::new(command());
        let err = plain()
            .parse_with(&mut registry, ["prog"], &env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, Error::Clap(_)));
    }

    #[test]
    fn test_invalid_env_value_ignored_when_explicit() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(
                &mut registry,
                ["prog", "--port", "9000"],
                &env(&[("PORT", "eighty")]),
            )
            .unwrap();
        let matches = registry.matches().unwrap();
        assert_eq!(*matches.get_one::<u16>("port").unwrap(), 9000);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_env_value_is_clap_error() {
        use std::os::unix::ffi::OsStringExt;

        let reconciler =
            Reconciler::new(Config::new().with_naming(Naming::prefix("APP_"))).unwrap();
        let env: Environment = [("APP_NAME", OsString::from_vec(vec![0x66, 0xff]))]
            .into_iter()
            .collect();
        let mut registry = ClapRegistry::new(command());
        let err = reconciler
            .parse_with(&mut registry, ["prog"], &env)
            .unwrap_err();
        match err {
            Error::Clap(e) => assert_eq!(e.kind(), clap::error::ErrorKind::InvalidUtf8),
            other => panic!("expected clap error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_env_value_ignored_when_explicit() {
        use std::os::unix::ffi::OsStringExt;

        let env: Environment = [("NAME", OsString::from_vec(vec![0x66, 0xff]))]
            .into_iter()
            .collect();
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(&mut registry, ["prog", "--name", "Lindsay"], &env)
            .unwrap();
        assert_eq!(name_of(&registry), "Lindsay");
    }

    #[test]
    fn test_flag_from_env() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(&mut registry, ["prog"], &env(&[("VERBOSE", "true")]))
            .unwrap();
        assert!(registry.matches().unwrap().get_flag("verbose"));
    }

    #[test]
    fn test_empty_env_value_is_applied() {
        let mut registry = ClapRegistry::new(command());
        plain()
            .parse_with(&mut registry, ["prog"], &env(&[("NAME", "")]))
            .unwrap();
        assert_eq!(name_of(&registry), "");
    }

    #[test]
    fn test_zero_options_reconciles_nothing() {
        let mut registry = ClapRegistry::new(Command::new("bare"));
        registry.parse_args(vec!["bare".into()]).unwrap();
        let applied = plain()
            .reconcile(&mut registry, &env(&[("NAME", "Gob")]))
            .unwrap();
        assert!(applied.is_empty());
    }

    #[test]
    fn test_environ_of_empty() {
        let registry = ClapRegistry::new(command());
        assert!(plain()
            .environ_of_with(&registry, &Environment::empty())
            .is_empty());
    }

    #[test]
    fn test_environ_of_lists_only_registered_keys() {
        let registry = ClapRegistry::new(command());
        let env = env(&[("NAME", "Maeby"), ("MONEY_IN_THE_BANANA_STAND", "1")]);
        assert_eq!(
            plain().environ_of_with(&registry, &env),
            vec!["NAME=Maeby".to_string()]
        );
    }

    #[test]
    fn test_environ_of_uses_naming() {
        let reconciler =
            Reconciler::new(Config::new().with_naming(Naming::prefix("APP_"))).unwrap();
        let registry = ClapRegistry::new(command());
        let env = env(&[("NAME", "Gob"), ("APP_NAME", "Buster"), ("APP_PORT", "1")]);
        assert_eq!(
            reconciler.environ_of_with(&registry, &env),
            vec!["APP_NAME=Buster".to_string(), "APP_PORT=1".to_string()]
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Reconciler::new(Config::new().with_naming(Naming::prefix("BAD=")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
