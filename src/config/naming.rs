//! Mapping option names to environment variable keys.

/// How an option name becomes an environment variable key.
///
/// Every key is upper-cased with `.` and `-` replaced by `_`, so
/// `log-level` maps to `LOG_LEVEL` and `db.url` to `DB_URL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Naming {
    /// The option name alone: `port` -> `PORT`.
    #[default]
    Plain,

    /// A fixed prefix in front of the option name: `CUSTOM_` + `name` -> `CUSTOM_NAME`.
    Prefix(String),

    /// The program name and the option name joined with `_`: `myprog` + `port` -> `MYPROG_PORT`.
    ///
    /// Lets several binaries that share one set of options read distinct
    /// environment namespaces.
    Program,
}

impl Naming {
    /// Create a prefixed naming scheme.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Derive the environment variable key for `name`.
    ///
    /// Pure: the same `(self, name, program)` always yields the same key.
    #[must_use]
    pub fn key_for(&self, name: &str, program: &str) -> String {
        let raw = match self {
            Self::Plain => name.to_string(),
            Self::Prefix(prefix) => format!("{prefix}{name}"),
            Self::Program => format!("{program}_{name}"),
        };
        sanitize(&raw)
    }
}

/// Upper-case `raw` and replace `.` and `-` with `_`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.to_uppercase().replace(['.', '-'], "_")
}
