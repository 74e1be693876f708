//! Snapshots of the process environment.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// An immutable set of `KEY=VALUE` pairs.
///
/// A variable set to the empty string is present; only a missing key is
/// absent. Values are kept as raw OS strings, so a value that is not valid
/// Unicode still reaches the option it belongs to and is rejected there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, OsString>,
}

impl Environment {
    /// An environment with no variables.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Entries whose key is not valid Unicode are skipped; derived keys are
    /// always Unicode, so no option can name them.
    #[must_use]
    pub fn capture() -> Self {
        let mut vars = BTreeMap::new();
        for (key, value) in std::env::vars_os() {
            match key.into_string() {
                Ok(key) => {
                    vars.insert(key, value);
                }
                Err(key) => {
                    tracing::trace!(
                        key = %key.to_string_lossy(),
                        "Skipping environment variable with non-Unicode name"
                    );
                }
            }
        }
        Self { vars }
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
