// SPDX-License-Identifier: MIT
//
// Environment configuration.
//
// There is no config file and there are no flags. The only knobs are for
// diagnostics, and they come from the environment:
//
//   DUXI_LOG        path of a log file (logging is off without it)
//   DUXI_LOG_LEVEL  tracing filter directive, default "info"
//
// Empty values count as unset.

use std::env;
use std::path::PathBuf;

/// Default filter directive when `DUXI_LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings gathered at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where to append log lines. `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// `EnvFilter` directive string.
    pub log_level: String,
}

impl Config {
    /// Read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            log_file: get("DUXI_LOG").map(PathBuf::from),
            log_level: get("DUXI_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_is_default() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(lookup(&[
            ("DUXI_LOG", "/tmp/duxi.log"),
            ("DUXI_LOG_LEVEL", "duxi_term=debug"),
        ]));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/duxi.log")));
        assert_eq!(config.log_level, "duxi_term=debug");
    }

    #[test]
    fn blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("DUXI_LOG", ""), ("DUXI_LOG_LEVEL", "  ")]));
        assert_eq!(config, Config::default());
    }
}
