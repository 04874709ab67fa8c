//! Runtime configuration.
//!
//! [`RuntimeConfig`] collects the knobs that shape the process-wide type
//! registry: which types may be defined without a base, whether built-in
//! descriptors are registered up front, and how much metadata storage is
//! reserved. Values come from [`Default`] or from the environment:
//!
//! | Variable       | Values                                   | Default |
//! |----------------|------------------------------------------|---------|
//! | `REFLEX_LOG`   | `error`, `warn`, `info`, `debug`, `trace`| `warn`  |
//! | `REFLEX_INIT`  | `lazy`, `eager`                          | `lazy`  |
//! | `REFLEX_ROOTS` | `any`, or a comma-separated list of names| built-in roots |

use crate::error::{Error, Result};
use reflex_log::Level;

/// Environment variable selecting the [`InitPolicy`].
pub const INIT_ENV: &str = "REFLEX_INIT";

/// Environment variable selecting the [`RootPolicy`].
pub const ROOTS_ENV: &str = "REFLEX_ROOTS";

/// Root types that every [`RootPolicy::Designated`] policy accepts.
pub const BUILTIN_ROOTS: [&str; 2] = ["System.Object", "System.Exception"];

/// Which qualified names may be defined without a base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootPolicy {
    /// Any type may be a root.
    Any,
    /// Only [`BUILTIN_ROOTS`] and the listed names may be roots.
    Designated(Vec<String>),
}

impl RootPolicy {
    /// Builds a designated policy from a list of extra root names.
    pub fn designated<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RootPolicy::Designated(names.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if `name` may be defined without a base type.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        match self {
            RootPolicy::Any => true,
            RootPolicy::Designated(extra) => {
                BUILTIN_ROOTS.contains(&name) || extra.iter().any(|root| root == name)
            }
        }
    }
}

impl Default for RootPolicy {
    fn default() -> Self {
        RootPolicy::Designated(Vec::new())
    }
}

/// When built-in class descriptors are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPolicy {
    /// On first use of each class.
    #[default]
    Lazy,
    /// During [`initialize`](crate::runtime::initialize).
    Eager,
}

/// Configuration for the process-wide runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Descriptors in the first chunk of the descriptor arena.
    pub arena_chunk_size: usize,
    /// Initial capacity of the registry's name table.
    pub registry_capacity: usize,
    /// Which types may be defined without a base type.
    pub root_policy: RootPolicy,
    /// When built-in descriptors are registered.
    pub init_policy: InitPolicy,
    /// Minimum level written by the runtime logger.
    pub log_level: Level,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            arena_chunk_size: 64,
            registry_capacity: 64,
            root_policy: RootPolicy::default(),
            init_policy: InitPolicy::default(),
            log_level: Level::Warn,
        }
    }
}

impl RuntimeConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for the first variable whose value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for the first value that cannot be
    /// parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RuntimeConfig::default();

        if let Some(raw) = lookup(reflex_log::LEVEL_ENV) {
            config.log_level = raw
                .parse()
                .map_err(|_| invalid(reflex_log::LEVEL_ENV, &raw))?;
        }

        if let Some(raw) = lookup(INIT_ENV) {
            config.init_policy = match raw.trim().to_ascii_lowercase().as_str() {
                "lazy" => InitPolicy::Lazy,
                "eager" => InitPolicy::Eager,
                _ => return Err(invalid(INIT_ENV, &raw)),
            };
        }

        if let Some(raw) = lookup(ROOTS_ENV) {
            config.root_policy = parse_roots(&raw)?;
        }

        Ok(config)
    }
}

fn parse_roots(raw: &str) -> Result<RootPolicy> {
    if raw.trim().eq_ignore_ascii_case("any") {
        return Ok(RootPolicy::Any);
    }

    let names: Vec<&str> = raw.split(',').map(str::trim).collect();
    if names.iter().any(|name| name.is_empty()) {
        return Err(invalid(ROOTS_ENV, raw));
    }
    Ok(RootPolicy::designated(names))
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}
