//! Error types for the `Reflex` runtime.
//!
//! Every fallible operation in the runtime returns [`Result`]. Errors are
//! deterministic for a given input, so none of them is worth retrying.

use thiserror::Error;

/// Errors that can occur in the `Reflex` runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A type with this name is already registered with a different base
    /// type.
    #[error(
        "type `{name}` is already registered with base {existing_base} (requested base {requested_base})"
    )]
    DuplicateType {
        /// Qualified name of the conflicting type.
        name: String,
        /// Base of the registered descriptor, or `<none>`.
        existing_base: String,
        /// Base of the rejected definition, or `<none>`.
        requested_base: String,
    },

    /// A type with this name is already registered with the same base type
    /// but a different field list.
    #[error(
        "type `{name}` is already registered with fields ({existing_fields}) (requested fields ({requested_fields}))"
    )]
    DuplicateFields {
        /// Qualified name of the conflicting type.
        name: String,
        /// Fields of the registered descriptor, as `name: Type` pairs.
        existing_fields: String,
        /// Fields of the rejected definition, as `name: Type` pairs.
        requested_fields: String,
    },

    /// The qualified name is empty or malformed.
    #[error("invalid qualified type name: {name:?}")]
    InvalidTypeName {
        /// The rejected name.
        name: String,
    },

    /// A type without a base type was defined, but its name is not a
    /// designated root.
    #[error("type `{name}` has no base type and is not a designated root")]
    UndesignatedRoot {
        /// Qualified name of the rejected type.
        name: String,
    },

    /// The descriptor was registered without a constructor.
    #[error("type `{name}` has no constructor")]
    NotConstructible {
        /// Qualified name of the type.
        name: String,
    },

    /// A constructor produced an instance stamped with another descriptor.
    #[error("constructor for `{expected}` produced an instance of `{got}`")]
    ConstructorMismatch {
        /// Type whose constructor was invoked.
        expected: String,
        /// Type of the produced instance.
        got: String,
    },

    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Configuration key (environment variable name).
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The global registry or descriptor arena was used before
    /// [`initialize`](crate::runtime::initialize) and was created with a
    /// different setting than the one requested.
    #[error("runtime already in use with a different {setting}; initialize before first use")]
    RegistryInUse {
        /// The setting that could not be applied.
        setting: &'static str,
    },

    /// [`initialize`](crate::runtime::initialize) was called more than once.
    #[error("runtime is already initialized")]
    AlreadyInitialized,
}

impl Error {
    /// Returns `true` for both kinds of conflicting redefinition.
    #[must_use]
    pub fn is_duplicate_type(&self) -> bool {
        matches!(self, Error::DuplicateType { .. } | Error::DuplicateFields { .. })
    }
}

/// Result type for `Reflex` runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
