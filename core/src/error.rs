//! Error types for descriptor construction and registry loading.
//!
//! Descriptor defects ([`SpecError`]) are programmer errors in a registry
//! definition. The infallible constructors on
//! [`OptionSpec`](crate::OptionSpec) panic with these messages; data-driven
//! callers go through [`OptionSpec::try_new`](crate::OptionSpec::try_new) and
//! receive them as values. Runtime argv failures are never errors: they are
//! reported through [`ParseOutcome`](crate::ParseOutcome).

use thiserror::Error;

use crate::OptionKind;

/// Defects in a single option descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// Long name is empty.
    #[error("option name cannot be empty")]
    EmptyName,
    /// Long name starts with a prefix character or contains whitespace or a
    /// separator character.
    #[error("invalid option name: {0:?}")]
    InvalidName(String),
    /// Alternate name is empty.
    #[error("alternate name cannot be empty")]
    EmptyAlternateName,
    /// Alternate name fails the same rules as the long name.
    #[error("invalid alternate name: {0:?}")]
    InvalidAlternateName(String),
    /// Short name is not exactly one usable character.
    #[error("invalid short name: {0:?}")]
    InvalidShortName(String),
    /// Default value does not carry the declared kind.
    #[error("default value of option `{name}` is {found}, expected {kind}")]
    DefaultKindMismatch {
        name: String,
        kind: OptionKind,
        found: OptionKind,
    },
}

/// Errors that can occur while loading registries and parser configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A descriptor in the file is defective.
    #[error("option #{index} is invalid: {source}")]
    InvalidOption {
        index: usize,
        #[source]
        source: SpecError,
    },
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
