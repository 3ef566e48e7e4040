//! Registry validation.
//!
//! Individual descriptors enforce their own invariants at construction time.
//! This module checks the invariants that span a whole registry: no two
//! options may share a long spelling or a short name, since the one parsed
//! first would silently shadow the other.
//!
//! # Examples
//!
//! ```
//! use optspec_core::*;
//!
//! let registry = vec![
//!     OptionSpec::flag("verbose", Some('v'), false, false),
//!     OptionSpec::flag("version", Some('V'), false, false),
//! ];
//! assert!(validate_registry(&registry).is_empty());
//!
//! // Two options answering to `-v`.
//! let clash = vec![
//!     OptionSpec::flag("verbose", Some('v'), false, false),
//!     OptionSpec::flag("version", Some('v'), false, false),
//! ];
//! assert_eq!(validate_registry(&clash), vec![RegistryError::DuplicateShortName('v')]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::OptionSpec;

/// Registry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry declares no options.
    #[error("registry declares no options")]
    EmptyRegistry,
    /// A long name is already used as a name or alternate name.
    #[error("duplicate option name: {0}")]
    DuplicateName(String),
    /// An alternate name is already used as a name or alternate name.
    #[error("duplicate alternate name: {0}")]
    DuplicateAlternateName(String),
    /// Two options share a short name.
    #[error("duplicate short name: {0}")]
    DuplicateShortName(char),
}

/// Validates a registry, returning every problem found in registry order.
pub fn validate_registry(registry: &[OptionSpec]) -> Vec<RegistryError> {
    let mut errors = Vec::new();

    if registry.is_empty() {
        errors.push(RegistryError::EmptyRegistry);
        return errors;
    }

    let mut long_names: HashSet<&str> = HashSet::new();
    let mut short_names: HashSet<char> = HashSet::new();

    for spec in registry {
        if !long_names.insert(spec.name()) {
            errors.push(RegistryError::DuplicateName(spec.name().to_string()));
        }

        let alternate = spec.alternate_name();
        if alternate != spec.name() && !long_names.insert(alternate) {
            errors.push(RegistryError::DuplicateAlternateName(alternate.to_string()));
        }

        if let Some(short) = spec.short_name() {
            if !short_names.insert(short) {
                errors.push(RegistryError::DuplicateShortName(short));
            }
        }
    }

    errors
}
