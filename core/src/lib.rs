//! Command-line option descriptors and the engine that finds them in an
//! argument vector.
//!
//! This crate defines:
//!
//! - [`OptionKind`] and [`OptionValue`]: the tag an option is declared with
//!   and the value it carries.
//! - [`OptionSpec`]: an immutable option descriptor with typed
//!   constructors.
//! - [`ParserConfig`]: prefix, separator, alternate-name and combining
//!   conventions, with POSIX and Windows presets.
//! - [`OptionSpec::parse_option`]: scans an argument vector for one option
//!   and returns a [`ParseOutcome`] that tells absent, invalid and valid
//!   apart.
//! - [`ClaimedIndices`]: the snapshot of already-consumed indices threaded
//!   between parse calls.
//!
//! Registries can be loaded from YAML or JSON ([`load_registry`]), checked
//! for clashes ([`validate_registry`]) and run in one pass ([`parse_all`]).
//!
//! # Example
//!
//! ```
//! use optspec_core::*;
//!
//! let registry = vec![
//!     OptionSpec::flag("all", Some('a'), false, false),
//!     OptionSpec::flag("brief", Some('b'), false, false),
//!     OptionSpec::integer("window-width", Some('w'), 400, false),
//! ];
//! let argv = ["game", "-ab", "--window-width=555"];
//! let parsed = parse_all(&argv, &registry, &ParserConfig::posix());
//!
//! assert_eq!(parsed.value_of("all"), Some(&OptionValue::Flag(true)));
//! assert_eq!(parsed.value_of("brief"), Some(&OptionValue::Flag(true)));
//! assert_eq!(parsed.value_of("window-width"), Some(&OptionValue::Integer(555)));
//! assert!(parsed.unclaimed().is_empty());
//! ```

mod config;
mod error;
mod option;
mod parse;
mod registry;
mod validate;
mod value;

pub use config::{LONG_PREFIX, ParserConfig, SHORT_PREFIX, VALUE_SEPARATOR};
pub use error::{LoadError, Result, SpecError};
pub use option::{OptionDef, OptionSpec, PREFIX_CHARS, SEPARATOR_CHARS, camel_case_alternate};
pub use parse::{Claim, ClaimedIndices, OutcomeStatus, ParseOutcome, resolve_combined_run};
pub use registry::{
    ParsedArguments, RegistryFile, load_registry, parse_all, registry_from_json_str,
    registry_from_yaml_str,
};
pub use validate::{RegistryError, validate_registry};
pub use value::{OptionKind, OptionValue, parse_flag_text};
