//! Parser conventions: prefixes, value separator, alternate naming and
//! short-flag combining.
//!
//! The platform default follows the host's command-line habits. Files may
//! override any subset of the fields; the rest keep the platform default.
//!
//! # Example YAML
//!
//! ```yaml
//! long_prefix: "--"
//! short_prefix: "-"
//! separator: "="
//! allow_combining: true
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix of long option names on the current platform.
#[cfg(windows)]
pub const LONG_PREFIX: &str = "/";
#[cfg(not(windows))]
pub const LONG_PREFIX: &str = "--";

/// Prefix of short option names on the current platform.
#[cfg(windows)]
pub const SHORT_PREFIX: &str = "/";
#[cfg(not(windows))]
pub const SHORT_PREFIX: &str = "-";

/// Separator between an option and an inline value on the current platform.
#[cfg(windows)]
pub const VALUE_SEPARATOR: &str = ":";
#[cfg(not(windows))]
pub const VALUE_SEPARATOR: &str = "=";

/// Token conventions used when scanning an argument vector.
///
/// # Examples
///
/// ```
/// use optspec_core::ParserConfig;
///
/// let posix = ParserConfig::posix();
/// assert_eq!(posix.long_prefix, "--");
/// assert!(posix.allow_combining);
///
/// let windows = ParserConfig::windows();
/// assert_eq!(windows.separator, ":");
/// assert!(windows.use_alternate_name);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Prefix of long names (e.g. `--`).
    pub long_prefix: String,
    /// Prefix of short names (e.g. `-`).
    pub short_prefix: String,
    /// Extra prefix accepted for both long and short names; empty for none.
    pub alternate_prefix: String,
    /// Separator between a name and an inline value; empty disables inline
    /// values.
    pub separator: String,
    /// Accept the alternate spelling of long names.
    pub use_alternate_name: bool,
    /// Accept the separator after a short name (`-n=value`).
    pub allow_separator_for_short: bool,
    /// Accept several flag short names behind one prefix (`-abc`).
    pub allow_combining: bool,
}

impl ParserConfig {
    /// GNU-style conventions: `--name=value`, `-n value`, `-abc`.
    pub fn posix() -> Self {
        Self {
            long_prefix: "--".to_string(),
            short_prefix: "-".to_string(),
            alternate_prefix: String::new(),
            separator: "=".to_string(),
            use_alternate_name: false,
            allow_separator_for_short: false,
            allow_combining: true,
        }
    }

    /// Windows-style conventions: `/Name:value`, `/n:value`, with `-` also
    /// accepted as a prefix.
    pub fn windows() -> Self {
        Self {
            long_prefix: "/".to_string(),
            short_prefix: "/".to_string(),
            alternate_prefix: "-".to_string(),
            separator: ":".to_string(),
            use_alternate_name: true,
            allow_separator_for_short: true,
            allow_combining: false,
        }
    }

    /// Conventions of the platform this crate was compiled for.
    pub fn platform() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::posix()
        }
    }

    /// Loads a configuration from a YAML file.
    ///
    /// Fields missing from the file keep their [`platform`](Self::platform)
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::LoadError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Parses a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::LoadError::YamlError) if parsing fails.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::platform()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_platform_matches_constants() {
        let config = ParserConfig::platform();
        assert_eq!(config.long_prefix, LONG_PREFIX);
        assert_eq!(config.short_prefix, SHORT_PREFIX);
        assert_eq!(config.separator, VALUE_SEPARATOR);
        assert_eq!(ParserConfig::default(), config);
    }

    #[test]
    fn test_partial_yaml_keeps_platform_defaults() {
        let config = ParserConfig::from_yaml_str("allow_separator_for_short: true\n").unwrap();
        let expected = ParserConfig {
            allow_separator_for_short: true,
            ..ParserConfig::platform()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ParserConfig::from_yaml_str("long_prefx: \"--\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "long_prefix: \"/\"\nshort_prefix: \"/\"\nseparator: \":\"").unwrap();

        let config = ParserConfig::load(file.path()).unwrap();
        assert_eq!(config.long_prefix, "/");
        assert_eq!(config.short_prefix, "/");
        assert_eq!(config.separator, ":");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ParserConfig::load("/nonexistent/parser-config.yaml").unwrap_err();
        assert!(matches!(err, crate::LoadError::IoError(_)));
    }
}
