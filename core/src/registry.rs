//! Option registries: loading them from files and running a full pass of
//! [`OptionSpec::parse_option`] over an argument vector.
//!
//! [`parse_all`] is the reference aggregation driver. It parses each option
//! in registry order, threading [`ClaimedIndices`] between calls, and
//! returns a [`ParsedArguments`] report. The report answers questions (which
//! required options are absent, which values are invalid, which tokens nobody
//! claimed) but decides nothing; what is fatal is up to the caller.
//!
//! # Example YAML
//!
//! ```yaml
//! options:
//!   - name: window-width
//!     short: w
//!     default: 400
//!   - name: window-name
//!     default: anthem
//!     required: true
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{LoadError, Result};
use crate::option::{OptionDef, OptionSpec};
use crate::parse::{ClaimedIndices, ParseOutcome};
use crate::value::OptionValue;

/// On-disk layout of a registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    /// Option definitions, in parse order.
    pub options: Vec<OptionDef>,
}

impl RegistryFile {
    /// Builds the descriptors, reporting the first defective entry.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidOption`] with the zero-based position of
    /// the first entry that violates a descriptor invariant.
    pub fn into_specs(self) -> Result<Vec<OptionSpec>> {
        self.options
            .into_iter()
            .enumerate()
            .map(|(index, def)| {
                OptionSpec::try_from(def).map_err(|source| LoadError::InvalidOption { index, source })
            })
            .collect()
    }
}

impl From<&[OptionSpec]> for RegistryFile {
    fn from(registry: &[OptionSpec]) -> Self {
        Self {
            options: registry.iter().cloned().map(OptionDef::from).collect(),
        }
    }
}

/// Loads a registry file.
///
/// Files ending in `.json` are read as JSON, everything else as YAML.
///
/// # Errors
///
/// Returns [`IoError`](LoadError::IoError) if the file cannot be read,
/// [`JsonError`](LoadError::JsonError) / [`YamlError`](LoadError::YamlError)
/// if parsing fails, or [`InvalidOption`](LoadError::InvalidOption) if an
/// entry is defective.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Vec<OptionSpec>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let raw: RegistryFile = if is_json {
        serde_json::from_reader(reader)?
    } else {
        serde_yaml::from_reader(reader)?
    };

    let specs = raw.into_specs()?;
    debug!(path = %path.display(), options = specs.len(), "Loaded option registry");
    Ok(specs)
}

/// Parses a registry from YAML text.
///
/// # Errors
///
/// Returns [`YamlError`](LoadError::YamlError) if parsing fails or
/// [`InvalidOption`](LoadError::InvalidOption) if an entry is defective.
pub fn registry_from_yaml_str(raw: &str) -> Result<Vec<OptionSpec>> {
    let file: RegistryFile = serde_yaml::from_str(raw)?;
    file.into_specs()
}

/// Parses a registry from JSON text.
///
/// # Errors
///
/// Returns [`JsonError`](LoadError::JsonError) if parsing fails or
/// [`InvalidOption`](LoadError::InvalidOption) if an entry is defective.
pub fn registry_from_json_str(raw: &str) -> Result<Vec<OptionSpec>> {
    let file: RegistryFile = serde_json::from_str(raw)?;
    file.into_specs()
}

/// Outcomes of a full pass over an argument vector.
#[derive(Debug, Clone)]
pub struct ParsedArguments<'a> {
    outcomes: Vec<ParseOutcome<'a>>,
    claimed: ClaimedIndices,
    arg_count: usize,
}

impl<'a> ParsedArguments<'a> {
    /// One outcome per registry entry, in registry order.
    pub fn outcomes(&self) -> &[ParseOutcome<'a>] {
        &self.outcomes
    }

    /// Indices claimed once every option has been parsed.
    pub fn claimed(&self) -> &ClaimedIndices {
        &self.claimed
    }

    /// Outcome of the first option with the given long name.
    pub fn get(&self, name: &str) -> Option<&ParseOutcome<'a>> {
        self.outcomes.iter().find(|o| o.owner().name() == name)
    }

    /// Effective value of the named option: parsed, or default when absent.
    ///
    /// `None` when no such option exists or its value is invalid.
    pub fn value_of(&self, name: &str) -> Option<&OptionValue> {
        self.get(name).and_then(ParseOutcome::resolved_value)
    }

    /// Required options that do not appear.
    pub fn missing_required(&self) -> Vec<&'a OptionSpec> {
        self.outcomes
            .iter()
            .filter(|o| o.is_absent() && o.owner().required())
            .map(ParseOutcome::owner)
            .collect()
    }

    /// Outcomes whose value failed to coerce.
    pub fn invalid(&self) -> Vec<&ParseOutcome<'a>> {
        self.outcomes.iter().filter(|o| o.is_invalid()).collect()
    }

    /// Argument-vector indices (after the program name) no option claimed.
    pub fn unclaimed(&self) -> Vec<usize> {
        (1..self.arg_count)
            .filter(|&index| !self.claimed.contains(index))
            .collect()
    }
}

/// Parses every option of `registry` against `argv` in registry order.
///
/// Earlier options win tokens that several could match.
///
/// # Examples
///
/// ```
/// use optspec_core::*;
///
/// let registry = vec![
///     OptionSpec::integer("window-width", Some('w'), 400, false),
///     OptionSpec::text("window-name", None, "anthem", true),
/// ];
/// let argv = ["game", "-w", "555", "extra"];
/// let parsed = parse_all(&argv, &registry, &ParserConfig::posix());
///
/// assert_eq!(parsed.value_of("window-width"), Some(&OptionValue::Integer(555)));
/// assert_eq!(parsed.missing_required()[0].name(), "window-name");
/// assert_eq!(parsed.unclaimed(), vec![3]);
/// ```
pub fn parse_all<'a, S: AsRef<str>>(
    argv: &[S],
    registry: &'a [OptionSpec],
    config: &ParserConfig,
) -> ParsedArguments<'a> {
    let mut claimed = ClaimedIndices::new();
    let mut outcomes = Vec::with_capacity(registry.len());

    for spec in registry {
        let outcome = spec.parse_option(argv, registry, &claimed, config);
        claimed = claimed.extended_by(&outcome);
        outcomes.push(outcome);
    }

    let parsed = ParsedArguments {
        outcomes,
        claimed,
        arg_count: argv.len(),
    };
    debug!(
        options = registry.len(),
        claimed = parsed.claimed.len(),
        unclaimed = ?parsed.unclaimed(),
        "Parsed argument vector"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::parse::Claim;
    use crate::value::OptionKind;

    fn window_registry() -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag("help", Some('h'), false, false),
            OptionSpec::integer("window-width", None, 400, false),
            OptionSpec::integer("window-height", None, 240, false),
            OptionSpec::text("window-name", None, "anthem", false),
        ]
    }

    fn values<'a>(parsed: &'a ParsedArguments<'_>) -> HashMap<&'a str, Option<&'a OptionValue>> {
        parsed
            .outcomes()
            .iter()
            .map(|o| (o.owner().name(), o.resolved_value()))
            .collect()
    }

    #[test]
    fn test_separator_and_spaced_forms_agree() {
        let registry = window_registry();
        let config = ParserConfig::posix();

        let inline = parse_all(
            &[
                "exe",
                "--window-height=13",
                "--window-width=555",
                "--window-name=window",
            ],
            &registry,
            &config,
        );
        let spaced = parse_all(
            &[
                "exe",
                "--window-height",
                "13",
                "--window-width",
                "555",
                "--window-name",
                "window",
            ],
            &registry,
            &config,
        );

        assert_eq!(values(&inline), values(&spaced));
        assert_eq!(inline.value_of("window-width"), Some(&OptionValue::Integer(555)));
        assert_eq!(inline.value_of("window-height"), Some(&OptionValue::Integer(13)));
        assert_eq!(
            spaced.value_of("window-name"),
            Some(&OptionValue::Text("window".to_string()))
        );
        assert!(inline.unclaimed().is_empty());
        assert!(spaced.unclaimed().is_empty());
    }

    #[test]
    fn test_absent_options_fall_back_to_defaults() {
        let registry = window_registry();
        let parsed = parse_all(&["exe", "--window-height", "13"], &registry, &ParserConfig::posix());

        assert_eq!(parsed.value_of("window-width"), Some(&OptionValue::Integer(400)));
        assert_eq!(parsed.value_of("window-height"), Some(&OptionValue::Integer(13)));
        assert_eq!(
            parsed.value_of("window-name"),
            Some(&OptionValue::Text("anthem".to_string()))
        );
        assert_eq!(parsed.value_of("help"), Some(&OptionValue::Flag(false)));
    }

    #[test]
    fn test_unknown_option_left_unclaimed() {
        let registry = window_registry();
        let parsed = parse_all(&["exe", "--xd"], &registry, &ParserConfig::posix());
        assert_eq!(parsed.unclaimed(), vec![1]);
        assert!(parsed.outcomes().iter().all(ParseOutcome::is_absent));
    }

    #[test]
    fn test_at_most_one_claim_per_index() {
        let registry = vec![
            OptionSpec::text("name", Some('n'), "", false),
            OptionSpec::text("nickname", Some('n'), "", false),
            OptionSpec::flag("all", Some('a'), false, false),
            OptionSpec::flag("brief", Some('b'), false, false),
        ];
        let argv = ["exe", "-n", "one", "-n", "two", "--name=three", "-ab"];
        let parsed = parse_all(&argv, &registry, &ParserConfig::posix());

        let mut owners: HashMap<usize, Vec<&str>> = HashMap::new();
        for outcome in parsed.outcomes() {
            for &index in outcome.consumed() {
                owners.entry(index).or_default().push(outcome.owner().name());
            }
        }
        for (index, names) in owners {
            if parsed.claimed().claim(index) == Some(Claim::Combined) {
                continue;
            }
            assert_eq!(names.len(), 1, "index {index} claimed by {names:?}");
        }

        assert_eq!(
            parsed.value_of("name"),
            Some(&OptionValue::Text("one".to_string()))
        );
        assert_eq!(
            parsed.value_of("nickname"),
            Some(&OptionValue::Text("two".to_string()))
        );
        assert_eq!(parsed.get("all").unwrap().consumed(), &[6]);
        assert_eq!(parsed.get("brief").unwrap().consumed(), &[6]);
        assert_eq!(parsed.unclaimed(), vec![5]);
    }

    #[test]
    fn test_missing_required_and_invalid() {
        let registry = vec![
            OptionSpec::integer("count", None, 1, false),
            OptionSpec::text("target", None, "", true),
        ];
        let parsed = parse_all(&["exe", "--count=many"], &registry, &ParserConfig::posix());

        let missing: Vec<&str> = parsed.missing_required().iter().map(|s| s.name()).collect();
        assert_eq!(missing, vec!["target"]);
        let invalid: Vec<&str> = parsed.invalid().iter().map(|o| o.owner().name()).collect();
        assert_eq!(invalid, vec!["count"]);
        assert_eq!(parsed.value_of("count"), None);
    }

    #[test]
    fn test_absence_is_equivalent_to_explicit_default() {
        let registry = window_registry();
        let config = ParserConfig::posix();
        let absent = parse_all(&["exe"], &registry, &config);
        let explicit = parse_all(
            &[
                "exe",
                "--window-width=400",
                "--window-height=240",
                "--window-name=anthem",
            ],
            &registry,
            &config,
        );
        assert_eq!(values(&absent), values(&explicit));
    }

    #[test]
    fn test_registry_from_yaml() {
        let registry = registry_from_yaml_str(
            r#"
options:
  - name: window-width
    short: w
    default: 400
  - name: fullscreen
    default: false
  - name: gamma
    kind: real
    default: 2
"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry[0], OptionSpec::integer("window-width", Some('w'), 400, false));
        assert_eq!(registry[1].kind(), OptionKind::Flag);
        assert_eq!(registry[2].default_value(), &OptionValue::Real(2.0));
    }

    #[test]
    fn test_registry_reports_defective_entry_index() {
        let err = registry_from_json_str(
            r#"{"options": [
                {"name": "ok", "default": 1},
                {"name": "count", "kind": "integer", "default": "ten"}
            ]}"#,
        )
        .unwrap_err();

        match err {
            LoadError::InvalidOption { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(source, crate::SpecError::DefaultKindMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_registry_by_extension() {
        let registry = window_registry();
        let raw = RegistryFile::from(registry.as_slice());

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, "{}", serde_json::to_string_pretty(&raw).unwrap()).unwrap();
        assert_eq!(load_registry(json.path()).unwrap(), registry);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(yaml, "{}", serde_yaml::to_string(&raw).unwrap()).unwrap();
        assert_eq!(load_registry(yaml.path()).unwrap(), registry);
    }
}
