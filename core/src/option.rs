//! Option descriptors.
//!
//! An [`OptionSpec`] is an immutable description of one command-line option:
//! its long name, alternate spelling, short name, kind, default and whether it
//! is required. Descriptors are built once at start-up and shared by every
//! parse call; a changed descriptor is a newly built one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::value::{OptionKind, OptionValue};

/// Characters that introduce an option token on some platform.
pub const PREFIX_CHARS: [char; 2] = ['-', '/'];

/// Characters that separate an option from an inline value on some platform.
pub const SEPARATOR_CHARS: [char; 2] = ['=', ':'];

/// Immutable descriptor of a single command-line option.
///
/// Equality is structural over all descriptor fields, and descriptors hash
/// consistently with it, so they can be deduplicated in sets and looked up
/// by value.
///
/// # Examples
///
/// ```
/// use optspec_core::{OptionKind, OptionSpec, OptionValue};
///
/// let width = OptionSpec::integer("window-width", Some('w'), 400, false);
/// assert_eq!(width.kind(), OptionKind::Integer);
/// assert_eq!(width.alternate_name(), "windowWidth");
/// assert_eq!(width.default_value(), &OptionValue::Integer(400));
///
/// // Typed constructors are shorthand for the canonical one.
/// let canonical = OptionSpec::new(
///     "window-width",
///     "windowWidth",
///     Some('w'),
///     OptionKind::Integer,
///     OptionValue::Integer(400),
///     false,
/// );
/// assert_eq!(width, canonical);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OptionDef", into = "OptionDef")]
pub struct OptionSpec {
    name: String,
    alternate_name: String,
    short_name: Option<char>,
    kind: OptionKind,
    default_value: OptionValue,
    required: bool,
}

impl OptionSpec {
    /// Creates a descriptor from all of its parts.
    ///
    /// # Panics
    ///
    /// Panics if the parts violate a descriptor invariant; see
    /// [`try_new`](Self::try_new) for the fallible form.
    #[track_caller]
    pub fn new(
        name: impl Into<String>,
        alternate_name: impl Into<String>,
        short_name: Option<char>,
        kind: OptionKind,
        default_value: OptionValue,
        required: bool,
    ) -> Self {
        or_defect(Self::try_new(
            name,
            alternate_name,
            short_name,
            kind,
            default_value,
            required,
        ))
    }

    /// Creates a descriptor, reporting invariant violations as [`SpecError`].
    ///
    /// # Errors
    ///
    /// - [`SpecError::EmptyName`] / [`SpecError::InvalidName`] when the long
    ///   name is empty, starts with a prefix character, or contains
    ///   whitespace or a separator character.
    /// - [`SpecError::EmptyAlternateName`] /
    ///   [`SpecError::InvalidAlternateName`] for the same rules on the
    ///   alternate name.
    /// - [`SpecError::InvalidShortName`] when the short name is whitespace, a
    ///   control character, or a prefix or separator character.
    /// - [`SpecError::DefaultKindMismatch`] when the default's tag is not
    ///   `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use optspec_core::{OptionKind, OptionSpec, OptionValue, SpecError};
    ///
    /// let err = OptionSpec::try_new(
    ///     "count",
    ///     "count",
    ///     None,
    ///     OptionKind::Integer,
    ///     OptionValue::Text("ten".into()),
    ///     false,
    /// )
    /// .unwrap_err();
    /// assert!(matches!(err, SpecError::DefaultKindMismatch { .. }));
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        alternate_name: impl Into<String>,
        short_name: Option<char>,
        kind: OptionKind,
        default_value: OptionValue,
        required: bool,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        let alternate_name = alternate_name.into();

        if name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if !is_valid_long_name(&name) {
            return Err(SpecError::InvalidName(name));
        }
        if alternate_name.is_empty() {
            return Err(SpecError::EmptyAlternateName);
        }
        if !is_valid_long_name(&alternate_name) {
            return Err(SpecError::InvalidAlternateName(alternate_name));
        }
        if let Some(short) = short_name {
            if !is_valid_short_name(short) {
                return Err(SpecError::InvalidShortName(short.to_string()));
            }
        }
        if !default_value.matches_kind(kind) {
            return Err(SpecError::DefaultKindMismatch {
                name,
                kind,
                found: default_value.kind(),
            });
        }

        Ok(Self {
            name,
            alternate_name,
            short_name,
            kind,
            default_value,
            required,
        })
    }

    /// Creates a descriptor with an explicit kind and a derived alternate
    /// name.
    #[track_caller]
    pub fn with_kind(
        name: impl Into<String>,
        short_name: Option<char>,
        kind: OptionKind,
        default_value: OptionValue,
        required: bool,
    ) -> Self {
        let name = name.into();
        let alternate_name = camel_case_alternate(&name);
        Self::new(name, alternate_name, short_name, kind, default_value, required)
    }

    /// Creates a boolean option.
    ///
    /// Bare presence of a flag on the command line flips its default.
    #[track_caller]
    pub fn flag(
        name: impl Into<String>,
        short_name: Option<char>,
        default_value: bool,
        required: bool,
    ) -> Self {
        Self::from_default(name, short_name, default_value, required)
    }

    /// Creates an integer option.
    #[track_caller]
    pub fn integer(
        name: impl Into<String>,
        short_name: Option<char>,
        default_value: i64,
        required: bool,
    ) -> Self {
        Self::from_default(name, short_name, default_value, required)
    }

    /// Creates a floating point option.
    #[track_caller]
    pub fn real(
        name: impl Into<String>,
        short_name: Option<char>,
        default_value: f64,
        required: bool,
    ) -> Self {
        Self::from_default(name, short_name, default_value, required)
    }

    /// Creates a text option.
    #[track_caller]
    pub fn text(
        name: impl Into<String>,
        short_name: Option<char>,
        default_value: impl Into<String>,
        required: bool,
    ) -> Self {
        Self::from_default(name, short_name, default_value.into(), required)
    }

    /// Creates an option whose kind is inferred from its default value.
    ///
    /// # Examples
    ///
    /// ```
    /// use optspec_core::{OptionKind, OptionSpec};
    ///
    /// assert_eq!(OptionSpec::from_default("help", None, false, false).kind(), OptionKind::Flag);
    /// assert_eq!(OptionSpec::from_default("scale", None, 1.5, false).kind(), OptionKind::Real);
    /// assert_eq!(OptionSpec::from_default("title", None, "anthem", false).kind(), OptionKind::Text);
    /// ```
    #[track_caller]
    pub fn from_default(
        name: impl Into<String>,
        short_name: Option<char>,
        default_value: impl Into<OptionValue>,
        required: bool,
    ) -> Self {
        let default_value = default_value.into();
        Self::with_kind(name, short_name, default_value.kind(), default_value, required)
    }

    /// Returns a copy of this descriptor with a different alternate name.
    #[track_caller]
    pub fn with_alternate_name(self, alternate_name: impl Into<String>) -> Self {
        Self::new(
            self.name,
            alternate_name,
            self.short_name,
            self.kind,
            self.default_value,
            self.required,
        )
    }

    /// Returns a copy of this descriptor with a different short name.
    #[track_caller]
    pub fn with_short_name(self, short_name: Option<char>) -> Self {
        Self::new(
            self.name,
            self.alternate_name,
            short_name,
            self.kind,
            self.default_value,
            self.required,
        )
    }

    /// Returns a copy of this descriptor with a different required flag.
    pub fn with_required(self, required: bool) -> Self {
        Self { required, ..self }
    }

    /// Long name, without any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternate long name; equal to [`name`](Self::name) when none applies.
    pub fn alternate_name(&self) -> &str {
        &self.alternate_name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default_value
    }

    /// Whether this option is required.
    ///
    /// Advisory only: a validator may ignore it, for example inside a
    /// mutually exclusive group.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns `true` if `key` spells this option's long name, or its
    /// alternate name when `use_alternate_name` is set.
    pub fn matches_long(&self, key: &str, use_alternate_name: bool) -> bool {
        key == self.name || (use_alternate_name && key == self.alternate_name)
    }
}

/// Derives the camel-case alternate spelling of a long name.
///
/// `-` and `_` act as word breaks; a name without them is its own alternate.
///
/// # Examples
///
/// ```
/// use optspec_core::camel_case_alternate;
///
/// assert_eq!(camel_case_alternate("window-width"), "windowWidth");
/// assert_eq!(camel_case_alternate("log_level"), "logLevel");
/// assert_eq!(camel_case_alternate("help"), "help");
/// ```
pub fn camel_case_alternate(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for ch in name.chars() {
        if ch == '-' || ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    if out.is_empty() {
        name.to_string()
    } else {
        out
    }
}

fn is_valid_long_name(name: &str) -> bool {
    !name.starts_with(PREFIX_CHARS)
        && !name
            .chars()
            .any(|ch| ch.is_whitespace() || SEPARATOR_CHARS.contains(&ch))
}

fn is_valid_short_name(short: char) -> bool {
    !short.is_whitespace()
        && !short.is_control()
        && !PREFIX_CHARS.contains(&short)
        && !SEPARATOR_CHARS.contains(&short)
}

#[track_caller]
fn or_defect(result: Result<OptionSpec, SpecError>) -> OptionSpec {
    match result {
        Ok(spec) => spec,
        Err(err) => panic!("invalid option descriptor: {err}"),
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (alternate: {}", self.name, self.alternate_name)?;
        if let Some(short) = self.short_name {
            write!(f, ", short: {short}")?;
        }
        write!(
            f,
            ", kind: {}, default: {}, required: {})",
            self.kind, self.default_value, self.required
        )
    }
}

/// File representation of an [`OptionSpec`].
///
/// Used by registry files. `kind` may be omitted when it can be inferred from
/// `default`; `default` may be omitted, in which case the kind's zero value
/// is used (`false`, `0`, `0.0`, `""`). An integer default is accepted for a
/// `real` option. `alternate` falls back to the derived camel-case spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionKind>,
    #[serde(default)]
    pub default: OptionValue,
    #[serde(default)]
    pub required: bool,
}

impl TryFrom<OptionDef> for OptionSpec {
    type Error = SpecError;

    fn try_from(def: OptionDef) -> Result<Self, Self::Error> {
        let short_name = match def.short.as_deref() {
            None => None,
            Some(short) => {
                let mut chars = short.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(ch),
                    _ => return Err(SpecError::InvalidShortName(short.to_string())),
                }
            }
        };

        let kind = def.kind.unwrap_or_else(|| def.default.kind());
        let default_value = match (kind, def.default) {
            (OptionKind::Flag, OptionValue::Unset) => OptionValue::Flag(false),
            (OptionKind::Integer, OptionValue::Unset) => OptionValue::Integer(0),
            (OptionKind::Real, OptionValue::Unset) => OptionValue::Real(0.0),
            (OptionKind::Text, OptionValue::Unset) => OptionValue::Text(String::new()),
            (OptionKind::Real, OptionValue::Integer(i)) => OptionValue::Real(i as f64),
            (_, value) => value,
        };

        let alternate_name = def
            .alternate
            .unwrap_or_else(|| camel_case_alternate(&def.name));

        OptionSpec::try_new(
            def.name,
            alternate_name,
            short_name,
            kind,
            default_value,
            def.required,
        )
    }
}

impl From<OptionSpec> for OptionDef {
    fn from(spec: OptionSpec) -> Self {
        let alternate = (spec.alternate_name != camel_case_alternate(&spec.name))
            .then_some(spec.alternate_name);
        Self {
            name: spec.name,
            alternate,
            short: spec.short_name.map(String::from),
            kind: Some(spec.kind),
            default: spec.default_value,
            required: spec.required,
        }
    }
}
