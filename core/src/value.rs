//! Option value model.
//!
//! [`OptionKind`] is the type tag an option is declared with and
//! [`OptionValue`] is the tagged payload it carries. Every value stored in an
//! [`OptionSpec`](crate::OptionSpec) or produced by a parse must carry the
//! option's kind; `Unset` belongs to the untyped [`OptionKind::None`].

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Kind of value an option accepts.
///
/// # Examples
///
/// ```
/// use optspec_core::{OptionKind, OptionValue};
///
/// assert_eq!(OptionValue::from(3).kind(), OptionKind::Integer);
/// assert_eq!(OptionKind::Real.to_string(), "real");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Boolean switch.
    Flag,
    /// Signed 64-bit integer.
    Integer,
    /// Double precision float.
    Real,
    /// Free text.
    Text,
    /// Untyped placeholder; only presence is recorded.
    None,
}

impl OptionKind {
    /// Returns the lowercase name used in files and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKind::Flag => "flag",
            OptionKind::Integer => "integer",
            OptionKind::Real => "real",
            OptionKind::Text => "text",
            OptionKind::None => "none",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by an option, either as its default or as a parse result.
///
/// Serializes untagged, so registry files write defaults as plain scalars
/// (`true`, `400`, `1.5`, `"anthem"`, `null`).
///
/// Equality and hashing compare `Real` payloads by bit pattern, which keeps
/// [`OptionSpec`](crate::OptionSpec) usable as a set key.
///
/// # Examples
///
/// ```
/// use optspec_core::{OptionKind, OptionValue};
///
/// let width = OptionValue::coerce(OptionKind::Integer, "555");
/// assert_eq!(width, Some(OptionValue::Integer(555)));
///
/// assert_eq!(OptionValue::coerce(OptionKind::Integer, "wide"), None);
/// assert_eq!(
///     OptionValue::coerce(OptionKind::Flag, "off"),
///     Some(OptionValue::Flag(false))
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// No value.
    #[default]
    Unset,
    Flag(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl OptionValue {
    /// Returns the kind this value's tag corresponds to.
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Unset => OptionKind::None,
            OptionValue::Flag(_) => OptionKind::Flag,
            OptionValue::Integer(_) => OptionKind::Integer,
            OptionValue::Real(_) => OptionKind::Real,
            OptionValue::Text(_) => OptionKind::Text,
        }
    }

    /// Returns `true` if the tag of this value is legal for `kind`.
    pub fn matches_kind(&self, kind: OptionKind) -> bool {
        self.kind() == kind
    }

    /// Converts raw argument text into a value of `kind`.
    ///
    /// Returns `None` when the text is not a valid spelling for the kind.
    /// `Text` accepts anything verbatim; `None` accepts nothing, since an
    /// untyped option cannot carry a value.
    pub fn coerce(kind: OptionKind, text: &str) -> Option<Self> {
        match kind {
            OptionKind::Flag => parse_flag_text(text).map(OptionValue::Flag),
            OptionKind::Integer => text.parse().ok().map(OptionValue::Integer),
            OptionKind::Real => text.parse().ok().map(OptionValue::Real),
            OptionKind::Text => Some(OptionValue::Text(text.to_string())),
            OptionKind::None => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            OptionValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Recognizes the truthy and falsy spellings accepted for flag values.
///
/// Matching is ASCII case-insensitive: `true`, `yes`, `on`, `1` and `false`,
/// `no`, `off`, `0`.
pub fn parse_flag_text(text: &str) -> Option<bool> {
    const TRUTHY: [&str; 4] = ["true", "yes", "on", "1"];
    const FALSY: [&str; 4] = ["false", "no", "off", "0"];

    if TRUTHY.iter().any(|t| text.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSY.iter().any(|f| text.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Unset, OptionValue::Unset) => true,
            (OptionValue::Flag(a), OptionValue::Flag(b)) => a == b,
            (OptionValue::Integer(a), OptionValue::Integer(b)) => a == b,
            (OptionValue::Real(a), OptionValue::Real(b)) => a.to_bits() == b.to_bits(),
            (OptionValue::Text(a), OptionValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OptionValue {}

impl Hash for OptionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            OptionValue::Unset => {}
            OptionValue::Flag(b) => b.hash(state),
            OptionValue::Integer(i) => i.hash(state),
            OptionValue::Real(r) => r.to_bits().hash(state),
            OptionValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Unset => f.write_str("unset"),
            OptionValue::Flag(b) => write!(f, "{b}"),
            OptionValue::Integer(i) => write!(f, "{i}"),
            OptionValue::Real(r) => write!(f, "{r}"),
            OptionValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Integer(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Real(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}
