//! Argument-vector scanning for a single option.
//!
//! [`OptionSpec::parse_option`] is a pure function of the argument vector,
//! the registry, the already-claimed indices and the parser configuration.
//! Callers thread [`ClaimedIndices`] from one call to the next with
//! [`ClaimedIndices::extended_by`]; nothing else is carried between calls.
//!
//! # Example
//!
//! ```
//! use optspec_core::*;
//!
//! let registry = vec![
//!     OptionSpec::integer("window-width", Some('w'), 400, false),
//!     OptionSpec::flag("help", Some('h'), false, false),
//! ];
//! let argv = ["game", "--window-width", "555", "-h"];
//! let config = ParserConfig::posix();
//!
//! let claimed = ClaimedIndices::new();
//! let width = registry[0].parse_option(&argv, &registry, &claimed, &config);
//! assert_eq!(width.value(), Some(&OptionValue::Integer(555)));
//! assert_eq!(width.consumed(), &[1, 2]);
//!
//! let claimed = claimed.extended_by(&width);
//! let help = registry[1].parse_option(&argv, &registry, &claimed, &config);
//! assert_eq!(help.value(), Some(&OptionValue::Flag(true)));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::option::OptionSpec;
use crate::value::{OptionKind, OptionValue};

/// How an argument-vector index has been claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Claim {
    /// Owned by a single option; never matched again.
    Exclusive,
    /// A run of combined short flags; other flags of the same run may still
    /// match it.
    Combined,
}

/// Immutable snapshot of argument-vector indices already attributed to
/// options.
///
/// # Examples
///
/// ```
/// use optspec_core::{Claim, ClaimedIndices};
///
/// let claimed: ClaimedIndices = [2, 3].into_iter().collect();
/// assert!(claimed.contains(2));
/// assert_eq!(claimed.claim(3), Some(Claim::Exclusive));
/// assert!(!claimed.contains(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedIndices {
    claims: BTreeMap<usize, Claim>,
}

impl ClaimedIndices {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new snapshot that also holds every index `outcome` consumed.
    ///
    /// Indices consumed through a combined flag run are recorded as
    /// [`Claim::Combined`]; all others as [`Claim::Exclusive`]. An exclusive
    /// claim is never downgraded.
    pub fn extended_by(&self, outcome: &ParseOutcome<'_>) -> Self {
        let mut claims = self.claims.clone();
        let claim = if outcome.is_combined() {
            Claim::Combined
        } else {
            Claim::Exclusive
        };
        for &index in outcome.consumed() {
            let entry = claims.entry(index).or_insert(claim);
            if claim == Claim::Exclusive {
                *entry = Claim::Exclusive;
            }
        }
        Self { claims }
    }

    pub fn claim(&self, index: usize) -> Option<Claim> {
        self.claims.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.claims.contains_key(&index)
    }

    /// Claimed indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.claims.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl FromIterator<usize> for ClaimedIndices {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|index| (index, Claim::Exclusive))
                .collect(),
        }
    }
}

/// Classification of a [`ParseOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The option does not appear; its default applies.
    Absent,
    /// The option appears but its value could not be coerced to its kind.
    Invalid,
    /// The option appears with a value of its kind.
    Valid,
}

/// Result of scanning the argument vector for one option.
///
/// Borrows its owner from the registry it was parsed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome<'a> {
    owner: &'a OptionSpec,
    value: Option<OptionValue>,
    consumed: Vec<usize>,
    combined: bool,
}

impl<'a> ParseOutcome<'a> {
    fn absent(owner: &'a OptionSpec) -> Self {
        Self {
            owner,
            value: None,
            consumed: Vec::new(),
            combined: false,
        }
    }

    /// The descriptor this outcome belongs to.
    pub fn owner(&self) -> &'a OptionSpec {
        self.owner
    }

    /// Parsed value; `None` when absent or invalid.
    pub fn value(&self) -> Option<&OptionValue> {
        self.value.as_ref()
    }

    /// Argument-vector indices attributed to this option, ascending.
    pub fn consumed(&self) -> &[usize] {
        &self.consumed
    }

    /// Whether the option was found inside a run of combined short flags.
    pub fn is_combined(&self) -> bool {
        self.combined
    }

    pub fn status(&self) -> OutcomeStatus {
        match (&self.value, self.consumed.is_empty()) {
            (_, true) => OutcomeStatus::Absent,
            (None, false) => OutcomeStatus::Invalid,
            (Some(_), false) => OutcomeStatus::Valid,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.status() == OutcomeStatus::Absent
    }

    pub fn is_invalid(&self) -> bool {
        self.status() == OutcomeStatus::Invalid
    }

    /// The value the option effectively has: the parsed value, or the
    /// owner's default when absent. `None` when the option is invalid.
    pub fn resolved_value(&self) -> Option<&OptionValue> {
        match self.status() {
            OutcomeStatus::Absent => Some(self.owner.default_value()),
            OutcomeStatus::Invalid => None,
            OutcomeStatus::Valid => self.value.as_ref(),
        }
    }
}

/// Where the value text of a matched token comes from.
#[derive(Debug, Clone, Copy)]
enum ValueSource<'t> {
    /// Nothing follows the name inside the token.
    Bare,
    /// Text after a separator or directly after a short name.
    Inline(&'t str),
}

/// Token remainders after prefix stripping, per interpretation.
#[derive(Debug, Clone, Copy, Default)]
struct Classified<'t> {
    long: Option<&'t str>,
    short: Option<&'t str>,
}

impl<'t> Classified<'t> {
    /// Whether the token could be read both as a long and as a short option.
    fn is_ambiguous(&self) -> bool {
        self.long.is_some() && self.short.is_some()
    }
}

/// Strips the longest configured prefix from `token`.
///
/// The remainder is offered as a long candidate when the winning prefix is
/// the long or alternate prefix, and as a short candidate when it is the
/// short or alternate prefix. A token that is nothing but a prefix matches
/// neither.
fn classify<'t>(token: &'t str, config: &ParserConfig) -> Classified<'t> {
    let prefixes = [
        (config.long_prefix.as_str(), true, false),
        (config.short_prefix.as_str(), false, true),
        (config.alternate_prefix.as_str(), true, true),
    ];

    let Some(best) = prefixes
        .iter()
        .filter(|(prefix, _, _)| !prefix.is_empty() && token.starts_with(prefix))
        .map(|(prefix, _, _)| prefix.len())
        .max()
    else {
        return Classified::default();
    };

    let rest = &token[best..];
    if rest.is_empty() {
        return Classified::default();
    }

    let mut classified = Classified::default();
    for (prefix, long, short) in prefixes {
        if prefix.len() == best && token.starts_with(prefix) {
            if long {
                classified.long = Some(rest);
            }
            if short {
                classified.short = Some(rest);
            }
        }
    }
    classified
}

/// Returns `true` if `rest` spells a long option of `registry`, bare or with
/// an inline value.
fn names_registered_long(rest: &str, registry: &[OptionSpec], config: &ParserConfig) -> bool {
    let key = if config.separator.is_empty() {
        rest
    } else {
        rest.split_once(config.separator.as_str())
            .map_or(rest, |(key, _)| key)
    };
    registry
        .iter()
        .any(|spec| spec.matches_long(key, config.use_alternate_name))
}

/// Resolves every character of a combined short-flag run against the
/// registry.
///
/// Each character must be a single-byte ASCII alphanumeric owned by a
/// `Flag`-kind descriptor; the first such descriptor in registry order owns
/// it. Returns `None` if any character fails to resolve or the run is empty.
///
/// # Examples
///
/// ```
/// use optspec_core::{OptionSpec, resolve_combined_run};
///
/// let registry = vec![
///     OptionSpec::flag("all", Some('a'), false, false),
///     OptionSpec::flag("brief", Some('b'), false, false),
///     OptionSpec::integer("count", Some('c'), 1, false),
/// ];
///
/// let run = resolve_combined_run("ab", &registry).unwrap();
/// assert_eq!(run[&'a'].name(), "all");
/// assert_eq!(run[&'b'].name(), "brief");
///
/// // `c` belongs to an integer option, so the run does not combine.
/// assert!(resolve_combined_run("abc", &registry).is_none());
/// ```
pub fn resolve_combined_run<'r>(
    run: &str,
    registry: &'r [OptionSpec],
) -> Option<BTreeMap<char, &'r OptionSpec>> {
    let mut resolved = BTreeMap::new();
    for ch in run.chars() {
        if !ch.is_ascii_alphanumeric() {
            return None;
        }
        let owner = registry
            .iter()
            .find(|spec| spec.kind() == OptionKind::Flag && spec.short_name() == Some(ch))?;
        resolved.insert(ch, owner);
    }

    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

impl OptionSpec {
    /// Scans `argv` for this option.
    ///
    /// `argv[0]` is the program name and is never matched. Indices held
    /// exclusively in `claimed` are skipped; indices held by a combined flag
    /// run can only be matched as part of that run. The first qualifying
    /// index wins.
    ///
    /// `registry` is consulted, by value, to resolve combined flag runs and
    /// to keep tokens that name a long option from being read as short ones.
    ///
    /// The returned outcome is absent, invalid or valid; see
    /// [`OutcomeStatus`].
    pub fn parse_option<'a, S: AsRef<str>>(
        &'a self,
        argv: &[S],
        registry: &[OptionSpec],
        claimed: &ClaimedIndices,
        config: &ParserConfig,
    ) -> ParseOutcome<'a> {
        for (index, arg) in argv.iter().enumerate().skip(1) {
            let token = arg.as_ref();
            let found = match claimed.claim(index) {
                Some(Claim::Exclusive) => continue,
                Some(Claim::Combined) => self.match_combined(index, token, registry, config),
                None => self.match_token(index, token, argv, registry, claimed, config),
            };

            if let Some(outcome) = found {
                if outcome.is_invalid() {
                    debug!(
                        option = %self.name(),
                        index,
                        token,
                        "Option present but its value is invalid"
                    );
                } else {
                    debug!(
                        option = %self.name(),
                        consumed = ?outcome.consumed(),
                        value = ?outcome.value(),
                        "Matched option"
                    );
                }
                return outcome;
            }
        }

        trace!(option = %self.name(), "Option not present");
        ParseOutcome::absent(self)
    }

    /// Scans `argv` for this option using the current platform's
    /// conventions.
    ///
    /// Equivalent to [`parse_option`](Self::parse_option) with
    /// [`ParserConfig::platform`].
    pub fn parse_option_default<'a, S: AsRef<str>>(
        &'a self,
        argv: &[S],
        registry: &[OptionSpec],
        claimed: &ClaimedIndices,
    ) -> ParseOutcome<'a> {
        self.parse_option(argv, registry, claimed, &ParserConfig::platform())
    }

    fn match_token<'a, S: AsRef<str>>(
        &'a self,
        index: usize,
        token: &str,
        argv: &[S],
        registry: &[OptionSpec],
        claimed: &ClaimedIndices,
        config: &ParserConfig,
    ) -> Option<ParseOutcome<'a>> {
        let classified = classify(token, config);

        if let Some(rest) = classified.long {
            if self.matches_long(rest, config.use_alternate_name) {
                return Some(self.outcome_for(index, ValueSource::Bare, argv, claimed));
            }
            if !config.separator.is_empty() {
                if let Some((key, value)) = rest.split_once(config.separator.as_str()) {
                    if self.matches_long(key, config.use_alternate_name) {
                        return Some(self.outcome_for(
                            index,
                            ValueSource::Inline(value),
                            argv,
                            claimed,
                        ));
                    }
                }
            }
        }

        let rest = classified.short?;
        let short = self.short_name()?;
        if classified.is_ambiguous() && names_registered_long(rest, registry, config) {
            return None;
        }

        if let Some(after) = rest.strip_prefix(short) {
            if after.is_empty() {
                return Some(self.outcome_for(index, ValueSource::Bare, argv, claimed));
            }
            if config.allow_separator_for_short && !config.separator.is_empty() {
                if let Some(value) = after.strip_prefix(config.separator.as_str()) {
                    return Some(self.outcome_for(
                        index,
                        ValueSource::Inline(value),
                        argv,
                        claimed,
                    ));
                }
            }
            if !matches!(self.kind(), OptionKind::Flag | OptionKind::None) {
                return Some(self.outcome_for(index, ValueSource::Inline(after), argv, claimed));
            }
        }

        self.match_in_run(index, rest, registry, config)
    }

    /// Matches a token already claimed by a combined run.
    fn match_combined<'a>(
        &'a self,
        index: usize,
        token: &str,
        registry: &[OptionSpec],
        config: &ParserConfig,
    ) -> Option<ParseOutcome<'a>> {
        let classified = classify(token, config);
        let rest = classified.short?;
        if classified.is_ambiguous() && names_registered_long(rest, registry, config) {
            return None;
        }
        self.match_in_run(index, rest, registry, config)
    }

    fn match_in_run<'a>(
        &'a self,
        index: usize,
        run: &str,
        registry: &[OptionSpec],
        config: &ParserConfig,
    ) -> Option<ParseOutcome<'a>> {
        if !config.allow_combining || self.kind() != OptionKind::Flag {
            return None;
        }
        let short = self.short_name()?;
        if !run.contains(short) {
            return None;
        }

        let resolved = resolve_combined_run(run, registry)?;
        if !resolved.get(&short).is_some_and(|owner| *owner == self) {
            return None;
        }

        trace!(option = %self.name(), index, run, "Matched inside combined flag run");
        Some(ParseOutcome {
            owner: self,
            value: Some(self.toggled()),
            consumed: vec![index],
            combined: true,
        })
    }

    fn outcome_for<'a, S: AsRef<str>>(
        &'a self,
        index: usize,
        source: ValueSource<'_>,
        argv: &[S],
        claimed: &ClaimedIndices,
    ) -> ParseOutcome<'a> {
        let (value, consumed) = match (source, self.kind()) {
            (ValueSource::Bare, OptionKind::Flag) => (Some(self.toggled()), vec![index]),
            (ValueSource::Bare, OptionKind::None) => (Some(OptionValue::Unset), vec![index]),
            (ValueSource::Bare, kind) => {
                let next = index + 1;
                match argv.get(next) {
                    Some(arg) if !claimed.contains(next) => {
                        (OptionValue::coerce(kind, arg.as_ref()), vec![index, next])
                    }
                    _ => (None, vec![index]),
                }
            }
            (ValueSource::Inline(text), kind) => (OptionValue::coerce(kind, text), vec![index]),
        };

        ParseOutcome {
            owner: self,
            value,
            consumed,
            combined: false,
        }
    }

    /// Value of a flag given on the command line without a value.
    fn toggled(&self) -> OptionValue {
        OptionValue::Flag(!self.default_value().as_flag().unwrap_or(false))
    }
}
