//! Shared reference-grammar engine.
//!
//! Every backend parses free-form reference strings through one of these
//! grammars: an ordered list of regex rules tried most-specific first. The
//! first rule that matches wins; a rule that matches lexically but fails
//! semantic extraction fails the whole parse rather than falling through to
//! a lower-precedence rule. Scheme prefixes (long and short aliases) are
//! stripped before matching, but every rule is also tried against the
//! unstripped input because URLs legitimately contain colons.

use std::fmt;

use regex::{Captures, Regex};
use thiserror::Error;

/// Error produced when a grammar rejects an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty reference")]
    Empty,

    #[error("unrecognized reference `{input}` (expected {expected})")]
    Unrecognized { input: String, expected: String },

    #[error("invalid reference `{input}`: {reason}")]
    Invalid { input: String, reason: String },
}

impl ParseError {
    /// The expected forms, when the input matched no rule at all.
    pub fn expected_forms(&self) -> Option<&str> {
        match self {
            ParseError::Unrecognized { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

/// Extraction function turning a lexical match into a canonical reference.
///
/// Returning `Err` is a semantic failure (e.g. numeric overflow) and aborts
/// the whole parse; the engine never retries a lower-precedence rule.
pub type Extract<R> = fn(&Captures<'_>) -> Result<R, String>;

/// One grammar rule: a pattern plus its extraction function.
pub struct Rule<R> {
    name: &'static str,
    pattern: Regex,
    extract: Extract<R>,
}

impl<R> Rule<R> {
    fn new(name: &'static str, pattern: &str, extract: Extract<R>) -> Self {
        Rule {
            name,
            pattern: Regex::new(pattern).unwrap(),
            extract,
        }
    }

    /// Rule name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// A per-backend reference grammar.
///
/// Rules are tried in the order they were added; add the most specific
/// forms (explicit-scope URLs) first and bare/implicit forms last.
pub struct Grammar<R> {
    schemes: &'static [&'static str],
    expected: &'static str,
    rules: Vec<Rule<R>>,
}

impl<R> Grammar<R> {
    /// Create a grammar for a backend claiming the given scheme aliases.
    ///
    /// `expected` is the human-readable list of accepted forms, used in
    /// unrecognized-input errors (e.g. `"#N, N, or group/project#N"`).
    pub fn new(schemes: &'static [&'static str], expected: &'static str) -> Self {
        Grammar {
            schemes,
            expected,
            rules: Vec::new(),
        }
    }

    /// Append a rule. Order of calls is precedence order.
    pub fn rule(mut self, name: &'static str, pattern: &str, extract: Extract<R>) -> Self {
        self.rules.push(Rule::new(name, pattern, extract));
        self
    }

    /// The scheme aliases this grammar strips before matching.
    pub fn schemes(&self) -> &'static [&'static str] {
        self.schemes
    }

    /// Check whether the input carries one of this grammar's scheme prefixes.
    pub fn matches_scheme(&self, input: &str) -> bool {
        self.schemes
            .iter()
            .any(|s| input.len() > s.len() && input.starts_with(s) && input.as_bytes()[s.len()] == b':')
    }

    /// Parse an input string into a canonical reference.
    ///
    /// The scheme prefix, if present, is stripped from the raw input before
    /// trimming, so a reference with stray whitespace ahead of its scheme is
    /// unrecognized rather than silently accepted.
    pub fn parse(&self, input: &str) -> Result<R, ParseError> {
        let stripped = self.strip_scheme(input).trim();
        let raw = input.trim();

        if stripped.is_empty() {
            return Err(ParseError::Empty);
        }

        for rule in &self.rules {
            for candidate in [stripped, raw] {
                if let Some(caps) = rule.pattern.captures(candidate) {
                    return (rule.extract)(&caps).map_err(|reason| ParseError::Invalid {
                        input: input.to_string(),
                        reason,
                    });
                }
                if stripped == raw {
                    break;
                }
            }
        }

        Err(ParseError::Unrecognized {
            input: input.to_string(),
            expected: self.expected.to_string(),
        })
    }

    fn strip_scheme<'a>(&self, input: &'a str) -> &'a str {
        for scheme in self.schemes {
            if let Some(rest) = input
                .strip_prefix(scheme)
                .and_then(|rest| rest.strip_prefix(':'))
            {
                return rest;
            }
        }
        input
    }
}

impl<R> fmt::Debug for Grammar<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("schemes", &self.schemes)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Parse a numeric capture as a non-negative 64-bit id.
///
/// Overflow and negative values are semantic failures, never silently
/// truncated.
pub fn numeric_id(raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(format!("id `{}` is not a valid 64-bit number", raw)),
    }
}
