// crates/dummy-gen/src/backend.rs
// ============================================================================
// Module: Backend Classifier
// Description: Parses availability guards into backend combination keys.
// Purpose: Map `if not is_x_available():` guards onto canonical keys.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A guard is a negated availability check or a negated conjunction of them:
//!
//! ```text
//! if not is_paddle_available():
//! if not (is_paddle_available() and is_paddlenlp_available()):
//! ```
//!
//! [`find_backend`] extracts the backend names in source order and joins
//! them with [`BACKEND_SEPARATOR`]. Lines that are not guards classify to
//! `None`; that is absence, not an error.

use std::fmt;

use serde::Serialize;

use crate::DummyGenError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between backend names in a canonical key.
pub const BACKEND_SEPARATOR: &str = "_and_";

/// Prefix of an availability check call.
const CHECK_PREFIX: &str = "is_";
/// Suffix of an availability check call.
const CHECK_SUFFIX: &str = "_available()";

// ============================================================================
// SECTION: Backend Key
// ============================================================================

/// Ordered combination of optional backends guarding a set of exports.
///
/// # Invariants
/// - At least one name is present.
/// - Names are lowercase identifiers (`[a-z][a-z0-9_]*`) and unique.
///
/// # Examples
/// ```
/// use dummy_gen::BackendKey;
///
/// let key = BackendKey::parse("paddle_and_paddlenlp")?;
/// assert_eq!(key.key(), "paddle_and_paddlenlp");
/// assert_eq!(key.python_list(), r#"["paddle", "paddlenlp"]"#);
/// # Ok::<(), dummy_gen::DummyGenError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BackendKey {
    /// Backend names in guard order.
    names: Vec<String>,
}

impl BackendKey {
    /// Builds a key from backend names in guard order.
    ///
    /// # Errors
    /// Returns [`DummyGenError::Scan`] when the list is empty, a name is not
    /// a lowercase identifier, or a name repeats.
    pub fn new<I, S>(names: I) -> Result<Self, DummyGenError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !is_backend_name(&name) {
                return Err(DummyGenError::Scan(format!("invalid backend name {name:?}")));
            }
            if collected.contains(&name) {
                return Err(DummyGenError::Scan(format!("backend {name:?} listed twice")));
            }
            collected.push(name);
        }
        if collected.is_empty() {
            return Err(DummyGenError::Scan("backend key must name a backend".to_string()));
        }
        Ok(Self {
            names: collected,
        })
    }

    /// Parses a canonical key such as `paddle_and_scipy`.
    ///
    /// # Errors
    /// Returns [`DummyGenError::Scan`] when a component is not a valid name.
    pub fn parse(key: &str) -> Result<Self, DummyGenError> {
        Self::new(key.split(BACKEND_SEPARATOR))
    }

    /// Returns the backend names in guard order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the canonical key, names joined with [`BACKEND_SEPARATOR`].
    #[must_use]
    pub fn key(&self) -> String {
        self.names.join(BACKEND_SEPARATOR)
    }

    /// Returns the Python list literal used in generated stubs.
    #[must_use]
    pub fn python_list(&self) -> String {
        let quoted: Vec<String> = self.names.iter().map(|name| format!("\"{name}\"")).collect();
        format!("[{}]", quoted.join(", "))
    }

    /// Returns this key extended with the names of a nested guard.
    ///
    /// Names already present keep their original position.
    #[must_use]
    pub fn combine(&self, inner: &Self) -> Self {
        let mut names = self.names.clone();
        for name in &inner.names {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Self {
            names,
        }
    }
}

impl fmt::Display for BackendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// ============================================================================
// SECTION: Guard Classification
// ============================================================================

/// Classifies a guard line into a backend key.
///
/// Leading indentation, a trailing comment, and a one-line body after the
/// colon are ignored. Returns `None` for anything that is not a negated
/// availability guard.
///
/// # Examples
/// ```
/// use dummy_gen::find_backend;
///
/// let key = find_backend("    if not (is_paddle_available() and is_scipy_available()):");
/// assert_eq!(key.map(|key| key.key()).as_deref(), Some("paddle_and_scipy"));
/// assert!(find_backend("from .utils import is_paddle_available").is_none());
/// ```
#[must_use]
pub fn find_backend(line: &str) -> Option<BackendKey> {
    let code = strip_comment(line).trim();
    let rest = strip_keyword(code, "if")?;
    let rest = strip_keyword(rest, "not")?;
    let condition = split_guard_condition(rest)?.trim();
    let condition = strip_enclosing_parens(condition);
    let mut names = Vec::new();
    let mut expect_operand = true;
    for token in condition.split_whitespace() {
        if expect_operand {
            names.push(parse_check(token)?);
        } else if token != "and" {
            return None;
        }
        expect_operand = !expect_operand;
    }
    if expect_operand {
        // Empty condition or a dangling `and`.
        return None;
    }
    BackendKey::new(names).ok()
}

/// Returns the condition before the first top-level `:`.
///
/// Text after the colon is a one-line guard body such as
/// `raise OptionalDependencyNotAvailable()` and is ignored.
fn split_guard_condition(rest: &str) -> Option<&str> {
    let mut depth: usize = 0;
    for (index, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ':' if depth == 0 => {
                let condition = &rest[.. index];
                return parens_balanced(condition).then_some(condition);
            }
            _ => {}
        }
    }
    None
}

/// Extracts the backend name from `is_<name>_available()`.
fn parse_check(token: &str) -> Option<&str> {
    let name = token.strip_prefix(CHECK_PREFIX)?.strip_suffix(CHECK_SUFFIX)?;
    is_backend_name(name).then_some(name)
}

/// Strips a leading keyword that must be followed by whitespace or `(`.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(ch) if ch.is_whitespace() => Some(rest.trim_start()),
        Some('(') => Some(rest),
        _ => None,
    }
}

/// Removes parentheses wrapping the whole expression, repeatedly.
fn strip_enclosing_parens(mut text: &str) -> &str {
    while let Some(inner) = text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        if !parens_balanced(inner) {
            break;
        }
        text = inner.trim();
    }
    text
}

/// Returns true when parentheses never close below depth zero and end at it.
fn parens_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Drops a `#` comment; guards never contain string literals.
fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

/// Returns true for lowercase identifiers starting with a letter.
pub(crate) fn is_backend_name(name: &str) -> bool {
    name.chars().next().is_some_and(|first| first.is_ascii_lowercase())
        && name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
