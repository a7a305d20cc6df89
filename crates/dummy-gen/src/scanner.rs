// crates/dummy-gen/src/scanner.rs
// ============================================================================
// Module: Export Scanner
// Description: Maps exported symbols to the backend guard enclosing them.
// Purpose: Build the backend -> symbols table from an export file's text.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The scanner walks an export file (`__init__.py`) line by line. Physical
//! lines are folded into logical lines while brackets or triple-quoted
//! strings are open, so wrapped guards and parenthesised imports are read as
//! one statement. An indentation-driven frame stack then tracks guards:
//!
//! ```text
//! try:
//!     if not is_paddle_available():        <- guard opens a frame
//!         raise OptionalDependencyNotAvailable()
//! except OptionalDependencyNotAvailable:
//!     from .utils.dummy_paddle_objects import *
//! else:                                    <- frame starts collecting
//!     from .models import UNet2DModel     <- exported under `paddle`
//! ```
//!
//! A guard nested inside a collecting body combines its names with the
//! enclosing key. The same key may be guarded by several blocks; their
//! symbols merge in source order.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::DummyGenError;
use crate::backend::BackendKey;
use crate::backend::find_backend;

// ============================================================================
// SECTION: Backend Objects
// ============================================================================

/// Symbols exported under one backend combination.
///
/// # Invariants
/// - `symbols` is non-empty, duplicate-free, and in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendGroup {
    /// Backend combination guarding the symbols.
    backend: BackendKey,
    /// Exported symbol names in source order.
    symbols: Vec<String>,
}

impl BackendGroup {
    /// Returns the backend combination.
    #[must_use]
    pub const fn backend(&self) -> &BackendKey {
        &self.backend
    }

    /// Returns the exported symbol names in source order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Mapping from canonical backend key to the symbols it guards.
///
/// # Invariants
/// - No symbol belongs to two groups.
/// - Groups are never empty.
///
/// # Examples
/// ```
/// use dummy_gen::BackendKey;
/// use dummy_gen::BackendObjects;
///
/// let mut objects = BackendObjects::new();
/// objects.insert_group(BackendKey::parse("paddle")?, ["CONSTANT", "function", "FakeClass"])?;
/// assert_eq!(objects.symbols("paddle").map(<[String]>::len), Some(3));
/// # Ok::<(), dummy_gen::DummyGenError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendObjects {
    /// Groups keyed by canonical backend key.
    groups: BTreeMap<String, BackendGroup>,
    /// Owning canonical key per symbol.
    owners: BTreeMap<String, String>,
}

impl BackendObjects {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol under a backend combination.
    ///
    /// Re-adding a symbol to its own group is a no-op.
    ///
    /// # Errors
    /// Returns [`DummyGenError::Scan`] when the symbol already belongs to a
    /// different backend combination.
    pub fn insert(&mut self, backend: &BackendKey, symbol: &str) -> Result<(), DummyGenError> {
        let key = backend.key();
        if let Some(owner) = self.owners.get(symbol) {
            if *owner == key {
                return Ok(());
            }
            return Err(DummyGenError::Scan(format!(
                "symbol {symbol} is exported under both {owner} and {key}"
            )));
        }
        self.owners.insert(symbol.to_string(), key.clone());
        self.groups
            .entry(key)
            .or_insert_with(|| BackendGroup {
                backend: backend.clone(),
                symbols: Vec::new(),
            })
            .symbols
            .push(symbol.to_string());
        Ok(())
    }

    /// Adds every symbol under a backend combination, in order.
    ///
    /// # Errors
    /// Returns [`DummyGenError::Scan`] on a cross-group duplicate.
    pub fn insert_group<I, S>(&mut self, backend: BackendKey, symbols: I) -> Result<(), DummyGenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for symbol in symbols {
            self.insert(&backend, symbol.as_ref())?;
        }
        Ok(())
    }

    /// Returns the symbols for a canonical key.
    #[must_use]
    pub fn symbols(&self, key: &str) -> Option<&[String]> {
        self.groups.get(key).map(BackendGroup::symbols)
    }

    /// Returns true when the canonical key has a group.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Returns the canonical key owning a symbol.
    #[must_use]
    pub fn owner_of(&self, symbol: &str) -> Option<&str> {
        self.owners.get(symbol).map(String::as_str)
    }

    /// Iterates groups in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BackendGroup)> {
        self.groups.iter().map(|(key, group)| (key.as_str(), group))
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true when no group exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the mapping as a JSON object of key to symbol list.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self
            .groups
            .iter()
            .map(|(key, group)| {
                let symbols = group.symbols.iter().cloned().map(Value::String).collect();
                (key.clone(), Value::Array(symbols))
            })
            .collect();
        Value::Object(map)
    }
}

// ============================================================================
// SECTION: Scanning
// ============================================================================

/// Scans export file text into backend groups.
///
/// # Errors
/// Returns [`DummyGenError::Scan`] when a symbol is exported under two
/// different backend combinations.
///
/// # Examples
/// ```
/// use dummy_gen::scan_init;
///
/// let source = "\
/// try:
///     if not is_paddle_available():
///         raise OptionalDependencyNotAvailable()
/// except OptionalDependencyNotAvailable:
///     from .utils.dummy_paddle_objects import *
/// else:
///     from .models import UNet2DModel, VQModel
/// ";
/// let objects = scan_init(source)?;
/// assert_eq!(objects.symbols("paddle"), Some(&["UNet2DModel".to_string(), "VQModel".to_string()][..]));
/// # Ok::<(), dummy_gen::DummyGenError>(())
/// ```
pub fn scan_init(source: &str) -> Result<BackendObjects, DummyGenError> {
    let mut objects = BackendObjects::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut open_try: Option<usize> = None;
    for line in logical_lines(source) {
        let enclosing_try = open_try.take();
        if line.text == "try:" {
            open_try = Some(line.indent);
        }
        if settle_frames(&mut frames, &line) {
            continue;
        }
        let enclosing = match frames.last() {
            Some(Frame::AwaitingElse {
                ..
            }) => continue,
            Some(Frame::Collecting {
                backend, ..
            }) => Some(backend.clone()),
            None => None,
        };
        if let Some(guard) = find_backend(&line.text) {
            let backend = enclosing.map_or_else(|| guard.clone(), |outer| outer.combine(&guard));
            frames.push(Frame::AwaitingElse {
                guard_indent: line.indent,
                try_indent: enclosing_try.filter(|indent| *indent < line.indent),
                handler_indent: None,
                backend,
            });
        } else if let Some(backend) = enclosing {
            for name in exported_names(&line.text) {
                objects.insert(&backend, &name).map_err(|err| match err {
                    DummyGenError::Scan(message) => {
                        DummyGenError::Scan(format!("line {}: {message}", line.number))
                    }
                    other => other,
                })?;
            }
        }
    }
    Ok(objects)
}

/// Guard tracking state.
#[derive(Debug)]
enum Frame {
    /// Guard seen; skipping the guarded body and its handlers until `else:`.
    AwaitingElse {
        /// Indentation of the guard line.
        guard_indent: usize,
        /// Indentation of the `try:` whose body opens with the guard.
        try_indent: Option<usize>,
        /// Indentation of the last `except`/`finally` clause, if any.
        handler_indent: Option<usize>,
        /// Backend combination of the guard.
        backend: BackendKey,
    },
    /// Inside the `else:` body; statements export symbols.
    Collecting {
        /// Indentation of the `else:` line.
        else_indent: usize,
        /// Backend combination of the guard.
        backend: BackendKey,
    },
}

/// Frame transition chosen for a line.
enum Settle {
    /// The guard's `else:` was reached.
    Promote,
    /// An `except`/`finally` clause of the guarded block.
    EnterHandler,
    /// A statement inside the guarded body or a handler.
    Skip,
    /// The line dedents out of the top frame.
    Pop,
}

/// Pops or advances frames for a new logical line.
///
/// Returns true when the line was consumed as guard structure.
fn settle_frames(frames: &mut Vec<Frame>, line: &LogicalLine) -> bool {
    loop {
        let action = match frames.last() {
            Some(Frame::AwaitingElse {
                guard_indent,
                try_indent,
                handler_indent,
                ..
            }) => {
                // Inside a `try`, only the `else:` of the `try` itself collects.
                let else_limit = try_indent.unwrap_or(*guard_indent);
                if line.text == "else:" && line.indent <= else_limit {
                    Settle::Promote
                } else if line.indent < *guard_indent && is_handler_clause(&line.text) {
                    Settle::EnterHandler
                } else if handler_indent.is_some_and(|handler| line.indent > handler)
                    || line.indent > *guard_indent
                    || (handler_indent.is_none()
                        && try_indent.is_some_and(|indent| line.indent > indent))
                {
                    Settle::Skip
                } else {
                    Settle::Pop
                }
            }
            Some(Frame::Collecting {
                else_indent, ..
            }) if line.indent <= *else_indent => Settle::Pop,
            _ => return false,
        };
        match action {
            Settle::Promote => {
                if let Some(Frame::AwaitingElse {
                    backend, ..
                }) = frames.pop()
                {
                    frames.push(Frame::Collecting {
                        else_indent: line.indent,
                        backend,
                    });
                }
                return true;
            }
            Settle::EnterHandler => {
                if let Some(Frame::AwaitingElse {
                    handler_indent, ..
                }) = frames.last_mut()
                {
                    *handler_indent = Some(line.indent);
                }
                return true;
            }
            Settle::Skip => return true,
            Settle::Pop => {
                frames.pop();
            }
        }
    }
}

/// Returns true for `except ...:` and `finally:` clauses.
fn is_handler_clause(text: &str) -> bool {
    text == "finally:"
        || text.strip_prefix("except").is_some_and(|rest| {
            rest.starts_with(|ch: char| ch.is_whitespace() || ch == ':' || ch == '(')
        })
}

// ============================================================================
// SECTION: Export Extraction
// ============================================================================

/// Returns the symbol names a statement exports.
fn exported_names(text: &str) -> Vec<String> {
    if let Some(rest) = text.strip_prefix("from ") {
        return import_names(rest);
    }
    lazy_export_names(text)
}

/// Parses the names bound by `from module import ...`.
fn import_names(rest: &str) -> Vec<String> {
    let Some((_, names)) = rest.split_once(" import ") else {
        return Vec::new();
    };
    let names = names.trim();
    let names = names
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(names);
    names
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            let bound = item.rsplit_once(" as ").map_or(item, |(_, alias)| alias.trim());
            is_identifier(bound).then(|| bound.to_string())
        })
        .collect()
}

/// Parses quoted names from lazy export tables such as
/// `_import_structure["models"].extend(["UNet2DModel"])`.
fn lazy_export_names(text: &str) -> Vec<String> {
    let payload = if let Some((_, rest)) = text.split_once(".extend(") {
        rest
    } else if let Some((_, rest)) = text.split_once(".append(") {
        rest
    } else if let Some((target, rest)) = text.split_once('=') {
        let target = target.trim();
        let rest = rest.trim_start();
        if target.contains(['(', ' ']) || !rest.starts_with('[') {
            return Vec::new();
        }
        rest
    } else {
        return Vec::new();
    };
    quoted_strings(payload).into_iter().filter(|name| is_identifier(name)).collect()
}

/// Collects the contents of single- or double-quoted string literals.
fn quoted_strings(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '"' && ch != '\'' {
            continue;
        }
        let mut value = String::new();
        let mut escaped = false;
        for inner in chars.by_ref() {
            if escaped {
                value.push(inner);
                escaped = false;
            } else if inner == '\\' {
                escaped = true;
            } else if inner == ch {
                break;
            } else {
                value.push(inner);
            }
        }
        out.push(value);
    }
    out
}

/// Returns true for Python identifiers (ASCII subset).
fn is_identifier(name: &str) -> bool {
    name.chars().next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

// ============================================================================
// SECTION: Logical Lines
// ============================================================================

/// One statement folded from one or more physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    /// One-based number of the first physical line.
    pub(crate) number: usize,
    /// Indentation width of the first physical line.
    pub(crate) indent: usize,
    /// Code with comments removed and continuation lines joined by spaces.
    pub(crate) text: String,
}

/// Lexer state carried across physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Plain code.
    Code,
    /// Inside a string literal.
    String {
        /// Opening quote character.
        quote: char,
        /// True for triple-quoted strings.
        triple: bool,
    },
}

/// Folds physical lines into logical lines.
///
/// Blank and comment-only lines are dropped. A line continues while a
/// bracket or triple-quoted string is open, or when it ends with `\`.
pub(crate) fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    let mut state = LexState::Code;
    let mut depth: usize = 0;
    for (index, raw) in source.lines().enumerate() {
        let continuing = pending.is_some();
        let (code, explicit_join) = lex_line(raw, &mut state, &mut depth);
        let code = code.trim();
        if !continuing && code.is_empty() && state == LexState::Code {
            continue;
        }
        let current = pending.get_or_insert_with(|| LogicalLine {
            number: index + 1,
            indent: indent_width(raw),
            text: String::new(),
        });
        if !code.is_empty() {
            if !current.text.is_empty() {
                current.text.push(' ');
            }
            current.text.push_str(code);
        }
        if depth == 0
            && state == LexState::Code
            && !explicit_join
            && let Some(done) = pending.take()
            && !done.text.is_empty()
        {
            out.push(done);
        }
    }
    if let Some(done) = pending.take()
        && !done.text.is_empty()
    {
        out.push(done);
    }
    out
}

/// Lexes one physical line, returning its code without comments and whether
/// it ends with an explicit `\` continuation.
fn lex_line(raw: &str, state: &mut LexState, depth: &mut usize) -> (String, bool) {
    let chars: Vec<char> = raw.chars().collect();
    let mut code = String::with_capacity(raw.len());
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        match *state {
            LexState::Code => match ch {
                '#' => break,
                '"' | '\'' => {
                    let triple = chars.get(index + 1) == Some(&ch) && chars.get(index + 2) == Some(&ch);
                    *state = LexState::String {
                        quote: ch,
                        triple,
                    };
                    if triple {
                        code.push(ch);
                        code.push(ch);
                        index += 2;
                    }
                    code.push(ch);
                }
                '(' | '[' | '{' => {
                    *depth += 1;
                    code.push(ch);
                }
                ')' | ']' | '}' => {
                    *depth = depth.saturating_sub(1);
                    code.push(ch);
                }
                _ => code.push(ch),
            },
            LexState::String {
                quote,
                triple,
            } => {
                if ch == '\\' {
                    code.push(ch);
                    if let Some(next) = chars.get(index + 1) {
                        code.push(*next);
                        index += 1;
                    }
                } else if ch == quote
                    && (!triple
                        || (chars.get(index + 1) == Some(&quote)
                            && chars.get(index + 2) == Some(&quote)))
                {
                    if triple {
                        code.push(ch);
                        code.push(ch);
                        index += 2;
                    }
                    code.push(ch);
                    *state = LexState::Code;
                } else {
                    code.push(ch);
                }
            }
        }
        index += 1;
    }
    // Single-quoted strings cannot span lines.
    if let LexState::String {
        triple: false, ..
    } = *state
    {
        *state = LexState::Code;
    }
    let trimmed = code.trim_end();
    let explicit_join = *state == LexState::Code && trimmed.ends_with('\\');
    let code = if explicit_join {
        trimmed.trim_end_matches('\\').to_string()
    } else {
        code
    };
    (code, explicit_join)
}

/// Returns the indentation width, expanding tabs to multiples of eight.
fn indent_width(raw: &str) -> usize {
    let mut width = 0;
    for ch in raw.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}
