// crates/dummy-gen/src/render.rs
// ============================================================================
// Module: Dummy Renderer
// Description: Renders placeholder Python source for backend-gated symbols.
// Purpose: Produce byte-exact dummy modules for drift comparison.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Each exported symbol is rendered by kind, decided from its name the way
//! Python's `str.isupper`/`str.islower` would:
//!
//! - `UPPER_CASE` names become `NAME = None` constants;
//! - `lower_case` names become functions calling `requires_backends`;
//! - anything else becomes a `DummyObject` class whose constructor and
//!   factory methods call `requires_backends`.
//!
//! Formatting is a hard contract: every object starts with a newline and
//! ends with one, and a module joins its objects with one extra newline.

use std::collections::BTreeMap;

use crate::scanner::BackendGroup;
use crate::scanner::BackendObjects;

// ============================================================================
// SECTION: Templates
// ============================================================================

/// First line of every generated dummy module.
pub const DUMMY_FILE_HEADER: &str =
    "# This file is autogenerated by the command `make fix-copies`, do not edit.\n";

/// Import line of every generated dummy module.
pub const DUMMY_FILE_IMPORTS: &str = "from ..utils import DummyObject, requires_backends\n";

/// Class-level factory methods stubbed on every dummy class.
pub const FACTORY_METHODS: [&str; 2] = ["from_config", "from_pretrained"];

// ============================================================================
// SECTION: Symbol Kinds
// ============================================================================

/// Kind of placeholder rendered for an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Module-level constant, rendered as `None`.
    Constant,
    /// Function stub.
    Function,
    /// Class stub with factory methods.
    Class,
}

impl SymbolKind {
    /// Classifies a symbol by the case of its cased characters.
    ///
    /// A name needs at least one cased character to be a constant or a
    /// function; names without any (such as `_`) render as classes.
    ///
    /// # Examples
    /// ```
    /// use dummy_gen::SymbolKind;
    ///
    /// assert_eq!(SymbolKind::classify("CONSTANT_2"), SymbolKind::Constant);
    /// assert_eq!(SymbolKind::classify("function"), SymbolKind::Function);
    /// assert_eq!(SymbolKind::classify("FakeClass"), SymbolKind::Class);
    /// ```
    #[must_use]
    pub fn classify(name: &str) -> Self {
        let has_upper = name.chars().any(char::is_uppercase);
        let has_lower = name.chars().any(char::is_lowercase);
        match (has_upper, has_lower) {
            (true, false) => Self::Constant,
            (false, true) => Self::Function,
            _ => Self::Class,
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one placeholder object.
///
/// `backends` is inserted verbatim, so callers choose between a list
/// literal (`["paddle"]`) and any other Python expression.
///
/// # Examples
/// ```
/// use dummy_gen::create_dummy_object;
///
/// assert_eq!(create_dummy_object("CONSTANT", "'paddle'"), "\nCONSTANT = None\n");
/// ```
#[must_use]
pub fn create_dummy_object(name: &str, backends: &str) -> String {
    let mut out = String::new();
    match SymbolKind::classify(name) {
        SymbolKind::Constant => {
            out.push('\n');
            out.push_str(name);
            out.push_str(" = None\n");
        }
        SymbolKind::Function => {
            out.push_str("\ndef ");
            out.push_str(name);
            out.push_str("(*args, **kwargs):\n");
            push_requires(&mut out, "    ", name, backends);
        }
        SymbolKind::Class => {
            out.push_str("\nclass ");
            out.push_str(name);
            out.push_str("(metaclass=DummyObject):\n");
            out.push_str("    _backends = ");
            out.push_str(backends);
            out.push_str("\n\n");
            out.push_str("    def __init__(self, *args, **kwargs):\n");
            push_requires(&mut out, "        ", "self", backends);
            for method in FACTORY_METHODS {
                out.push_str("\n    @classmethod\n");
                out.push_str("    def ");
                out.push_str(method);
                out.push_str("(cls, *args, **kwargs):\n");
                push_requires(&mut out, "        ", "cls", backends);
            }
        }
    }
    out
}

/// Renders the dummy module for one backend group.
#[must_use]
pub fn create_dummy_file(group: &BackendGroup) -> String {
    let backends = group.backend().python_list();
    let objects: Vec<String> =
        group.symbols().iter().map(|name| create_dummy_object(name, &backends)).collect();
    let mut out = String::new();
    out.push_str(DUMMY_FILE_HEADER);
    out.push_str(DUMMY_FILE_IMPORTS);
    out.push('\n');
    out.push_str(&objects.join("\n"));
    out
}

/// Renders one dummy module per backend group, keyed by canonical key.
#[must_use]
pub fn create_dummy_files(objects: &BackendObjects) -> BTreeMap<String, String> {
    objects.iter().map(|(key, group)| (key.to_string(), create_dummy_file(group))).collect()
}

/// Appends a `requires_backends(target, backends)` statement.
fn push_requires(out: &mut String, indent: &str, target: &str, backends: &str) {
    out.push_str(indent);
    out.push_str("requires_backends(");
    out.push_str(target);
    out.push_str(", ");
    out.push_str(backends);
    out.push_str(")\n");
}
