// crates/dummy-gen/src/tests.rs
// ============================================================================
// Module: Dummy Generator Unit Tests
// Description: Unit tests for line folding and scanner edge cases.
// Purpose: Pin down statement folding and guard frame handling.
// Dependencies: dummy-gen
// ============================================================================

//! ## Overview
//! Exercises the crate-private logical line folding and the scanner's
//! handling of nested, wrapped, and malformed guard blocks.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions use panic-based helpers for clarity."
)]

use crate::BackendKey;
use crate::DummyGenError;
use crate::find_backend;
use crate::scan_init;
use crate::scanner::logical_lines;

// ============================================================================
// SECTION: Logical Lines
// ============================================================================

#[test]
fn logical_lines_fold_parenthesised_imports() {
    let lines = logical_lines("from .models import (\n    A,\n    B,  # comment\n)\nx = 1\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "from .models import ( A, B, )");
    assert_eq!(lines[0].number, 1);
    assert_eq!(lines[1].text, "x = 1");
    assert_eq!(lines[1].number, 5);
}

#[test]
fn logical_lines_keep_hash_inside_strings() {
    let lines = logical_lines("names = [\"a#b\"]  # trailing\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "names = [\"a#b\"]");
}

#[test]
fn logical_lines_fold_triple_quoted_strings() {
    let source = "\"\"\"Module docs (with an open paren\nspanning lines.\n\"\"\"\nfrom .a import B\n";
    let lines = logical_lines(source);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].text, "from .a import B");
    assert_eq!(lines[1].number, 4);
}

#[test]
fn logical_lines_join_backslash_continuations() {
    let lines = logical_lines("from .a import B, \\\n    C\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "from .a import B, C");
}

#[test]
fn logical_lines_measure_indentation() {
    let lines = logical_lines("else:\n    from .a import B\n\tfrom .c import D\n");
    let indents: Vec<usize> = lines.iter().map(|line| line.indent).collect();
    assert_eq!(indents, vec![0, 4, 8]);
}

// ============================================================================
// SECTION: Guard Classification
// ============================================================================

#[test]
fn find_backend_rejects_non_guards() {
    for line in [
        "from .utils import is_paddle_available",
        "if is_paddle_available():",
        "if not is_paddle_available()",
        "if not (is_paddle_available() or is_scipy_available()):",
        "if not (is_paddle_available() and):",
        "if not is__available():",
        "if not is_paddle_available() and is_paddle_available():",
        "ifnot is_paddle_available():",
        "",
    ] {
        assert!(find_backend(line).is_none(), "{line:?} should not classify");
    }
}

#[test]
fn find_backend_accepts_spacing_variants() {
    let key = find_backend("if not(is_paddle_available()):  # noqa").expect("guard");
    assert_eq!(key.key(), "paddle");
    let key = find_backend("if not ( is_paddle_available()  and  is_k_diffusion_available() ):")
        .expect("guard");
    assert_eq!(key.key(), "paddle_and_k_diffusion");
}

#[test]
fn backend_key_combine_keeps_order_and_drops_repeats() {
    let outer = BackendKey::parse("paddle_and_paddlenlp").unwrap();
    let inner = BackendKey::parse("paddle_and_scipy").unwrap();
    assert_eq!(outer.combine(&inner).key(), "paddle_and_paddlenlp_and_scipy");
}

#[test]
fn backend_key_rejects_invalid_names() {
    assert!(BackendKey::parse("").is_err());
    assert!(BackendKey::parse("Paddle").is_err());
    assert!(BackendKey::parse("paddle_and_paddle").is_err());
}

// ============================================================================
// SECTION: Scanner
// ============================================================================

#[test]
fn scan_combines_nested_guards() {
    let source = "\
try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    from .utils.dummy_paddle_objects import *
else:
    from .models import UNet2DModel
    try:
        if not is_scipy_available():
            raise OptionalDependencyNotAvailable()
    except OptionalDependencyNotAvailable:
        from .utils.dummy_paddle_and_scipy_objects import *
    else:
        from .schedulers import LMSDiscreteScheduler
    from .schedulers import DDIMScheduler
";
    let objects = scan_init(source).unwrap();
    assert_eq!(
        objects.symbols("paddle").unwrap(),
        &["UNet2DModel".to_string(), "DDIMScheduler".to_string()]
    );
    assert_eq!(objects.symbols("paddle_and_scipy").unwrap(), &["LMSDiscreteScheduler".to_string()]);
}

#[test]
fn scan_handles_plain_if_else_guards() {
    let source = "\
if not is_onnx_available():
    from .utils.dummy_onnx_objects import *
else:
    from .onnx_utils import OnnxRuntimeModel
";
    let objects = scan_init(source).unwrap();
    assert_eq!(objects.symbols("onnx").unwrap(), &["OnnxRuntimeModel".to_string()]);
}

#[test]
fn scan_merges_repeated_guard_blocks() {
    let source = "\
try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    pass
else:
    from .models import A, B as C

try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    pass
else:
    from .models import A
    from .pipelines import D
";
    let objects = scan_init(source).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(
        objects.symbols("paddle").unwrap(),
        &["A".to_string(), "C".to_string(), "D".to_string()]
    );
}

#[test]
fn scan_reads_lazy_export_tables() {
    let source = "\
try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    _import_structure[\"utils.dummy_paddle_objects\"] = [\"ignored\"]
else:
    _import_structure[\"models\"].extend(
        [
            \"AutoencoderKL\",
            \"UNet2DModel\",
        ]
    )
    _import_structure[\"optimization\"] = [\"get_scheduler\"]
    _import_structure[\"pipelines\"].append(\"DDIMPipeline\")
";
    let objects = scan_init(source).unwrap();
    assert_eq!(
        objects.symbols("paddle").unwrap(),
        &[
            "AutoencoderKL".to_string(),
            "UNet2DModel".to_string(),
            "get_scheduler".to_string(),
            "DDIMPipeline".to_string(),
        ]
    );
}

#[test]
fn scan_ignores_unguarded_and_abandoned_blocks() {
    let source = "\
from .models import Unguarded
if not is_paddle_available():
    raise ImportError(\"paddle required\")
from .pipelines import AfterGuard
";
    let objects = scan_init(source).unwrap();
    assert!(objects.is_empty());
}

#[test]
fn scan_rejects_symbol_in_two_groups() {
    let source = "\
try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    pass
else:
    from .schedulers import LMSDiscreteScheduler

try:
    if not (is_paddle_available() and is_scipy_available()):
        raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    pass
else:
    from .schedulers import LMSDiscreteScheduler
";
    match scan_init(source) {
        Err(DummyGenError::Scan(message)) => {
            assert!(message.contains("line 15"), "unexpected message {message}");
            assert!(message.contains("paddle and paddle_and_scipy"), "unexpected message {message}");
        }
        other => panic!("expected scan error, got {other:?}"),
    }
}

#[test]
fn find_backend_accepts_one_line_guard_bodies() {
    let key = find_backend("    if not is_paddle_available(): raise OptionalDependencyNotAvailable()")
        .expect("guard");
    assert_eq!(key.key(), "paddle");
    let key = find_backend(
        "if not (is_paddle_available() and is_scipy_available()): raise ImportError(\"a:b\")",
    )
    .expect("guard");
    assert_eq!(key.key(), "paddle_and_scipy");
    assert!(find_backend("if not is_paddle_available() raise OptionalDependencyNotAvailable()").is_none());
}

#[test]
fn scan_collects_after_one_line_guard() {
    let source = "\
try:
    if not is_paddle_available(): raise OptionalDependencyNotAvailable()
except OptionalDependencyNotAvailable:
    from .utils.dummy_paddle_objects import *
else:
    from .models import UNet2DModel
";
    let objects = scan_init(source).unwrap();
    assert_eq!(objects.symbols("paddle").unwrap(), &["UNet2DModel".to_string()]);
}

#[test]
fn scan_skips_else_of_guard_inside_try() {
    let source = "\
try:
    if not is_paddle_available():
        raise OptionalDependencyNotAvailable()
    else:
        pass
except OptionalDependencyNotAvailable:
    from .utils.dummy_paddle_objects import *
else:
    from .models import A
";
    let objects = scan_init(source).unwrap();
    assert_eq!(objects.symbols("paddle").unwrap(), &["A".to_string()]);
}
