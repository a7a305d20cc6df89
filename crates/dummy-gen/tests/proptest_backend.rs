// crates/dummy-gen/tests/proptest_backend.rs
// ============================================================================
// Module: Backend Guard Property-Based Tests
// Description: Property tests for guard classification and export scanning.
// Purpose: Detect panics and key ordering regressions across wide inputs.
// ============================================================================

//! Property-based tests for backend guard invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use dummy_gen::BACKEND_SEPARATOR;
use dummy_gen::BackendKey;
use dummy_gen::find_backend;
use dummy_gen::scan_init;
use proptest::prelude::*;

fn backend_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,8}", 1 ..= max)
        .prop_map(|names| names.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

fn guard_line(names: &[String], indent: usize) -> String {
    let checks: Vec<String> = names.iter().map(|name| format!("is_{name}_available()")).collect();
    format!("{}if not ({}):", " ".repeat(indent), checks.join(" and "))
}

proptest! {
    #[test]
    fn guards_join_names_in_order(names in backend_names(5), indent in 0usize .. 12) {
        let key = find_backend(&guard_line(&names, indent)).expect("guard classifies");
        prop_assert_eq!(key.names(), names.as_slice());
        prop_assert_eq!(key.key(), names.join(BACKEND_SEPARATOR));
    }

    #[test]
    fn single_guards_need_no_parens(names in backend_names(1)) {
        let line = format!("if not is_{}_available():", names[0]);
        let key = find_backend(&line).expect("guard classifies");
        prop_assert_eq!(key.key(), names[0].clone());
    }

    #[test]
    fn combine_keeps_outer_order(outer in backend_names(4), inner in backend_names(4)) {
        let outer_key = BackendKey::new(outer.clone()).unwrap();
        let inner_key = BackendKey::new(inner.clone()).unwrap();
        let combined = outer_key.combine(&inner_key);
        prop_assert_eq!(&combined.names()[.. outer.len()], outer.as_slice());
        for name in &inner {
            prop_assert_eq!(combined.names().iter().filter(|candidate| *candidate == name).count(), 1);
        }
        prop_assert!(BackendKey::parse(&combined.key()).is_ok());
    }

    #[test]
    fn find_backend_never_panics(line in ".*") {
        let _ = find_backend(&line);
    }

    #[test]
    fn scan_init_never_panics(source in "[a-z_ ():\\[\\]\"'#\\\\\n,.=]{0,200}") {
        let _ = scan_init(&source);
    }
}
