use super::*;
use rbjs_tree::{Child, s};

fn function_body() -> Node {
    s!(Begin, s!(Lvasgn, "a", s!(Int, 1)))
}

#[test]
fn test_legacy_declares_once_with_var() {
    let mut scope = ScopeTracker::new(EsLevel::Es5);
    scope.enter_function(&function_body(), [], false);
    assert_eq!(scope.assign("a", true), Some("var"));
    assert_eq!(scope.assign("a", true), None);
    assert!(scope.exit_function().is_empty());
}

#[test]
fn test_parameters_are_bound() {
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&function_body(), ["x", "y"], false);
    assert!(scope.is_declared("x"));
    assert_eq!(scope.assign("y", true), None);
    assert_eq!(scope.assign("z", true), Some("let"));
}

#[test]
fn test_expression_assignment_goes_pending() {
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&function_body(), [], false);
    assert_eq!(scope.assign("b", false), None);
    assert_eq!(scope.entry("b").map(|entry| entry.state), Some(BindingState::Pending));
    // A later statement assignment must not declare it a second time.
    assert_eq!(scope.assign("b", true), None);
    assert_eq!(scope.exit_function(), vec![Arc::<str>::from("b")]);
}

#[test]
fn test_block_local_name_gets_let_and_is_dropped() {
    let inner = s!(Lvasgn, "y", s!(Int, 1));
    let root = s!(Begin, s!(If, s!(True), inner.clone(), Child::Nil));
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&root, [], false);
    scope.enter_block(&inner);
    assert_eq!(scope.assign("y", true), Some("let"));
    scope.exit_block();
    assert!(!scope.is_declared("y"));
    assert!(scope.exit_function().is_empty());
}

#[test]
fn test_name_used_after_block_is_hoisted_to_function() {
    let inner = s!(Lvasgn, "x", s!(Int, 1));
    let root = s!(Begin, s!(If, s!(True), inner.clone(), Child::Nil), s!(Lvar, "x"));
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&root, [], false);
    scope.enter_block(&inner);
    assert_eq!(scope.assign("x", true), None);
    scope.exit_block();
    assert_eq!(scope.pending_names(), vec![Arc::<str>::from("x")]);
    assert_eq!(scope.exit_function(), vec![Arc::<str>::from("x")]);
}

#[test]
fn test_legacy_blocks_share_the_function_table() {
    let inner = s!(Lvasgn, "x", s!(Int, 1));
    let root = s!(Begin, s!(If, s!(True), inner.clone(), Child::Nil), s!(Lvar, "x"));
    let mut scope = ScopeTracker::new(EsLevel::Es5);
    scope.enter_function(&root, [], false);
    scope.enter_block(&inner);
    assert_eq!(scope.assign("x", true), Some("var"));
    scope.exit_block();
    assert!(scope.is_declared("x"));
}

#[test]
fn test_closures_inherit_and_methods_do_not() {
    let body = function_body();
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&body, [], false);
    scope.assign("outer", true);

    scope.enter_function(&body, [], true);
    assert!(scope.is_declared("outer"));
    scope.exit_function();

    scope.enter_function(&body, [], false);
    assert!(!scope.is_declared("outer"));
    scope.exit_function();

    assert!(scope.is_declared("outer"));
}

#[test]
fn test_hoist_declares_once() {
    let mut scope = ScopeTracker::new(EsLevel::Es5);
    scope.enter_function(&function_body(), [], false);
    assert_eq!(scope.hoist("line"), Some("var"));
    assert_eq!(scope.hoist("line"), None);
    assert_eq!(scope.assign("line", true), None);
}

#[test]
fn test_partition_new_keeps_order() {
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&function_body(), ["b"], false);
    let (fresh, known) = scope.partition_new(&["a", "b", "c"]);
    assert_eq!(fresh, vec!["a", "c"]);
    assert_eq!(known, vec!["b"]);
}

#[test]
fn test_exit_function_unwinds_open_blocks() {
    let body = function_body();
    let mut scope = ScopeTracker::new(EsLevel::Es2015);
    scope.enter_function(&body, [], false);
    scope.assign("kept", true);
    scope.enter_function(&body, [], false);
    scope.enter_block(&body);
    scope.enter_block(&body);
    scope.exit_function();
    assert!(scope.is_declared("kept"));
    assert_eq!(scope.depth(), 1);
}
