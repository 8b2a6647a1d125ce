//! Expressions, statements and functions emitted from s-expression trees.

use rbjs_common::EsLevel;
use rbjs_emitter::{Comparison, ConvertError, ConvertOptions, convert};
use rbjs_tree::parse_sexp;

fn convert_at(level: EsLevel, source: &str) -> String {
    let tree = parse_sexp(source).expect("valid tree");
    convert(&tree, &ConvertOptions::with_es_level(level)).expect("conversion succeeds")
}

fn modern(source: &str) -> String {
    convert_at(EsLevel::Es2015, source)
}

fn legacy(source: &str) -> String {
    convert_at(EsLevel::Es5, source)
}

fn convert_err(level: EsLevel, source: &str) -> ConvertError {
    let tree = parse_sexp(source).expect("valid tree");
    convert(&tree, &ConvertOptions::with_es_level(level)).expect_err("conversion fails")
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_scalar_literals() {
    assert_eq!(
        modern(r#"(begin (int 1) (float 2.5) (str "a\"b") (sym :c) (nil) (true) (self))"#),
        r#"1; 2.5; "a\"b"; "c"; null; true; this"#
    );
}

#[test]
fn test_octal_prefix_depends_on_level() {
    assert_eq!(modern(r#"(octal "755")"#), "0o755");
    assert_eq!(legacy(r#"(octal "755")"#), "0755");
}

#[test]
fn test_interpolation() {
    let source = r#"(dstr (str "a") (begin (lvar :b)) (str "c"))"#;
    assert_eq!(modern(source), "`a${b}c`");
    assert_eq!(legacy(source), r#""a" + b + "c""#);
    assert_eq!(legacy(r#"(dstr (begin (lvar :b)) (str "c"))"#), r#""" + b + "c""#);
}

#[test]
fn test_array_splat() {
    assert_eq!(modern("(array (int 1) (splat (lvar :a)))"), "[1, ...a]");
    assert_eq!(legacy("(array (int 1) (splat (lvar :a)))"), "[1].concat(a)");
    assert_eq!(legacy("(array (splat (lvar :a)) (int 2))"), "[].concat(a, [2])");
}

#[test]
fn test_hash_is_wrapped_in_statement_position() {
    assert_eq!(
        modern(r#"(hash (pair (sym :a) (int 1)) (pair (str "b c") (int 2)))"#),
        r#"({a: 1, "b c": 2})"#
    );
    assert_eq!(modern("(lvasgn :h (hash (pair (sym :a) (int 1))))"), "let h = {a: 1}");
}

// =============================================================================
// Variables
// =============================================================================

#[test]
fn test_local_declared_once() {
    let source = "(begin (lvasgn :a (int 1)) (lvasgn :a (int 2)) (lvar :a))";
    assert_eq!(modern(source), "let a = 1; a = 2; a");
    assert_eq!(legacy(source), "var a = 1; a = 2; a");
}

#[test]
fn test_expression_assignment_declared_at_function_top() {
    assert_eq!(modern(r#"(send nil :puts (lvasgn :x (int 1)))"#), "let x; puts(x = 1)");
}

#[test]
fn test_branch_assignment_used_later_declared_once() {
    let source = "(begin (if (lvar :c) (lvasgn :x (int 1)) (lvasgn :x (int 2))) (send nil :puts (lvar :x)))";
    assert_eq!(modern(source), "let x; if (c) {x = 1} else {x = 2}; puts(x)");
    assert_eq!(legacy(source), "if (c) {var x = 1} else {x = 2}; puts(x)");
}

#[test]
fn test_instance_variables() {
    assert_eq!(modern("(ivasgn :@count (int 0))"), "this._count = 0");
    assert_eq!(modern("(ivar :@count)"), "this._count");
}

#[test]
fn test_compound_assignment() {
    assert_eq!(
        modern("(begin (lvasgn :n (int 1)) (op_asgn (lvasgn :n) :+ (int 2)))"),
        "let n = 1; n += 2"
    );
    assert_eq!(modern("(op_asgn (ivasgn :@n) :** (int 2))"), "this._n = Math.pow(this._n, 2)");
    assert_eq!(convert_at(EsLevel::Es2016, "(op_asgn (ivasgn :@n) :** (int 2))"), "this._n **= 2");
}

#[test]
fn test_or_assignment() {
    let source = "(or_asgn (lvasgn :cache) (hash))";
    assert_eq!(legacy(source), "var cache = cache || {}");
    assert_eq!(modern(source), "let cache; cache = cache || {}");
    assert_eq!(convert_at(EsLevel::Es2021, source), "let cache; cache ||= {}");
    assert_eq!(convert_at(EsLevel::Es2021, "(or_asgn (ivasgn :@x) (int 1))"), "this._x ||= 1");
    assert_eq!(modern("(and_asgn (ivasgn :@x) (int 1))"), "this._x = this._x && 1");
}

#[test]
fn test_global_constant() {
    assert_eq!(modern("(const (cbase) :Foo)"), r#"Function("return this")().Foo"#);
    assert_eq!(modern("(const (const nil :A) :B)"), "A.B");
}

// =============================================================================
// Multiple assignment
// =============================================================================

#[test]
fn test_destructuring_declares_fresh_names() {
    assert_eq!(
        modern("(masgn (mlhs (lvasgn :a) (lvasgn :b)) (array (int 1) (int 2)))"),
        "let [a, b] = [1, 2]"
    );
    assert_eq!(
        modern("(begin (lvasgn :a (int 0)) (masgn (mlhs (lvasgn :a) (lvasgn :b)) (lvar :pair)))"),
        "let a = 0; let b; [a, b] = pair"
    );
}

#[test]
fn test_legacy_multiple_assignment_is_sequential() {
    assert_eq!(
        legacy("(masgn (mlhs (lvasgn :a) (lvasgn :b)) (array (int 1) (int 2)))"),
        "var a = 1; var b = 2"
    );
    assert_eq!(
        legacy("(masgn (mlhs (lvasgn :a) (lvasgn :b)) (lvar :pair))"),
        "var a = pair[0]; var b = pair[1]"
    );
}

#[test]
fn test_legacy_swap_is_not_temp_safe() {
    let source = "(begin (lvasgn :a (int 1)) (lvasgn :b (int 2)) \
                  (masgn (mlhs (lvasgn :a) (lvasgn :b)) (array (lvar :b) (lvar :a))))";
    assert_eq!(legacy(source), "var a = 1; var b = 2; a = b; b = a");
}

#[test]
fn test_legacy_unmatched_arity_is_rejected() {
    let err = convert_err(
        EsLevel::Es5,
        "(masgn (mlhs (lvasgn :a) (lvasgn :b)) (array (int 1) (int 2) (int 3)))",
    );
    assert!(matches!(err, ConvertError::Unsupported { .. }));
    assert!(err.to_string().contains("unmatched assignment"));
}

// =============================================================================
// Calls and operators
// =============================================================================

#[test]
fn test_calls_and_property_reads() {
    assert_eq!(modern(r#"(send nil :puts (str "hi"))"#), r#"puts("hi")"#);
    assert_eq!(modern("(send@1:0 (lvar :a) :length)"), "a.length");
    assert_eq!(modern("(send@1:0() (lvar :a) :length)"), "a.length()");
    assert_eq!(modern("(send (const nil :Foo) :new (int 1))"), "new Foo(1)");
}

#[test]
fn test_index_and_setter() {
    assert_eq!(modern("(send (lvar :a) :[] (int 0))"), "a[0]");
    assert_eq!(modern("(send (lvar :a) :[]= (int 0) (int 1))"), "a[0] = 1");
    assert_eq!(modern("(send (lvar :a) :b= (int 1))"), "a.b = 1");
}

#[test]
fn test_operator_precedence() {
    assert_eq!(modern("(send (send (int 1) :+ (int 2)) :* (int 3))"), "(1 + 2) * 3");
    assert_eq!(modern("(send (int 1) :- (send (int 2) :- (int 3)))"), "1 - (2 - 3)");
    assert_eq!(modern("(or (and (lvar :a) (lvar :b)) (lvar :c))"), "a && b || c");
    assert_eq!(modern("(and (or (lvar :a) (lvar :b)) (lvar :c))"), "(a || b) && c");
    assert_eq!(modern("(send (lvar :a) :!)"), "!a");
}

#[test]
fn test_exponent_follows_level() {
    assert_eq!(modern("(send (lvar :a) :** (int 2))"), "Math.pow(a, 2)");
    assert_eq!(convert_at(EsLevel::Es2016, "(send (lvar :a) :** (int 2))"), "a ** 2");
}

#[test]
fn test_comparison_option() {
    let tree = parse_sexp("(send (lvar :a) :== (int 1))").expect("valid tree");
    let mut options = ConvertOptions::with_es_level(EsLevel::Es2015);
    assert_eq!(convert(&tree, &options).expect("converts"), "a == 1");
    options.comparison = Comparison::Identity;
    assert_eq!(convert(&tree, &options).expect("converts"), "a === 1");
}

#[test]
fn test_safe_navigation() {
    assert_eq!(convert_at(EsLevel::Es2020, "(csend (lvar :a) :b)"), "a?.b()");
    assert_eq!(convert_at(EsLevel::Es2020, "(csend@1:0 (lvar :a) :b)"), "a?.b");
    assert_eq!(modern("(csend@1:0 (lvar :a) :b)"), "a && a.b");
}

#[test]
fn test_raise_becomes_throw() {
    assert_eq!(
        modern(r#"(send nil :raise (const nil :ArgumentError) (str "bad"))"#),
        r#"throw new ArgumentError("bad")"#
    );
}

#[test]
fn test_async_requires_es2017() {
    let source = "(send nil :async (def :f (args) (send nil :await (send nil :g))))";
    assert_eq!(convert_at(EsLevel::Es2017, source), "async function f() {return await g()}");
    assert!(matches!(convert_err(EsLevel::Es2015, source), ConvertError::Unsupported { .. }));
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn test_if_statement_and_ternary() {
    assert_eq!(
        modern("(if (lvar :a) (send nil :f) (send nil :g))"),
        "if (a) {f()} else {g()}"
    );
    assert_eq!(modern("(lvasgn :x (if (lvar :a) (int 1) (int 2)))"), "let x = a ? 1 : 2");
    assert_eq!(modern("(if (lvar :a) nil (send nil :g))"), "if (!a) {g()}");
    assert_eq!(
        modern("(if (lvar :a) (int 1) (if (lvar :b) (int 2) (int 3)))"),
        "if (a) {1} else if (b) {2} else {3}"
    );
}

#[test]
fn test_while_and_until() {
    assert_eq!(modern("(until (lvar :done) (send nil :step))"), "while (!done) {step()}");
    assert_eq!(modern("(while (true) (next))"), "while (true) {continue}");
    assert_eq!(
        modern("(while_post (lvar :a) (kwbegin (send nil :f)))"),
        "do {f()} while (a)"
    );
}

#[test]
fn test_for_over_range() {
    let source = "(for (lvasgn :i) (irange (int 1) (int 3)) (send nil :puts (lvar :i)))";
    assert_eq!(modern(source), "for (let i = 1; i <= 3; i++) {puts(i)}");
    assert_eq!(legacy(source), "for (var i = 1; i <= 3; i++) {puts(i)}");
    assert_eq!(
        modern("(for (lvasgn :i) (erange (int 0) (lvar :n)) (send nil :puts (lvar :i)))"),
        "for (let i = 0; i < n; i++) {puts(i)}"
    );
}

#[test]
fn test_for_over_collection() {
    let source = "(for (lvasgn :x) (lvar :list) (send nil :puts (lvar :x)))";
    assert_eq!(modern(source), "for (let x of list) {puts(x)}");
    assert!(matches!(convert_err(EsLevel::Es5, source), ConvertError::Unsupported { .. }));
}

#[test]
fn test_rescue_with_single_handler() {
    assert_eq!(
        modern("(kwbegin (rescue (send nil :risky) (resbody nil (lvasgn :e) (send nil :puts (lvar :e))) nil))"),
        "try {risky()} catch (e) {puts(e)}"
    );
}

#[test]
fn test_rescue_with_exception_classes() {
    assert_eq!(
        modern(
            "(kwbegin (rescue (send nil :risky) \
             (resbody (array (const nil :ArgumentError)) (lvasgn :e) (send nil :puts (lvar :e))) nil))"
        ),
        "try {risky()} catch ($EXCEPTION) {if ($EXCEPTION instanceof ArgumentError) \
         {let e = $EXCEPTION; puts(e)} else {throw $EXCEPTION}}"
    );
}

#[test]
fn test_ensure_becomes_finally() {
    assert_eq!(
        modern("(kwbegin (ensure (send nil :work) (send nil :cleanup)))"),
        "try {work()} finally {cleanup()}"
    );
}

#[test]
fn test_unsupported_constructs_fail() {
    let err = convert_err(EsLevel::Es2015, r#"(xstr (str "ls"))"#);
    assert!(matches!(err, ConvertError::Unsupported { .. }));
    let err = convert_err(EsLevel::Es2015, r#"(vue_template (str "<div/>"))"#);
    assert!(err.to_string().contains("unknown node type 'vue_template'"));
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_method_definition_returns_last_value() {
    assert_eq!(
        modern("(def :add (args (arg :a) (arg :b)) (send (lvar :a) :+ (lvar :b)))"),
        "function add(a, b) {return a + b}"
    );
    assert_eq!(
        modern("(def :f (args) (begin (lvasgn :x (int 1)) (lvar :x)))"),
        "function f() {let x = 1; return x}"
    );
    assert_eq!(modern("(def :f (args) (lvasgn :x (int 1)))"), "function f() {let x = 1; return x}");
}

#[test]
fn test_default_parameters() {
    let source = "(def :f (args (optarg :y (int 1))) (lvar :y))";
    assert_eq!(modern(source), "function f(y = 1) {return y}");
    assert_eq!(
        legacy(source),
        r#"function f(y) {if (typeof y === "undefined") y = 1; return y}"#
    );
}

#[test]
fn test_rest_parameters() {
    let source = "(def :f (args (arg :a) (restarg :r)) (lvar :r))";
    assert_eq!(modern(source), "function f(a, ...r) {return r}");
    assert_eq!(
        legacy(source),
        "function f(a) {var r = Array.prototype.slice.call(arguments, 1); return r}"
    );
}

#[test]
fn test_lambdas() {
    let double = "(block (send nil :lambda) (args (arg :x)) (send (lvar :x) :* (int 2)))";
    assert_eq!(modern(&format!("(lvasgn :double {double})")), "let double = x => x * 2");
    assert_eq!(legacy(&format!("(lvasgn :double {double})")), "var double = function(x) {return x * 2}");
    assert_eq!(
        modern("(block (send nil :lambda) (args (arg :a) (arg :b)) (send (lvar :a) :+ (lvar :b)))"),
        "(a, b) => a + b"
    );
    assert_eq!(
        modern("(block (send nil :proc) (args) (hash (pair (sym :a) (int 1))))"),
        "() => ({a: 1})"
    );
    assert_eq!(
        modern(
            "(block (send nil :lambda) (args (arg :x)) \
             (begin (lvasgn :y (send (lvar :x) :+ (int 1))) (lvar :y)))"
        ),
        "x => {let y = x + 1; return y}"
    );
}

#[test]
fn test_block_becomes_last_argument() {
    assert_eq!(
        modern("(block (send (lvar :list) :each) (args (arg :item)) (send nil :puts (lvar :item)))"),
        "list.each(item => puts(item))"
    );
    assert_eq!(
        modern("(send (lvar :list) :map (block_pass (sym :name)))"),
        "list.map(item => item.name())"
    );
}
