use super::*;

#[test]
fn test_equality_ignores_location() {
    let plain = s!(Lvar, "a");
    let located = s!(Lvar, "a").with_location(Some(SourceLocation::new(4, 2)));
    assert_eq!(plain, located);
    assert_ne!(plain, s!(Lvar, "b"));
    assert_ne!(plain, s!(Ivar, "a"));
}

#[test]
fn test_float_children_compare_by_bits() {
    let nan = s!(Float, f64::NAN);
    assert_eq!(nan, nan.clone());
    assert_eq!(s!(Array, nan.clone()), s!(Array, s!(Float, f64::NAN)));
    assert_ne!(s!(Float, 0.0), s!(Float, -0.0));
    assert_ne!(Child::Float(1.0), Child::Int(1));
}

#[test]
fn test_builder_child_conversions() {
    let node = s!(Send, Child::Nil, "puts", s!(Str, Child::str("hi")), 3, 1.5);
    assert!(node.is_nil_at(0));
    assert_eq!(node.sym_at(1), Some("puts"));
    assert_eq!(node.node_at(2).and_then(|n| n.str_at(0)), Some("hi"));
    assert_eq!(node.int_at(3), Some(3));
    assert_eq!(node.child(4), Some(&Child::Float(1.5)));
    assert!(node.is_nil_at(99));
}

#[test]
fn test_updated_keeps_location() {
    let loc = Some(SourceLocation::new(1, 0));
    let node = s!(Lvasgn, "a", s!(Int, 1)).with_location(loc);
    let rewritten = node.updated(NodeKind::Ivasgn, vec![Child::sym("@a"), Child::from(s!(Int, 1))]);
    assert_eq!(rewritten.location(), loc);
    assert_eq!(rewritten.kind(), &NodeKind::Ivasgn);
}

#[test]
fn test_is_method_follows_parens_marker() {
    let synthesized = s!(Send, s!(Lvar, "a"), "length");
    assert!(synthesized.is_method());

    let bare = synthesized.clone().with_location(Some(SourceLocation::new(1, 0)));
    assert!(!bare.is_method());

    let parens = synthesized.with_location(Some(SourceLocation::new(1, 0).with_parens()));
    assert!(parens.is_method());

    assert!(!s!(Attr, s!(Lvar, "a"), "b").is_method());
    assert!(s!(Call, s!(Lvar, "a"), "b").is_method());
}

#[test]
fn test_unknown_kind_is_custom() {
    let kind = NodeKind::from_name("vue_component");
    assert!(kind.is_custom());
    assert_eq!(kind.as_str(), "vue_component");
    for builtin in NodeKind::BUILTIN {
        assert_eq!(&NodeKind::from_name(builtin.as_str()), builtin);
    }
}

#[test]
fn test_count_where_prunes() {
    let tree = s!(
        Begin,
        s!(Lvasgn, "x", s!(Int, 1)),
        s!(Def, "f", s!(Args), s!(Lvar, "x")),
        s!(Lvar, "x")
    );
    let is_x = |n: &Node| n.sym_at(0) == Some("x");
    let prune_defs = |n: &Node| n.kind().opens_scope();
    assert_eq!(tree.count_where(&is_x, &prune_defs), 2);
    assert_eq!(tree.count_where(&is_x, &|_: &Node| false), 3);
}

#[test]
fn test_display_sexp() {
    let node = s!(Send, Child::Nil, "puts", s!(Str, Child::str("a \"b\"\n")))
        .with_location(Some(SourceLocation::new(2, 4).with_parens()));
    assert_eq!(node.to_string(), r#"(send@2:4() nil :puts (str "a \"b\"\n"))"#);
    assert_eq!(s!(Sym, "odd name").to_string(), r#"(sym :"odd name")"#);
    assert_eq!(s!(Float, 2.0).to_string(), "(float 2.0)");
}

#[test]
fn test_parse_sexp_reads_all_child_forms() {
    let node = parse_sexp(
        r#"
        # comment
        (send@3:1 (lvar :a) :[]= (int -2) (float 1e3) (str "é\t") :"x y" nil)
        "#,
    )
    .unwrap();
    assert_eq!(node.location(), Some(SourceLocation::new(3, 1)));
    assert_eq!(node.sym_at(1), Some("[]="));
    assert_eq!(node.node_at(2).and_then(|n| n.int_at(0)), Some(-2));
    assert_eq!(node.node_at(3).and_then(|n| n.child(0)), Some(&Child::Float(1000.0)));
    assert_eq!(node.node_at(4).and_then(|n| n.str_at(0)), Some("é\t"));
    assert_eq!(node.sym_at(5), Some("x y"));
    assert!(node.is_nil_at(6));
}

#[test]
fn test_parse_sexp_errors() {
    assert_eq!(parse_sexp("(send"), Err(TreeError::UnexpectedEof));
    assert_eq!(parse_sexp("(int 1) (int 2)"), Err(TreeError::TrailingInput { offset: 8 }));
    assert!(matches!(parse_sexp("(int 1x)"), Err(TreeError::InvalidNumber { .. })));
    assert!(matches!(parse_sexp(r#"(str "\q")"#), Err(TreeError::InvalidEscape { .. })));
    assert!(matches!(parse_sexp("(send@x nil)"), Err(TreeError::InvalidLocation { .. })));
    assert!(matches!(parse_sexp("()"), Err(TreeError::UnexpectedChar { found: ')', .. })));
}

#[test]
fn test_json_array_and_object_forms() {
    let node = json::from_json_str(r#"["send", null, ":puts", ["str", "hi"]]"#).unwrap();
    assert_eq!(node, s!(Send, Child::Nil, "puts", s!(Str, Child::str("hi"))));

    let located = json::from_json_str(
        r#"{"type": "send", "children": [["lvar", ":a"], ":size"], "loc": {"line": 1, "column": 0, "parens": true}}"#,
    )
    .unwrap();
    assert!(located.is_method());
    assert_eq!(located.node_at(0), Some(&s!(Lvar, "a")));
}

#[test]
fn test_json_colon_strings_escape() {
    let node = s!(Str, Child::str(":not a symbol"));
    let value = json::to_value(&node);
    assert_eq!(value, serde_json::json!(["str", {"str": ":not a symbol"}]));
    assert_eq!(json::from_value(&value).unwrap(), node);
}

#[test]
fn test_json_errors_carry_path() {
    let err = json::from_json_str(r#"["send", null, ":puts", [true]]"#).unwrap_err();
    assert_eq!(
        err,
        TreeError::Json {
            path: "$[3][0]".to_string(),
            message: "node type must be a string".to_string(),
        }
    );
    assert!(json::from_json_str("[]").is_err());
    assert!(json::from_json_str(r#"["int", true]"#).is_err());
}
