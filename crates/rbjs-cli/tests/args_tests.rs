use super::args::{CliArgs, ComparisonMode, DiagnosticFormat, InputFormat, Target};
use clap::Parser;
use rbjs_common::EsLevel;
use std::path::PathBuf;

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["rbjs"]).expect("parses");
    assert!(args.input.is_none());
    assert!(args.filters.is_empty());
    assert_eq!(args.diagnostics, DiagnosticFormat::Pretty);
    assert!(!args.print_tree);
}

#[test]
fn parses_conversion_flags() {
    let args = CliArgs::try_parse_from([
        "rbjs",
        "prog.sexp",
        "--target",
        "ES2017",
        "--comparison",
        "identity",
        "--filter",
        "node,underscore",
        "--regexp-slash-limit",
        "5",
        "--format",
        "sexp",
    ])
    .expect("parses");
    assert_eq!(args.input, Some(PathBuf::from("prog.sexp")));
    assert_eq!(args.target, Some(Target::Es2017));
    assert_eq!(args.comparison, Some(ComparisonMode::Identity));
    assert_eq!(args.filters, vec!["node".to_string(), "underscore".to_string()]);
    assert_eq!(args.regexp_slash_limit, Some(5));
    assert_eq!(args.format, Some(InputFormat::Sexp));
}

#[test]
fn target_aliases() {
    let args = CliArgs::try_parse_from(["rbjs", "-t", "es6"]).expect("parses");
    assert_eq!(args.target.map(Target::to_es_level), Some(EsLevel::Es2015));
    let args = CliArgs::try_parse_from(["rbjs", "-t", "legacy"]).expect("parses");
    assert_eq!(args.target.map(Target::to_es_level), Some(EsLevel::Es5));
}

#[test]
fn rejects_unknown_target() {
    assert!(CliArgs::try_parse_from(["rbjs", "--target", "es1999"]).is_err());
}

#[test]
fn repeated_filter_flags_accumulate() {
    let args = CliArgs::try_parse_from(["rbjs", "-f", "node", "-f", "underscore"]).expect("parses");
    assert_eq!(args.filters, vec!["node".to_string(), "underscore".to_string()]);
}
