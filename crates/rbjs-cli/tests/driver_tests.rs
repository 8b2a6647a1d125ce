use super::args::{CliArgs, InputFormat};
use super::driver::{convert_tree, detect_format, read_tree, run};
use clap::Parser;
use rbjs_common::{DiagnosticCategory, EsLevel};
use rbjs_emitter::{ConvertOptions, Pipeline};
use std::path::Path;

#[test]
fn detects_format_from_flag_extension_and_content() {
    assert_eq!(detect_format(Some(InputFormat::Json), None, "(nil)"), InputFormat::Json);
    assert_eq!(detect_format(None, Some(Path::new("a.json")), "(nil)"), InputFormat::Json);
    assert_eq!(detect_format(None, Some(Path::new("a.sexp")), "[]"), InputFormat::Sexp);
    assert_eq!(detect_format(None, None, "  [\"nil\"]"), InputFormat::Json);
    assert_eq!(detect_format(None, None, "(nil)"), InputFormat::Sexp);
}

#[test]
fn reads_both_formats_to_the_same_tree() {
    let sexp = read_tree(r#"(send nil :puts (str "hi"))"#, InputFormat::Sexp).expect("sexp");
    let json = read_tree(r#"["send", null, ":puts", ["str", "hi"]]"#, InputFormat::Json).expect("json");
    assert_eq!(sexp, json);
}

#[test]
fn malformed_tree_is_an_error() {
    let err = read_tree("(send nil", InputFormat::Sexp).expect_err("unbalanced");
    assert!(err.to_string().contains("failed to read syntax tree"));
}

#[test]
fn conversion_error_becomes_diagnostic() {
    let pipeline = Pipeline::new(ConvertOptions::default());
    let tree = read_tree(r#"(xstr@2:0 (str "ls"))"#, InputFormat::Sexp).expect("tree");
    let result = convert_tree(&pipeline, &tree, false);
    assert!(!result.succeeded());
    assert!(result.output.is_none());
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.category, DiagnosticCategory::UnsupportedConstruct);
    assert_eq!(diagnostic.location.map(|location| location.line), Some(2));
}

#[test]
fn print_tree_shows_normalized_form() {
    let pipeline = Pipeline::new(ConvertOptions::with_es_level(EsLevel::Es2015))
        .with_filter(rbjs_filters::by_name("node").expect("registered"));
    let tree = read_tree("(send nil :exit)", InputFormat::Sexp).expect("tree");
    let result = convert_tree(&pipeline, &tree, true);
    assert_eq!(result.output.as_deref(), Some("(send (attr nil :process) :exit)"));
}

#[test]
fn run_reads_input_and_writes_output_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("prog.sexp"), r#"(send nil :puts (str "hi"))"#).expect("write input");
    let args = CliArgs::try_parse_from(["rbjs", "prog.sexp", "-o", "prog.js", "-t", "es2015"]).expect("parses");
    let result = run(&args, dir.path()).expect("runs");
    assert!(result.succeeded());
    assert!(result.output.is_none());
    let written = std::fs::read_to_string(dir.path().join("prog.js")).expect("output written");
    assert_eq!(written, r#"puts("hi")"#);
}

#[test]
fn run_reports_missing_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let args = CliArgs::try_parse_from(["rbjs", "nope.sexp"]).expect("parses");
    let err = run(&args, dir.path()).expect_err("missing input");
    assert!(err.to_string().contains("failed to read input"));
}
