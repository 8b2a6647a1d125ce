use super::args::CliArgs;
use super::config::{CONFIG_FILE, ProjectConfig, build_pipeline, find_config, load, load_config, parse_config, resolve};
use clap::Parser;
use rbjs_common::EsLevel;
use rbjs_emitter::Comparison;
use std::path::Path;

fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("failed to write test file");
}

fn args(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("rbjs").chain(argv.iter().copied())).expect("parses")
}

#[test]
fn parses_filters_and_options() {
    let config = parse_config(
        r#"{"filters": ["node"], "options": {"esLevel": 2017, "comparison": "identity", "regexpSlashLimit": 1}}"#,
    )
    .expect("should parse");
    assert_eq!(config.filters, vec!["node".to_string()]);
    assert_eq!(config.options.es_level, EsLevel::Es2017);
    assert_eq!(config.options.comparison, Comparison::Identity);
    assert_eq!(config.options.regexp_slash_limit, 1);
}

#[test]
fn missing_fields_default() {
    let config = parse_config("{}").expect("should parse");
    assert_eq!(config, ProjectConfig::default());
}

#[test]
fn rejects_unknown_keys() {
    assert!(parse_config(r#"{"filter": ["node"]}"#).is_err());
}

#[test]
fn keeps_filter_options_opaque() {
    let config = parse_config(r#"{"options": {"filterOptions": {"underscore": {"exclude": ["size"]}}}}"#)
        .expect("should parse");
    let underscore = config.options.filter_option("underscore").expect("present");
    assert_eq!(underscore["exclude"][0], "size");
}

#[test]
fn discovers_config_in_working_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert_eq!(find_config(None, dir.path()), None);
    write_file(dir.path(), CONFIG_FILE, "{}");
    assert_eq!(find_config(None, dir.path()), Some(dir.path().join(CONFIG_FILE)));
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.json");
    assert!(load_config(&missing).is_err());
    let err = load(&args(&["--config", "missing.json"]), dir.path()).expect_err("missing config");
    assert!(format!("{err:#}").contains("failed to read config"));
}

#[test]
fn flags_override_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(
        dir.path(),
        CONFIG_FILE,
        r#"{"filters": ["node"], "options": {"esLevel": "es5", "comparison": "identity"}}"#,
    );
    let config = load(&args(&["--target", "es2020", "-f", "underscore"]), dir.path()).expect("loads");
    assert_eq!(config.options.es_level, EsLevel::Es2020);
    assert_eq!(config.options.comparison, Comparison::Identity);
    assert_eq!(config.filters, vec!["underscore".to_string()]);
}

#[test]
fn resolve_without_flags_keeps_config() {
    let config = parse_config(r#"{"filters": ["node"], "options": {"esLevel": "es2015"}}"#).expect("parses");
    assert_eq!(resolve(&args(&[]), config.clone()), config);
}

#[test]
fn unknown_filter_is_an_error() {
    let config = ProjectConfig {
        filters: vec!["jquery".to_string()],
        ..ProjectConfig::default()
    };
    let err = build_pipeline(&config).expect_err("unknown filter");
    assert!(err.to_string().contains("unknown filter 'jquery'"));
}

#[test]
fn pipeline_keeps_filter_order() {
    let config = ProjectConfig {
        filters: vec!["underscore".to_string(), "node".to_string()],
        ..ProjectConfig::default()
    };
    let pipeline = build_pipeline(&config).expect("builds");
    let names: Vec<&str> = pipeline.filters().iter().map(|filter| filter.name()).collect();
    assert_eq!(names, ["underscore", "node"]);
}
