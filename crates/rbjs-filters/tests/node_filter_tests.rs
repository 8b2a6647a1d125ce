//! Node.js runtime mapping, end to end through the pipeline.

use rbjs_common::EsLevel;
use rbjs_emitter::{ConvertOptions, Pipeline};
use rbjs_filters::by_name;
use rbjs_tree::{Node, parse_sexp};

fn tree(source: &str) -> Node {
    parse_sexp(source).expect("valid tree")
}

fn pipeline(level: EsLevel) -> Pipeline {
    Pipeline::new(ConvertOptions::with_es_level(level)).with_filter(by_name("node").expect("registered"))
}

fn modern(source: &str) -> String {
    pipeline(EsLevel::Es2015).convert(&tree(source)).expect("conversion succeeds")
}

fn legacy(source: &str) -> String {
    pipeline(EsLevel::Es5).convert(&tree(source)).expect("conversion succeeds")
}

// =============================================================================
// Setup declarations
// =============================================================================

#[test]
fn test_file_read_requires_fs() {
    let source = r#"(send (const nil :File) :read (str "x"))"#;
    assert_eq!(modern(source), r#"const fs = require("fs"); fs.readFileSync("x", "utf8")"#);
    assert_eq!(legacy(source), r#"var fs = require("fs"); fs.readFileSync("x", "utf8")"#);
}

#[test]
fn test_fs_declared_once() {
    let source = r#"(begin
        (send (const nil :File) :write (str "x") (str "data"))
        (send (const nil :File) :exist? (str "x")))"#;
    assert_eq!(
        modern(source),
        r#"const fs = require("fs"); fs.writeFileSync("x", "data"); fs.existsSync("x")"#
    );
}

#[test]
fn test_declarations_follow_token_order() {
    let source = r#"(begin
        (send (const nil :File) :read (str "x"))
        (send nil :system (str "ls")))"#;
    assert_eq!(
        modern(source),
        concat!(
            r#"const child_process = require("child_process"); const fs = require("fs"); "#,
            r#"fs.readFileSync("x", "utf8"); child_process.execSync("ls", {stdio: "inherit"})"#
        )
    );
}

#[test]
fn test_argv_is_sliced_from_process() {
    assert_eq!(
        modern("(send nil :puts (const nil :ARGV))"),
        "let ARGV = process.argv.slice(2); puts(ARGV)"
    );
}

#[test]
fn test_no_setup_without_use() {
    assert_eq!(modern("(send nil :exit (int 1))"), "process.exit(1)");
    assert_eq!(modern("(send nil :puts (__FILE__))"), "puts(__filename)");
    assert_eq!(modern("(send nil :puts (send nil :__dir__))"), "puts(__dirname)");
}

// =============================================================================
// Processes
// =============================================================================

#[test]
fn test_system_with_arguments_uses_exec_file() {
    assert_eq!(
        modern(r#"(send nil :system (str "ls") (str "-l") (str "/tmp"))"#),
        concat!(
            r#"const child_process = require("child_process"); "#,
            r#"child_process.execFileSync("ls", ["-l", "/tmp"], {stdio: "inherit"})"#
        )
    );
}

#[test]
fn test_backticks_capture_output() {
    assert_eq!(
        modern(r#"(lvasgn :out (xstr (str "ls")))"#),
        r#"const child_process = require("child_process"); let out = child_process.execSync("ls", {encoding: "utf8"})"#
    );
}

#[test]
fn test_interpolated_backticks() {
    assert_eq!(
        modern(r#"(send nil :puts (xstr (str "ls ") (begin (lvar :dir))))"#),
        concat!(
            r#"const child_process = require("child_process"); "#,
            r#"puts(child_process.execSync(`ls ${dir}`, {encoding: "utf8"}))"#
        )
    );
}

#[test]
fn test_standard_streams_and_environment() {
    assert_eq!(modern("(send (gvar :$stdout) :write (str \"a\"))"), r#"process.stdout.write("a")"#);
    assert_eq!(modern("(send (const nil :STDERR) :write (str \"a\"))"), r#"process.stderr.write("a")"#);
    assert_eq!(modern(r#"(send (const nil :ENV) :[] (str "HOME"))"#), r#"process.env["HOME"]"#);
}

// =============================================================================
// Files and directories
// =============================================================================

#[test]
fn test_chmod_mode_is_octal() {
    let source = r#"(send (const nil :File) :chmod (int 493) (str "a") (str "b"))"#;
    assert_eq!(
        modern(source),
        r#"const fs = require("fs"); fs.chmodSync("a", 0o755); fs.chmodSync("b", 0o755)"#
    );
    assert_eq!(
        legacy(source),
        r#"var fs = require("fs"); fs.chmodSync("a", 0755); fs.chmodSync("b", 0755)"#
    );
}

#[test]
fn test_file_utils_expands_lists() {
    assert_eq!(
        modern(r#"(send (const nil :FileUtils) :mkdir (array (str "a") (str "b")))"#),
        r#"const fs = require("fs"); fs.mkdirSync("a"); fs.mkdirSync("b")"#
    );
    assert_eq!(
        modern(r#"(send (const nil :FileUtils) :touch (str "a"))"#),
        r#"const fs = require("fs"); fs.closeSync(fs.openSync("a", "w"))"#
    );
}

#[test]
fn test_working_directory_needs_no_fs() {
    assert_eq!(modern("(send nil :puts (send (const nil :Dir) :pwd))"), "puts(process.cwd())");
    assert_eq!(
        modern(r#"(send (const nil :FileUtils) :cd (str "/tmp"))"#),
        r#"process.chdir("/tmp")"#
    );
}

#[test]
fn test_mktmpdir_prefix() {
    assert_eq!(
        modern("(send (const nil :Dir) :mktmpdir)"),
        r#"const fs = require("fs"); fs.mkdtempSync("d")"#
    );
    assert_eq!(
        modern(r#"(send (const nil :Dir) :mktmpdir (array (str "pre") (str "suf")))"#),
        r#"const fs = require("fs"); fs.mkdtempSync("pre")"#
    );
}

#[test]
fn test_chdir_block_restores_directory() {
    assert_eq!(
        modern(r#"(block (send (const nil :Dir) :chdir (str "tmp")) (args) (send nil :work))"#),
        r#"$oldwd = process.cwd(); try {process.chdir("tmp"); work()} finally {process.chdir($oldwd)}"#
    );
}

#[test]
fn test_library_requires_vanish() {
    assert_eq!(
        modern(r#"(begin (send nil :require (str "fileutils")) (send (const nil :FileUtils) :pwd))"#),
        "process.cwd()"
    );
}

// =============================================================================
// Pass-through
// =============================================================================

#[test]
fn test_unmapped_io_calls_fall_through() {
    let input = tree(r#"(send (const nil :IO) :readlines (str "x"))"#);
    let normalized = pipeline(EsLevel::Es2015).normalize(&input).expect("normalizes");
    assert_eq!(normalized, input);
}

#[test]
fn test_normalization_is_idempotent() {
    let input = tree(
        r#"(begin
            (send (const nil :File) :read (str "x"))
            (send nil :system (str "ls"))
            (send nil :puts (const nil :ARGV))
            (xstr (str "pwd")))"#,
    );
    let pipeline = pipeline(EsLevel::Es2015);
    let once = pipeline.normalize(&input).expect("normalizes");
    let twice = pipeline.normalize(&once).expect("normalizes again");
    assert_eq!(once, twice);
}
