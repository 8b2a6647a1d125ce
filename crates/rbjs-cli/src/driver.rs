//! One conversion run: read the tree, convert it, collect diagnostics.

use anyhow::{Context, Result};
use rbjs_common::Diagnostic;
use rbjs_emitter::Pipeline;
use rbjs_tree::{Node, from_json_str, parse_sexp};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::args::{CliArgs, InputFormat};
use crate::config;

/// Result of a run. Exactly one of the two is populated.
#[derive(Debug, Default)]
pub struct RunResult {
    pub output: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Pick the input format from an explicit flag, the file extension, or the
/// first significant character of the text.
pub fn detect_format(explicit: Option<InputFormat>, path: Option<&Path>, text: &str) -> InputFormat {
    if let Some(format) = explicit {
        return format;
    }
    match path.and_then(Path::extension).and_then(|ext| ext.to_str()) {
        Some("json") => return InputFormat::Json,
        Some("sexp" | "sx") => return InputFormat::Sexp,
        _ => {}
    }
    match text.trim_start().chars().next() {
        Some('[' | '{') => InputFormat::Json,
        _ => InputFormat::Sexp,
    }
}

pub fn read_tree(text: &str, format: InputFormat) -> Result<Node> {
    let tree = match format {
        InputFormat::Sexp => parse_sexp(text),
        InputFormat::Json => from_json_str(text),
    };
    tree.context("failed to read syntax tree")
}

/// Convert `tree`, turning a conversion error into a diagnostic.
pub fn convert_tree(pipeline: &Pipeline, tree: &Node, print_tree: bool) -> RunResult {
    let converted = if print_tree {
        pipeline.normalize(tree).map(|normalized| normalized.to_string())
    } else {
        pipeline.convert(tree)
    };
    match converted {
        Ok(output) => RunResult {
            output: Some(output),
            diagnostics: Vec::new(),
        },
        Err(err) => {
            debug!(code = err.code(), "conversion failed");
            RunResult {
                output: None,
                diagnostics: vec![err.to_diagnostic()],
            }
        }
    }
}

fn read_input(input: Option<&Path>, cwd: &Path) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            let path = cwd.join(path);
            std::fs::read_to_string(&path).with_context(|| format!("failed to read input: {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read input from stdin")?;
            Ok(text)
        }
    }
}

/// Run one conversion as configured by `args`. Writes the output file when
/// one is requested; otherwise the output is left in the result.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let config = config::load(args, cwd)?;
    let pipeline = config::build_pipeline(&config)?;
    let text = read_input(args.input.as_deref(), cwd)?;
    let format = detect_format(args.format, args.input.as_deref(), &text);
    let tree = read_tree(&text, format)?;
    debug!(?format, filters = config.filters.len(), "converting");

    let mut result = convert_tree(&pipeline, &tree, args.print_tree);
    if let (Some(path), Some(output)) = (&args.output, &result.output) {
        let path = cwd.join(path);
        std::fs::write(&path, output).with_context(|| format!("failed to write output: {}", path.display()))?;
        result.output = None;
    }
    Ok(result)
}
