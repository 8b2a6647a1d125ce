//! `rbjs.json` project configuration.
//!
//! ```json
//! { "filters": ["node"], "options": { "esLevel": "es2017", "comparison": "identity" } }
//! ```
//!
//! Command-line flags override the file: a target, comparison or slash limit
//! given on the command line replaces the configured value, and a non-empty
//! `--filter` list replaces the configured filter list.

use anyhow::{Context, Result, bail};
use rbjs_emitter::{ConvertOptions, Pipeline};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::args::CliArgs;

pub const CONFIG_FILE: &str = "rbjs.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Filter names, in stack order.
    pub filters: Vec<String>,
    pub options: ConvertOptions,
}

pub fn parse_config(source: &str) -> Result<ProjectConfig> {
    let config = serde_json::from_str(source).context("failed to parse rbjs.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("invalid config: {}", path.display()))
}

/// The config named on the command line, or `rbjs.json` in `cwd` if it exists.
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(cwd.join(path)),
        None => Some(cwd.join(CONFIG_FILE)).filter(|path| path.is_file()),
    }
}

/// Merge the project config with command-line overrides.
pub fn resolve(args: &CliArgs, config: ProjectConfig) -> ProjectConfig {
    let mut resolved = config;
    if let Some(target) = args.target {
        resolved.options.es_level = target.to_es_level();
    }
    if let Some(comparison) = args.comparison {
        resolved.options.comparison = comparison.to_comparison();
    }
    if let Some(limit) = args.regexp_slash_limit {
        resolved.options.regexp_slash_limit = limit;
    }
    if !args.filters.is_empty() {
        resolved.filters = args.filters.clone();
    }
    resolved
}

/// Load and resolve the configuration for one run.
pub fn load(args: &CliArgs, cwd: &Path) -> Result<ProjectConfig> {
    let config = match find_config(args.config.as_deref(), cwd) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)?
        }
        None => ProjectConfig::default(),
    };
    Ok(resolve(args, config))
}

/// Build the filter stack the configuration names.
pub fn build_pipeline(config: &ProjectConfig) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(config.options.clone());
    for name in &config.filters {
        let Some(filter) = rbjs_filters::by_name(name) else {
            bail!(
                "unknown filter '{name}' (available: {})",
                rbjs_filters::available().join(", ")
            );
        };
        pipeline = pipeline.with_filter(filter);
    }
    Ok(pipeline)
}
