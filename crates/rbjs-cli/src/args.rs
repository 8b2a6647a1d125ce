use clap::{Parser, ValueEnum};
use rbjs_common::EsLevel;
use rbjs_emitter::Comparison;
use std::path::PathBuf;

/// CLI arguments for the rbjs binary.
#[derive(Parser, Debug)]
#[command(name = "rbjs", version, about = "Convert a Ruby syntax tree to JavaScript")]
pub struct CliArgs {
    /// Serialized syntax tree to convert. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Write the output to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Format of the input tree. Detected from the extension or content when omitted.
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Path to an rbjs.json file. Defaults to ./rbjs.json when present.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // ==================== Conversion ====================
    /// Target ECMAScript level.
    #[arg(short = 't', long, value_enum, ignore_case = true)]
    pub target: Option<Target>,

    /// How Ruby `==` and `!=` are written.
    #[arg(long, value_enum)]
    pub comparison: Option<ComparisonMode>,

    /// Patterns with more unescaped slashes than this use `new RegExp`.
    #[arg(long = "regexp-slash-limit")]
    pub regexp_slash_limit: Option<usize>,

    /// Filters to apply, in order. Replaces the list from rbjs.json.
    #[arg(short = 'f', long = "filter", value_delimiter = ',')]
    pub filters: Vec<String>,

    // ==================== Output ====================
    /// Print the normalized tree instead of JavaScript.
    #[arg(long = "print-tree")]
    pub print_tree: bool,

    /// How conversion diagnostics are reported.
    #[arg(long, value_enum, default_value_t = DiagnosticFormat::Pretty)]
    pub diagnostics: DiagnosticFormat,

    /// Disable colored diagnostics.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// List the available filters and exit.
    #[arg(long = "list-filters")]
    pub list_filters: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    /// `(send nil :puts (str "hi"))`
    Sexp,
    /// `["send", null, ":puts", ["str", "hi"]]`
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    #[value(alias = "legacy")]
    Es5,
    #[value(alias = "es6")]
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
}

impl Target {
    pub fn to_es_level(self) -> EsLevel {
        match self {
            Target::Es5 => EsLevel::Es5,
            Target::Es2015 => EsLevel::Es2015,
            Target::Es2016 => EsLevel::Es2016,
            Target::Es2017 => EsLevel::Es2017,
            Target::Es2018 => EsLevel::Es2018,
            Target::Es2019 => EsLevel::Es2019,
            Target::Es2020 => EsLevel::Es2020,
            Target::Es2021 => EsLevel::Es2021,
            Target::Es2022 => EsLevel::Es2022,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ComparisonMode {
    /// `==` / `!=`
    Equality,
    /// `===` / `!==`
    Identity,
}

impl ComparisonMode {
    pub fn to_comparison(self) -> Comparison {
        match self {
            ComparisonMode::Equality => Comparison::Equality,
            ComparisonMode::Identity => Comparison::Identity,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum DiagnosticFormat {
    /// Human-readable, colored when stderr is a terminal.
    #[default]
    Pretty,
    /// A JSON array of diagnostic records.
    Json,
}
