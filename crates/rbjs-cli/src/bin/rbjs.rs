#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use rbjs_cli::args::{CliArgs, DiagnosticFormat};
use rbjs_cli::driver;
use rbjs_cli::reporter::Reporter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONVERSION_FAILED: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if RBJS_LOG or RUST_LOG is set.
    rbjs_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    if args.list_filters {
        for name in rbjs_filters::available() {
            println!("{name}");
        }
        return Ok(());
    }

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::run(&args, &cwd)?;

    if let Some(output) = &result.output {
        println!("{output}");
    }
    if !result.succeeded() {
        match args.diagnostics {
            DiagnosticFormat::Json => {
                let json = Reporter::render_json(&result.diagnostics).context("failed to serialize diagnostics")?;
                eprintln!("{json}");
            }
            DiagnosticFormat::Pretty => {
                let color = !args.no_color && std::io::stderr().is_terminal();
                eprintln!("{}", Reporter::new(color).render(&result.diagnostics));
            }
        }
    }

    std::process::exit(if result.succeeded() { EXIT_SUCCESS } else { EXIT_CONVERSION_FAILED });
}
