//! Command-line support for the `rbjs` binary.
//!
//! The binary reads one serialized syntax tree (s-expression text or JSON),
//! resolves the conversion configuration from `rbjs.json` and command-line
//! flags, runs the filter pipeline and prints JavaScript or diagnostics.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "../tests/reporter_tests.rs"]
mod reporter_tests;
