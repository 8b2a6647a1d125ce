//! Common types and utilities for the rbjs converter.
//!
//! This crate provides foundational types used across all rbjs crates:
//! - Target feature levels (`EsLevel`)
//! - Source locations reported by the external parser (`SourceLocation`)
//! - Diagnostic categories, codes and serializable records
//! - Recursion limits shared by the filter pipeline and the code generator

// Common types - feature levels shared by filters and the emitter
pub mod common;
pub use common::{EsLevel, ParseEsLevelError};

// Line/column locations carried on tree nodes
pub mod position;
pub use position::SourceLocation;

// Diagnostic categories and records
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
