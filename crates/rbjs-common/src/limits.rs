//! Centralized limits and thresholds for the converter.
//!
//! Both the filter pipeline and the code generator recurse once per tree
//! level. Trees come from an external parser, so their depth is bounded only
//! by input size; these limits turn a pathological input into a fatal
//! diagnostic instead of a stack overflow.

/// Maximum tree depth the filter pipeline will normalize.
///
/// Each level costs one re-entry into the shared `process` entry point plus
/// one frame per filter that calls through to the rest of the stack.
pub const MAX_FILTER_DEPTH: u32 = 500;

/// Maximum tree depth the code generator will emit.
pub const MAX_EMIT_DEPTH: u32 = 500;

/// Default number of unescaped `/` characters a regular expression may
/// contain and still be written in compact `/.../flags` form.
pub const DEFAULT_REGEXP_SLASH_LIMIT: usize = 3;
