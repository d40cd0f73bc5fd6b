//! Runtime diagnostics.

pub mod reporter;
