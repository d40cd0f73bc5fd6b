//! Small timing utilities shared across the crate.

pub mod clock;
pub mod timer;
