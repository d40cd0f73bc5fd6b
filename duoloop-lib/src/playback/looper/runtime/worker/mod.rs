//! Frame-pump worker internals.
//!
//! - [`context`] defines the shared state captured at spawn time.
//! - [`guard`] tracks pump-thread liveness.
//! - [`runner`] executes the frame loop and spawns settle timers.

mod context;
mod guard;
mod runner;

pub(in crate::playback::looper::runtime) use context::PumpContext;
pub(in crate::playback::looper::runtime) use runner::run_frame_pump;
