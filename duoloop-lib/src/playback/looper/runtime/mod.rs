//! Internal runtime plumbing for the `Looper` frame pump.
//!
//! - [`thread`] attaches a fresh scheduler and spawns the pump.
//! - [`worker`] runs the per-frame loop and the settle timers.

mod thread;
mod worker;
