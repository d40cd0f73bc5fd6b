//! # Duoloop
//!
//! Seamless looping for media elements that cannot loop without a visible
//! stall. Two instances of the same source alternate: the standby one is
//! primed while the active one plays and takes over shortly before the end,
//! either instantly or through a short blend.
//!
//! - [`playback::scheduler`] is the frame-driven state machine.
//! - [`playback::looper`] runs it in real time on a frame-pump thread.
//! - [`playback::simulation`] runs it deterministically on a manual clock.

pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod playback;
pub mod tools;

pub use error::LoopError;
pub use playback::instance::{InstanceId, ObjectFit, PlaybackInstance};
pub use playback::looper::Looper;
pub use playback::scheduler::{LoopScheduler, LoopSettings, LoopSnapshot, SchedulerEvent};
