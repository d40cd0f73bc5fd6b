//! Loop scheduling and the hosts that drive it.

pub mod instance;
pub mod looper;
pub mod scheduler;
pub mod simulated;
pub mod simulation;
