//! Install coordination for multi-module reactor builds
//!
//! One coordinator per build run: projects race into their install step,
//! the readiness barrier picks a single winner, and the winner flushes
//! the deferred queue in submission order.

pub mod barrier;
pub mod coordinator;
pub mod installer;
pub mod queue;
pub mod types;

pub use barrier::*;
pub use coordinator::*;
pub use installer::*;
pub use queue::*;
pub use types::*;
