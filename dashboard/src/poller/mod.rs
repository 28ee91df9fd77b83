//! Poller: timer-driven fan-out of fetches for one panel
//!
//! Each panel owns one `Poller`. A tick fetches every configured resource
//! concurrently and commits each result into the panel's own snapshot.
//!
//! # Guarantees
//!
//! - A tick that fires while the previous one is still in flight is skipped
//! - Results that land after `deactivate()` are discarded
//! - A failed resource keeps its last good records and is marked `Failed`
//! - No retry or backoff: the next natural tick is the retry

pub mod scheduler;
pub mod types;

pub use scheduler::Poller;
pub use types::{LoadState, PollSnapshot, PollerConfig, ResourceStatus, TickOutcome};
