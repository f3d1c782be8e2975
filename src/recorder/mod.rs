//! Buffering core: per-context histories, their registry, the trigger
//! decision and the dispatcher that ties them together.

/// Event handling and flush delivery.
pub mod dispatcher;
/// Bounded per-context buffer.
pub mod history;
/// Threshold-based trigger decision.
pub mod policy;
/// Concurrent context-to-history map.
pub mod registry;

pub use dispatcher::{Dispatch, Dispatcher, DispatcherStats};
pub use history::History;
pub use policy::TriggerPolicy;
pub use registry::{Registry, SharedHistory};
