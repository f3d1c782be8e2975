//! # logrecorder - conditional log buffering
//!
//! A decorator placed in front of a log sink. Low-severity events are not
//! written; instead each calling context keeps a small, bounded window of its
//! most recent ones. When a high-severity event arrives, that window is
//! flushed to the sink together with the event, giving diagnostic context
//! around errors without the cost of always emitting verbose logs.
//!
//! ## Core Concepts
//!
//! - **Event**: An immutable record with severity, timestamp, context and opaque payload
//! - **History**: The bounded, per-context buffer with count and age eviction
//! - **Registry**: Concurrent map from calling context to its history
//! - **TriggerPolicy**: Decides which severities flush
//! - **Dispatcher**: Buffers or flushes each event and forwards to the **Sink**
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use logrecorder::{ContextId, Dispatcher, Level, MemorySink, RecorderConfig};
//!
//! let sink = Arc::new(MemorySink::new());
//! let config = RecorderConfig::default()
//!     .with_max_size(3)
//!     .with_max_age(Duration::from_secs(30));
//! let recorder = Dispatcher::new(config, Arc::clone(&sink))?;
//!
//! let request = ContextId::from_name("req-17");
//! recorder.log_in(request, Level::Debug, "parsed headers")?;
//! recorder.log_in(request, Level::Error, "upstream timed out")?;
//!
//! assert_eq!(sink.payloads(), vec!["parsed headers", "upstream timed out"]);
//! # Ok::<(), logrecorder::RecorderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod level;
pub mod recorder;
pub mod sink;

// Re-export primary types at crate root for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RecorderConfig;
pub use context::ContextId;
pub use error::{ConfigError, FlushError, RecorderError, RecorderResult, SinkError, SinkFailure};
pub use event::{CallerData, Event};
pub use level::Level;
pub use recorder::{Dispatch, Dispatcher, DispatcherStats, History, Registry, TriggerPolicy};
pub use sink::{ChannelSink, JsonLinesSink, MemorySink, Sink};
