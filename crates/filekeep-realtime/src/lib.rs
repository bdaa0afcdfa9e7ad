//! # filekeep-realtime
//!
//! Change-notification plumbing for FileKeep. Provides:
//!
//! - Typed channel names (one channel per workspace)
//! - An in-memory broadcast feed implementing `ChangeFeed`
//! - Delivery counters for diagnostics

pub mod bridge;
pub mod channel;
pub mod metrics;

pub use bridge::memory_feed::MemoryChangeFeed;
pub use channel::ChannelType;
pub use metrics::{FeedMetrics, MetricsSnapshot};
