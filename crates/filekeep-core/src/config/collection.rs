//! File collection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest page size a collection accepts.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Paging and push-sync settings for a file collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Number of records per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Delay used to fold a burst of change events into one reload.
    #[serde(default = "default_coalesce_delay")]
    pub coalesce_delay_ms: u64,
    /// Per-workspace change feed buffer.
    #[serde(default = "default_feed_buffer")]
    pub feed_buffer: usize,
}

impl CollectionConfig {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Coalescing delay as a [`Duration`].
    pub fn coalesce_delay(&self) -> Duration {
        Duration::from_millis(self.coalesce_delay_ms)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            coalesce_delay_ms: default_coalesce_delay(),
            feed_buffer: default_feed_buffer(),
        }
    }
}

fn default_page_size() -> u64 {
    20
}

fn default_coalesce_delay() -> u64 {
    300
}

fn default_feed_buffer() -> usize {
    256
}
