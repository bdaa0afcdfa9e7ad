//! Tag taxonomy configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pacing for bulk tag rewrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Number of file updates issued per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
}

impl TaxonomyConfig {
    /// Inter-batch delay as a [`Duration`].
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay() -> u64 {
    100
}
