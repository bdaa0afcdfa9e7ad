//! Record store and object storage configuration.

use serde::{Deserialize, Serialize};

/// Where the record snapshot and backing objects live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot used by the file-backed record store.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Root directory of the local object storage.
    #[serde(default = "default_object_root")]
    pub object_root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            object_root: default_object_root(),
        }
    }
}

fn default_snapshot_path() -> String {
    "data/filekeep.json".to_string()
}

fn default_object_root() -> String {
    "data/objects".to_string()
}
