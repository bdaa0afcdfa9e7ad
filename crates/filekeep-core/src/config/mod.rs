//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an absent file
//! still yields a usable configuration.

pub mod collection;
pub mod logging;
pub mod store;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::collection::CollectionConfig;
pub use self::logging::LoggingConfig;
pub use self::store::StoreConfig;
pub use self::taxonomy::TaxonomyConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record store and object storage locations.
    #[serde(default)]
    pub store: StoreConfig,
    /// File collection paging and sync settings.
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Bulk tag operation pacing.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base file at `path` with an optional environment-specific
    /// overlay (`config/{env}.toml`) and environment variables prefixed with
    /// `FILEKEEP__`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        debug!(path, env = env.unwrap_or("-"), "Loading configuration");
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FILEKEEP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
