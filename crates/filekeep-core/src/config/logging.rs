//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Diagnostics written to stderr. `RUST_LOG` overrides `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `"info"` or `"filekeep_service=debug,warn"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// `"json"` for one object per line; anything else prints human-readable output.
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Whether structured JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format_is_case_insensitive() {
        let mut config = LoggingConfig::default();
        assert!(!config.is_json());
        config.format = " JSON ".into();
        assert!(config.is_json());
    }
}
