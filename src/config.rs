use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{NormalizeError, Result};

/// What the ingestion CLI does when one element of a batch fails.
///
/// The pipeline itself is always fail-fast; this knob only governs the
/// caller-side loop in `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the whole run on the first failing payload
    Halt,
    /// Log the failure and continue with the remaining payloads
    Skip,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_error_policy")]
    pub on_error: ErrorPolicy,
    #[serde(default)]
    pub pretty: bool,
}

fn default_error_policy() -> ErrorPolicy {
    ErrorPolicy::Halt
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Halt,
            pretty: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            NormalizeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
