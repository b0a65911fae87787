//! Command implementations

pub mod provision;
pub mod render;
pub mod status;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigOverrides, ProvisionConfig};
use crate::infra::config::YamlConfigStore;

/// Load the config file, layer CLI overrides on top, and validate the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a field is invalid.
pub fn load_config(explicit: Option<PathBuf>, overrides: ConfigOverrides) -> Result<ProvisionConfig> {
    let store = YamlConfigStore::new(explicit);
    let path = store.path()?;
    let config = store.load()?.with_overrides(overrides);
    config
        .validate()
        .with_context(|| format!("invalid configuration ({})", path.display()))?;
    tracing::debug!(path = %path.display(), hostname = %config.hostname(), "configuration loaded");
    Ok(config)
}
