use super::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.as_ref().display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration: {}", path.as_ref().display()))?;

        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Missing file means defaults; a file that exists but is broken is an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    if path.as_ref().exists() {
        let config = Config::from_file(&path)?;
        log::info!("Loaded configuration from: {}", path.as_ref().display());
        Ok(config)
    } else {
        log::warn!(
            "Configuration file '{}' not found, using default configuration",
            path.as_ref().display()
        );
        Ok(Config::default())
    }
}
