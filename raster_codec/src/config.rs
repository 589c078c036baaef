use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Defaults for packing images. Command line arguments take priority over
/// anything set here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Bits kept from each 8-bit sample, 1 through 8.
    pub depth: u8,
    /// Output size, the source image size is used when unset.
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// Invert samples before packing, for masks where zero means lit.
    pub invert: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl PackConfig {
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(if path.exists() {
            let string = fs::read_to_string(path)?;
            let config = toml::from_str(&string)?;
            info!("Loaded config from {}", path.display());
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            width: None,
            height: None,
            invert: false,
        }
    }
}
