use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    augmentor::FailurePolicy,
    magic::ENV_CONFIG_PATH,
    options::AugmentationOptions,
    utils::error::{CoreError, CoreResult},
};

/// Process-wide augmentation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AugmentConfig {
    pub failure_policy: FailurePolicy,
    /// Options used by [`crate::Augmentor::apply_defaults`].
    pub defaults: AugmentationOptions,
}

impl AugmentConfig {
    /// Where the configuration lives: `$AUGCORE_CONFIG_PATH` when set, otherwise
    /// `augcore/config.toml` under the platform's user configuration directory.
    pub fn default_path() -> PathBuf {
        if let Some(explicit) = std::env::var_os(ENV_CONFIG_PATH) {
            return explicit.into();
        }

        #[cfg(target_os = "windows")]
        let base = std::env::var_os("APPDATA").map(PathBuf::from);
        #[cfg(not(target_os = "windows"))]
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")));

        base.unwrap_or_default().join("augcore").join("config.toml")
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> CoreResult<Self> {
        toml::from_str(toml_str).map_err(|e| CoreError::ConfigParseError {
            source: e,
            file: file.to_string(),
        })
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> CoreResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Load from [`Self::default_path`], falling back to defaults when no file exists.
    pub fn load_or_default() -> CoreResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from_toml(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the configuration to `path`, creating missing directories.
    pub fn save_to_toml(&self, path: &Path) -> CoreResult<()> {
        let rendered = toml::to_string(self)
            .map_err(|e| CoreError::Unknown(format!("Cannot render augmentation config: {e}")))?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}
