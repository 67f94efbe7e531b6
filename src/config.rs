//! YAML configuration for the viewer.
//!
//! ```yaml
//! image: frames/test_card.png
//! mode: map
//! material:
//!   blend_enabled: true
//!   requested_opacity: 0.4
//! ```

use crate::error::{Error, Result};
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Material state that can be changed at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    pub blend_enabled: bool,
    /// Left untouched on the material when absent
    pub requested_opacity: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Still image standing in for the decoded video frame
    pub image: Option<PathBuf>,
    pub mode: Mode,
    pub material: MaterialSettings,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }
}

/// Command line values that win over the config file, on load and on
/// every reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub image: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub blend_enabled: Option<bool>,
    pub requested_opacity: Option<f32>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(image) = &self.image {
            config.image = Some(image.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(blend_enabled) = self.blend_enabled {
            config.material.blend_enabled = blend_enabled;
        }
        if let Some(opacity) = self.requested_opacity {
            config.material.requested_opacity = Some(opacity);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            "image: card.png\nmode: map\nmaterial:\n  blend_enabled: true\n  requested_opacity: 0.4\n",
        )
        .unwrap();
        assert_eq!(config.image, Some(PathBuf::from("card.png")));
        assert_eq!(config.mode, Mode::Map);
        assert!(config.material.blend_enabled);
        assert_eq!(config.material.requested_opacity, Some(0.4));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = Config::from_yaml("mode: exhibition\n").unwrap();
        assert_eq!(config.mode, Mode::Exhibition);
        assert_eq!(config.image, None);
        assert_eq!(config.material, MaterialSettings::default());

        let empty = Config::from_yaml("{}").unwrap();
        assert_eq!(empty, Config::default());
        assert_eq!(empty.mode, Mode::Setup);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::from_yaml("mode: calibrate\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let overrides = ConfigOverrides {
            mode: Some(Mode::Map),
            blend_enabled: Some(true),
            ..Default::default()
        };
        let config = overrides.apply(Config::from_yaml("mode: setup\nmaterial:\n  requested_opacity: 0.6\n").unwrap());
        assert_eq!(config.mode, Mode::Map);
        assert!(config.material.blend_enabled);
        assert_eq!(config.material.requested_opacity, Some(0.6));
    }

    #[test]
    fn test_overrides_survive_reload() {
        let overrides = ConfigOverrides {
            blend_enabled: Some(true),
            ..Default::default()
        };
        let first = overrides.apply(Config::from_yaml("mode: map\n").unwrap());
        let reloaded = overrides.apply(Config::from_yaml("mode: setup\n").unwrap());
        assert!(first.material.blend_enabled);
        assert!(reloaded.material.blend_enabled);
        assert_eq!(reloaded.mode, Mode::Setup);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let config = Config::from_yaml("mode: exhibition\n").unwrap();
        assert_eq!(ConfigOverrides::default().apply(config.clone()), config);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/videomap.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
