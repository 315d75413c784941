use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    hooks::Feature,
};

/// Main configuration for the showcase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engine (ffmpeg binary and scratch storage) settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Demo input, outputs and per-feature parameters
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.demo.validate()?;
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ffmpeg binary to drive
    pub ffmpeg_path: PathBuf,

    /// Directory under which the private scratch storage is created
    /// (system temp directory when unset)
    pub scratch_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            scratch_root: None,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "engine.ffmpeg_path".to_string(),
                value: String::new()
            }.into());
        }

        Ok(())
    }
}

/// Demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Sample video staged into engine storage
    pub input: Option<PathBuf>,

    /// Name the sample is staged under
    pub staged_name: String,

    /// Directory produced media is exported to
    pub output_dir: PathBuf,

    /// Scale expression shared by thumbnail, GIF and resize (`width:height`,
    /// `-2` meaning "auto, even")
    pub scale: String,

    /// Timestamp the thumbnail frame is taken at
    pub thumbnail_timestamp: String,

    /// Frame rate of the GIF output
    pub gif_fps: u32,

    /// Features to run; execution order is always the canonical one
    pub features: Vec<Feature>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            input: None,
            staged_name: "in.mp4".to_string(),
            output_dir: PathBuf::from("showcase-output"),
            scale: "320:-2".to_string(),
            thumbnail_timestamp: "1".to_string(),
            gif_fps: 12,
            features: Feature::ALL.to_vec(),
        }
    }
}

impl DemoConfig {
    fn validate(&self) -> Result<()> {
        if !is_plain_file_name(&self.staged_name) {
            return Err(ConfigError::InvalidValue {
                key: "demo.staged_name".to_string(),
                value: self.staged_name.clone()
            }.into());
        }

        if !is_scale_expression(&self.scale) {
            return Err(ConfigError::InvalidValue {
                key: "demo.scale".to_string(),
                value: self.scale.clone()
            }.into());
        }

        if self.thumbnail_timestamp.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "demo.thumbnail_timestamp".to_string(),
                value: self.thumbnail_timestamp.clone()
            }.into());
        }

        if self.gif_fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "demo.gif_fps".to_string(),
                value: self.gif_fps.to_string()
            }.into());
        }

        if self.features.is_empty() {
            return Err(ConfigError::MissingKey { key: "demo.features".to_string() }.into());
        }

        Ok(())
    }

    /// The sample input path, required once the pipeline stages it
    pub fn require_input(&self) -> Result<&Path> {
        self.input
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey { key: "demo.input".to_string() }.into())
    }
}

/// Whether `name` can live directly in the engine's flat storage namespace
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

fn is_scale_expression(expr: &str) -> bool {
    let mut parts = expr.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(w), Some(h), None) => {
            [w, h].iter().all(|p| !p.is_empty() && !p.contains(char::is_whitespace))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.demo.scale = "640:-2".to_string();
        original_config.demo.features = vec![Feature::Version, Feature::Gif];

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.demo.scale, "640:-2");
        assert_eq!(loaded_config.demo.features, vec![Feature::Version, Feature::Gif]);
        assert_eq!(loaded_config.engine.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[demo]\ngif_fps = 8\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.demo.gif_fps, 8);
        assert_eq!(config.demo.staged_name, "in.mp4");
        assert_eq!(config.demo.features.len(), Feature::ALL.len());
    }

    #[test]
    fn test_invalid_scale() {
        let mut config = Config::default();
        config.demo.scale = "320".to_string();
        assert!(config.validate().is_err());

        config.demo.scale = "320: -2".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_staged_name() {
        let mut config = Config::default();
        config.demo.staged_name = "videos/in.mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_fps_rejected() {
        let mut config = Config::default();
        config.demo.gif_fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_input() {
        let config = Config::default();
        assert!(config.demo.require_input().is_err());
    }
}
