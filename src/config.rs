//! Engine configuration: an optional ~/.phonorules/config.yaml naming the
//! locale and the databases to load.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::{LanguageDatabase, LoadError, VoiceDatabase};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to load {path}: {source}")]
    Load { path: PathBuf, source: LoadError },

    #[error("no voice configured")]
    NoVoice,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Locale the matchers evaluate conditionals against.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Where compiled databases live. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Language database name, without extension.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub voice: Option<String>,
}

fn default_locale() -> String {
    "en-GB".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            data_dir: None,
            language: default_language(),
            voice: None,
        }
    }
}

impl EngineConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// `<data_dir>/languages/<language>.ldb`
    pub fn language_path(&self) -> PathBuf {
        self.data_dir()
            .join("languages")
            .join(format!("{}.ldb", self.language))
    }

    /// `<data_dir>/voices/<voice>.vdb`
    pub fn voice_path(&self) -> Option<PathBuf> {
        let voice = self.voice.as_ref()?;
        Some(self.data_dir().join("voices").join(format!("{voice}.vdb")))
    }

    pub fn load_language(&self) -> Result<Arc<LanguageDatabase>, ConfigError> {
        let path = self.language_path();
        let db = LanguageDatabase::open(&path).map_err(|source| ConfigError::Load {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), locale = db.locale(), "loaded language database");
        Ok(Arc::new(db))
    }

    pub fn load_voice(&self) -> Result<VoiceDatabase, ConfigError> {
        let path = self.voice_path().ok_or(ConfigError::NoVoice)?;
        let db = VoiceDatabase::open(&path).map_err(|source| ConfigError::Load {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), voice = db.id(), "loaded voice database");
        Ok(db)
    }
}

/// Default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".phonorules");
    path.push("config.yaml");
    path
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phonorules")
}

/// Load the configuration. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Save the configuration, creating parent directories as needed.
pub fn save_config(path: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_yaml::to_string(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn load_nonexistent_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.locale, "en-GB");
    }

    #[test]
    fn partial_yaml_config() {
        let config: EngineConfig = serde_yaml::from_str("locale: en-US\n").unwrap();
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.language, "en");
        assert!(config.voice.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let config = EngineConfig {
            locale: "en-IE".to_string(),
            data_dir: Some(PathBuf::from("/srv/phonorules")),
            language: "en-ie".to_string(),
            voice: Some("example".to_string()),
        };
        save_config(file.path(), &config).unwrap();
        assert_eq!(load_config(file.path()).unwrap(), config);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "locale: [unclosed\n").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn database_paths() {
        let config = EngineConfig {
            data_dir: Some(PathBuf::from("/data")),
            voice: Some("kal".to_string()),
            ..Default::default()
        };
        assert_eq!(config.language_path(), PathBuf::from("/data/languages/en.ldb"));
        assert_eq!(config.voice_path(), Some(PathBuf::from("/data/voices/kal.vdb")));
        assert!(EngineConfig::default().voice_path().is_none());
    }

    #[test]
    fn missing_database_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        match config.load_language() {
            Err(ConfigError::Load { path, .. }) => assert!(path.ends_with("languages/en.ldb")),
            other => panic!("expected a load error, got {other:?}"),
        }
        assert!(matches!(config.load_voice(), Err(ConfigError::NoVoice)));
    }
}
