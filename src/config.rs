use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum Mode {
    #[serde(rename = "15")]
    #[value(name = "15")]
    #[strum(serialize = "15")]
    Timed15,
    #[default]
    #[serde(rename = "30")]
    #[value(name = "30")]
    #[strum(serialize = "30")]
    Timed30,
    #[serde(rename = "60")]
    #[value(name = "60")]
    #[strum(serialize = "60")]
    Timed60,
    #[serde(rename = "words")]
    #[value(name = "words")]
    #[strum(serialize = "words")]
    Words,
    #[serde(rename = "zen")]
    #[value(name = "zen")]
    #[strum(serialize = "zen")]
    Zen,
}

impl Mode {
    /// Fixed duration in seconds; `None` for open-ended modes
    pub fn duration_secs(self) -> Option<u32> {
        match self {
            Mode::Timed15 => Some(15),
            Mode::Timed30 => Some(30),
            Mode::Timed60 => Some(60),
            Mode::Words | Mode::Zen => None,
        }
    }

    pub fn default_word_count(self) -> usize {
        match self {
            Mode::Words => 25,
            _ => 200,
        }
    }

    pub fn is_timed(self) -> bool {
        self.duration_secs().is_some()
    }
}

pub const DEFAULT_LANGUAGE: &str = "english";

/// Parameters of a single test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    pub mode: Mode,
    pub language: String,
    pub duration: Option<u32>,
    pub word_count: usize,
}

impl TestConfig {
    pub fn new(mode: Mode, language: impl Into<String>) -> Self {
        Self {
            mode,
            language: language.into(),
            duration: mode.duration_secs(),
            word_count: mode.default_word_count(),
        }
    }

    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new(Mode::default(), DEFAULT_LANGUAGE)
    }
}

/// User preferences persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub language: String,
    pub word_count: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            word_count: None,
            seed: None,
        }
    }
}

impl From<&Settings> for TestConfig {
    fn from(s: &Settings) -> Self {
        let cfg = TestConfig::new(s.mode, s.language.clone());
        match s.word_count {
            Some(n) => cfg.with_word_count(n),
            None => cfg,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keystride_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => return settings,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable settings")
                }
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn mode_presets() {
        assert_eq!(Mode::Timed15.duration_secs(), Some(15));
        assert_eq!(Mode::Timed60.default_word_count(), 200);
        assert_eq!(Mode::Words.duration_secs(), None);
        assert_eq!(Mode::Words.default_word_count(), 25);
        assert_eq!(Mode::Zen.duration_secs(), None);
        assert!(Mode::Timed30.is_timed());
        assert!(!Mode::Zen.is_timed());
    }

    #[test]
    fn mode_names() {
        assert_eq!(Mode::Timed30.to_string(), "30");
        assert_eq!(Mode::Words.to_string(), "words");
        assert_eq!(serde_json::to_string(&Mode::Timed15).unwrap(), "\"15\"");
        assert_eq!(
            serde_json::from_str::<Mode>("\"zen\"").unwrap(),
            Mode::Zen
        );
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            mode: Mode::Words,
            language: "code".into(),
            word_count: Some(10),
            seed: None,
        };
        let cfg = TestConfig::from(&settings);
        assert_eq!(cfg.mode, Mode::Words);
        assert_eq!(cfg.language, "code");
        assert_eq!(cfg.duration, None);
        assert_eq!(cfg.word_count, 10);
    }

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let settings = Settings {
            mode: Mode::Timed60,
            language: "code".into(),
            word_count: Some(50),
            seed: Some(9),
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }
}
