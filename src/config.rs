//! Configuration management for hero-narrator.
//!
//! Loads config from YAML files in standard locations. API credentials are
//! never compiled in: they come from the file or from the environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::narrator::VoiceGender;

pub const ENV_API_KEY: &str = "HERO_NARRATOR_API_KEY";
pub const ENV_API_HASH: &str = "HERO_NARRATOR_API_HASH";
pub const ENV_TTS_API_KEY: &str = "HERO_NARRATOR_TTS_API_KEY";
pub const ENV_VOICE_DEFAULT: &str = "HERO_NARRATOR_VOICE_DEFAULT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    #[serde(alias = "apiKey")]
    pub api_key: String,
    #[serde(alias = "apiHash")]
    pub api_hash: String,
    /// Timestamp the hash was computed for.
    pub ts: String,
    pub limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://gateway.marvel.com/v1/public".into(),
            api_key: String::new(),
            api_hash: String::new(),
            ts: "1".into(),
            limit: 100,
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingConfig("catalog.api_key"));
        }
        if self.api_hash.trim().is_empty() {
            return Err(Error::MissingConfig("catalog.api_hash"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    #[serde(alias = "ttsApiKey")]
    pub api_key: String,
    pub language_code: String,
    #[serde(alias = "voiceDefault")]
    pub voice_default: VoiceGender,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com/v1beta1/text:synthesize".into(),
            api_key: String::new(),
            language_code: "en-US".into(),
            voice_default: VoiceGender::Male,
        }
    }
}

impl SpeechConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingConfig("speech.api_key"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub result_dir: PathBuf,
    /// Directory holding `template.html` / `blank.html` overrides.
    pub template_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_dir: PathBuf::from("result"),
            template_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub speech: SpeechConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from YAML file, then apply environment overrides.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./hero-narrator.yaml
    /// 2. ~/.config/hero-narrator/config.yaml
    /// 3. /etc/hero-narrator/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::load_file(path);
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("hero-narrator.yaml")),
                dirs::home_dir().map(|h| h.join(".config/hero-narrator/config.yaml")),
                Some(PathBuf::from("/etc/hero-narrator/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.catalog.api_key = key;
        }
        if let Some(hash) = lookup(ENV_API_HASH) {
            self.catalog.api_hash = hash;
        }
        if let Some(key) = lookup(ENV_TTS_API_KEY) {
            self.speech.api_key = key;
        }
        if let Some(voice) = lookup(ENV_VOICE_DEFAULT) {
            match voice.parse() {
                Ok(gender) => self.speech.voice_default = gender,
                Err(e) => tracing::warn!("Ignoring {ENV_VOICE_DEFAULT}: {e}"),
            }
        }
    }
}
