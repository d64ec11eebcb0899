use crate::domain::tts::{GenerationSettings, SpeedPolicy};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {name}")]
    Invalid { name: &'static str, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub aws_region: String,
    // TTS provider
    pub tts_provider: TtsProvider,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    // Generation limits
    pub tts_default_language: String,
    pub tts_max_text_length: usize,
    pub tts_max_batch_size: usize,
    pub tts_min_speed: f32,
    pub tts_max_speed: f32,
    pub tts_default_speed: f32,
    pub tts_speed_policy: SpeedPolicy,
    pub tts_batch_concurrency: usize,
    pub tts_synthesis_timeout_secs: u64,
    // TTS Cache
    pub tts_cache_enabled: bool,
    pub tts_cache_dir: PathBuf,
    /// 0 disables the size bound
    pub tts_max_cache_size_mb: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Google,
    Polly,
    OpenAi,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = Config {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "8080"))?,
            environment: match var("ENVIRONMENT", "development").to_lowercase().as_str() {
                "development" => Environment::Development,
                "production" => Environment::Production,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "ENVIRONMENT",
                        value: other.to_string(),
                    })
                }
            },
            log_format: match var("LOG_FORMAT", "pretty").to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            aws_region: var("AWS_REGION", "eu-west-1"),
            tts_provider: match var("TTS_PROVIDER", "google").to_lowercase().as_str() {
                "google" | "gtts" => TtsProvider::Google,
                "polly" | "aws" => TtsProvider::Polly,
                "openai" => TtsProvider::OpenAi,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "TTS_PROVIDER",
                        value: other.to_string(),
                    })
                }
            },
            openai_api_key: lookup("OPENAI_API_KEY").filter(|key| !key.is_empty()),
            openai_tts_model: var("OPENAI_TTS_MODEL", "tts-1"),
            openai_tts_voice: var("OPENAI_TTS_VOICE", ""),
            tts_default_language: var("TTS_DEFAULT_LANGUAGE", "en-us").to_lowercase(),
            tts_max_text_length: parse("TTS_MAX_TEXT_LENGTH", var("TTS_MAX_TEXT_LENGTH", "10000"))?,
            tts_max_batch_size: parse("TTS_MAX_BATCH_SIZE", var("TTS_MAX_BATCH_SIZE", "10"))?,
            tts_min_speed: parse("TTS_MIN_SPEED", var("TTS_MIN_SPEED", "0.5"))?,
            tts_max_speed: parse("TTS_MAX_SPEED", var("TTS_MAX_SPEED", "2.0"))?,
            tts_default_speed: parse("TTS_DEFAULT_SPEED", var("TTS_DEFAULT_SPEED", "1.0"))?,
            tts_speed_policy: match var("TTS_SPEED_POLICY", "reject").to_lowercase().as_str() {
                "reject" => SpeedPolicy::Reject,
                "clamp" => SpeedPolicy::Clamp,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "TTS_SPEED_POLICY",
                        value: other.to_string(),
                    })
                }
            },
            tts_batch_concurrency: parse("TTS_BATCH_CONCURRENCY", var("TTS_BATCH_CONCURRENCY", "4"))?,
            tts_synthesis_timeout_secs: parse(
                "TTS_SYNTHESIS_TIMEOUT_SECS",
                var("TTS_SYNTHESIS_TIMEOUT_SECS", "30"),
            )?,
            tts_cache_enabled: var("TTS_CACHE_ENABLED", "true").to_lowercase() == "true",
            tts_cache_dir: PathBuf::from(var("TTS_CACHE_DIR", ".audio_cache")),
            tts_max_cache_size_mb: parse("TTS_MAX_CACHE_SIZE_MB", var("TTS_MAX_CACHE_SIZE_MB", "100"))?,
        };

        config.check_consistency()?;
        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Cache bound in bytes, `None` when unbounded.
    pub fn max_cache_size_bytes(&self) -> Option<u64> {
        match self.tts_max_cache_size_mb {
            0 => None,
            mb => Some(mb * 1024 * 1024),
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_text_length: self.tts_max_text_length,
            max_batch_size: self.tts_max_batch_size,
            min_speed: self.tts_min_speed,
            max_speed: self.tts_max_speed,
            default_speed: self.tts_default_speed,
            speed_policy: self.tts_speed_policy,
            default_language: self.tts_default_language.clone(),
            batch_concurrency: self.tts_batch_concurrency,
            synthesis_timeout: Duration::from_secs(self.tts_synthesis_timeout_secs),
        }
    }

    fn check_consistency(&self) -> Result<(), ConfigError> {
        if !(self.tts_min_speed > 0.0 && self.tts_min_speed <= self.tts_max_speed) {
            return Err(ConfigError::Inconsistent(format!(
                "speed bounds {}-{} are not a positive range",
                self.tts_min_speed, self.tts_max_speed
            )));
        }
        if !(self.tts_min_speed..=self.tts_max_speed).contains(&self.tts_default_speed) {
            return Err(ConfigError::Inconsistent(format!(
                "default speed {} is outside {}-{}",
                self.tts_default_speed, self.tts_min_speed, self.tts_max_speed
            )));
        }
        if self.tts_max_batch_size == 0 || self.tts_max_text_length == 0 {
            return Err(ConfigError::Inconsistent(
                "text and batch limits must be positive".to_string(),
            ));
        }
        if self.tts_provider == TtsProvider::OpenAi && self.openai_api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
