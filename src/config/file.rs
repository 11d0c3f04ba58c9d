//! TOML configuration file loading
//!
//! Supports `~/.config/voice-loop/config.toml` as a persistent config source.
//! All fields are optional; the file overlays the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceLoopConfigFile {
    /// Chat completion settings
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Azure Speech settings
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Reply length cap in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Speech engine configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeechFileConfig {
    /// Azure region (e.g. "westeurope")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Recognition language (e.g. "en-US")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Synthesis voice name (e.g. "en-US-AvaNeural")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Override for the recognition endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_endpoint: Option<String>,

    /// Override for the synthesis endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_endpoint: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiKeysFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_speech: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VoiceLoopConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> VoiceLoopConfigFile {
    config_file_path().map_or_else(VoiceLoopConfigFile::default, |path| load_from(&path))
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> VoiceLoopConfigFile {
    if !path.exists() {
        return VoiceLoopConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoiceLoopConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoiceLoopConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voice-loop/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "voice-loop")
        .map(|d| d.config_dir().join("config.toml"))
}
