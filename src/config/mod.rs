//! Configuration management for the voice loop
//!
//! Values are read once at startup and passed explicitly to each client.
//! Precedence: process env (after `.env`) > TOML file > default.

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

use file::VoiceLoopConfigFile;

/// Env var holding the chat completion credential
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
/// Env var holding the speech engine credential
pub const AZURE_SPEECH_KEY: &str = "AZURE_SPEECH_KEY";
/// Env var holding the speech engine region
pub const AZURE_SPEECH_REGION: &str = "AZURE_SPEECH_REGION";

/// Warning shown when required credentials are absent
pub const MISSING_CONFIG_WARNING: &str =
    "Set OPENROUTER_API_KEY, AZURE_SPEECH_KEY, AZURE_SPEECH_REGION in env or .env.";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_VOICE: &str = "en-US-AvaNeural";

/// Voice loop configuration
#[derive(Debug)]
pub struct Config {
    /// Chat completion settings
    pub completion: CompletionConfig,

    /// Speech recognition and synthesis settings
    pub speech: SpeechConfig,
}

/// Chat completion endpoint configuration
#[derive(Debug)]
pub struct CompletionConfig {
    /// `OpenRouter` API key
    pub api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// OpenAI-compatible base URL (without `/chat/completions`)
    pub base_url: String,

    /// Reply length cap in tokens
    pub max_tokens: u32,

    /// Request timeout
    pub timeout: Duration,
}

/// Azure Speech configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Subscription key
    pub key: SecretString,

    /// Azure region
    pub region: String,

    /// Recognition language
    pub language: String,

    /// Synthesis voice name
    pub voice: String,

    /// Recognition endpoint
    pub stt_endpoint: String,

    /// Synthesis endpoint
    pub tts_endpoint: String,
}

impl SpeechConfig {
    /// Default short-audio recognition endpoint for a region
    #[must_use]
    pub fn default_stt_endpoint(region: &str) -> String {
        format!(
            "https://{region}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
        )
    }

    /// Default synthesis endpoint for a region
    #[must_use]
    pub fn default_tts_endpoint(region: &str) -> String {
        format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
    }
}

impl Config {
    /// Load configuration from `.env`, the process environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if any required credential is missing
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_sources(|key| std::env::var(key).ok(), file::load_config_file())
    }

    /// Build configuration from an env lookup and a parsed config file
    ///
    /// # Errors
    ///
    /// Returns error naming every missing required variable
    pub fn from_sources<F>(lookup: F, fc: VoiceLoopConfigFile) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_key = get(OPENROUTER_API_KEY).or(fc.api_keys.openrouter);
        let speech_key = get(AZURE_SPEECH_KEY).or(fc.api_keys.azure_speech);
        let region = get(AZURE_SPEECH_REGION).or(fc.speech.region);

        let missing: Vec<&str> = [
            (OPENROUTER_API_KEY, openrouter_key.is_none()),
            (AZURE_SPEECH_KEY, speech_key.is_none()),
            (AZURE_SPEECH_REGION, region.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(openrouter_key), Some(speech_key), Some(region)) =
            (openrouter_key, speech_key, region)
        else {
            return Err(Error::Config(format!("missing {}", missing.join(", "))));
        };

        let completion = CompletionConfig {
            api_key: SecretString::from(openrouter_key),
            model: get("OPENROUTER_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("OPENROUTER_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: parse_override(&get, "VOICE_LOOP_MAX_TOKENS")
                .or(fc.llm.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(
                parse_override(&get, "VOICE_LOOP_TIMEOUT_SECS")
                    .or(fc.llm.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        };

        let speech = SpeechConfig {
            key: SecretString::from(speech_key),
            language: get("AZURE_SPEECH_LANGUAGE")
                .or(fc.speech.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            voice: get("AZURE_SPEECH_VOICE")
                .or(fc.speech.voice)
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            stt_endpoint: get("AZURE_STT_ENDPOINT")
                .or(fc.speech.stt_endpoint)
                .unwrap_or_else(|| SpeechConfig::default_stt_endpoint(&region)),
            tts_endpoint: get("AZURE_TTS_ENDPOINT")
                .or(fc.speech.tts_endpoint)
                .unwrap_or_else(|| SpeechConfig::default_tts_endpoint(&region)),
            region,
        };

        tracing::debug!(
            model = %completion.model,
            region = %speech.region,
            voice = %speech.voice,
            "configuration loaded"
        );

        Ok(Self { completion, speech })
    }
}

/// Parse a numeric env override, ignoring (and logging) garbage
fn parse_override<T, G>(get: &G, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable override");
            None
        }
    }
}
