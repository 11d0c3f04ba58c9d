//! Text-to-speech (TTS) via the Azure Speech REST endpoint

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::SpeechConfig;
use crate::pipeline::Synthesizer;
use crate::{Error, Result};

/// Audio encoding requested from the engine
pub const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    key: SecretString,
    endpoint: String,
    voice: String,
    language: String,
}

impl TextToSpeech {
    /// Create a synthesizer from speech settings
    #[must_use]
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            key: SecretString::from(config.key.expose_secret()),
            endpoint: config.tts_endpoint.clone(),
            voice: config.voice.clone(),
            language: config.language.clone(),
        }
    }

    /// Voice used for every synthesis call
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns `Error::Synthesis` if the request fails or the engine does not
    /// complete synthesis
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("nothing to synthesize".to_string()));
        }

        tracing::debug!(chars = text.len(), voice = %self.voice, "starting synthesis");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", self.key.expose_secret())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "voice-loop")
            .body(ssml(&self.language, &self.voice, text))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "synthesis request failed");
                Error::Synthesis(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "speech API error");
            return Err(Error::Synthesis(format!("speech API error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("failed to read audio: {e}")))?;

        if audio.is_empty() {
            return Err(Error::Synthesis("engine returned no audio".to_string()));
        }

        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl Synthesizer for TextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.speak(text).await
    }
}

/// Wrap text in a single-voice SSML document
fn ssml(language: &str, voice: &str, text: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'>\
         <voice name='{}'>{}</voice></speak>",
        escape_xml(language),
        escape_xml(voice),
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
