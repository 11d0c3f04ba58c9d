//! Speech-to-text (STT) via the Azure Speech short-audio REST endpoint

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::audio::{AudioFormat, PullAudioSource};
use crate::config::SpeechConfig;
use crate::pipeline::Transcriber;
use crate::{Error, Result};

/// Bytes pulled from the source per upload chunk (100ms of 16kHz mono 16-bit)
pub const STREAM_CHUNK_BYTES: usize = 3200;

/// Recognition outcome reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RecognitionStatus {
    Success,
    NoMatch,
    InitialSilenceTimeout,
    BabbleTimeout,
    Error,
    #[serde(other)]
    Unknown,
}

/// Simple-format recognition response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: RecognitionStatus,
    #[serde(default)]
    display_text: String,
}

/// Transcribes one utterance per call
pub struct SpeechToText {
    client: reqwest::Client,
    key: SecretString,
    endpoint: String,
    language: String,
}

impl SpeechToText {
    /// Create a recognizer from speech settings
    #[must_use]
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            key: SecretString::from(config.key.expose_secret()),
            endpoint: config.stt_endpoint.clone(),
            language: config.language.clone(),
        }
    }

    /// Run a single recognition pass over the whole source
    ///
    /// The request body is produced by pulling fixed-size chunks from the
    /// source until it reports end of stream, then closing it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transcription` for layouts other than 16-bit mono,
    /// transport failures, non-success HTTP status, or any recognition
    /// status other than `Success`
    pub async fn recognize(&self, mut source: Box<dyn PullAudioSource>) -> Result<String> {
        let format = source.format();
        if let Err(e) = check_layout(format) {
            source.close();
            return Err(e);
        }

        tracing::debug!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "starting recognition"
        );

        let chunks = futures::stream::unfold(source, |mut source| async move {
            let chunk = source.read(STREAM_CHUNK_BYTES);
            if chunk.is_empty() {
                source.close();
                None
            } else {
                Some((Ok::<_, std::io::Error>(chunk), source))
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("language", self.language.as_str()), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", self.key.expose_secret())
            .header("Content-Type", format.content_type())
            .header("Accept", "application/json")
            .body(reqwest::Body::wrap_stream(chunks))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "recognition request failed");
                Error::Transcription(format!("request failed: {e}"))
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "speech API error");
            return Err(Error::Transcription(format!(
                "speech API error {status}: {body}"
            )));
        }

        let result: RecognitionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse recognition response");
            Error::Transcription(format!("malformed response: {e}"))
        })?;

        let transcript = interpret(result)?;
        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

/// The short-audio endpoint reads the body as 16-bit mono PCM
fn check_layout(format: AudioFormat) -> Result<()> {
    if format.channels == 1 && format.sample_width == 2 {
        return Ok(());
    }

    tracing::error!(
        channels = format.channels,
        sample_width = format.sample_width,
        "unsupported capture layout"
    );
    Err(Error::Transcription(format!(
        "unsupported audio layout: {} channel(s), {}-byte samples; 16-bit mono PCM required",
        format.channels, format.sample_width
    )))
}

/// Map an engine response to an utterance or a failure carrying its reason
fn interpret(response: RecognitionResponse) -> Result<String> {
    let text = response.display_text.trim();
    match response.recognition_status {
        RecognitionStatus::Success if !text.is_empty() => Ok(text.to_string()),
        RecognitionStatus::Success => Err(Error::Transcription(
            "engine recognized speech but returned no text".to_string(),
        )),
        other => Err(Error::Transcription(format!("Reason: {other:?}"))),
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, source: Box<dyn PullAudioSource>) -> Result<String> {
        self.recognize(source).await
    }
}
