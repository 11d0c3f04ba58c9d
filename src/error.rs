//! Error types for the voice loop

use thiserror::Error;

/// Result type alias for voice loop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice loop
#[derive(Debug, Error)]
pub enum Error {
    /// Required credential or setting missing at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// Capture buffer is not a parseable WAV container
    #[error("malformed audio: {0}")]
    MalformedAudio(String),

    /// Speech recognition did not produce an utterance
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Chat completion request failed or returned no reply
    #[error("completion failed: {0}")]
    Completion(String),

    /// Speech synthesis did not complete
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Audio device or codec error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error ends a single pipeline run rather than the process
    #[must_use]
    pub const fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedAudio(_)
                | Self::Transcription(_)
                | Self::Completion(_)
                | Self::Synthesis(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failures_are_per_run() {
        assert!(Error::Transcription("NoMatch".into()).is_stage_failure());
        assert!(Error::Completion("500".into()).is_stage_failure());
        assert!(Error::Synthesis("empty".into()).is_stage_failure());
        assert!(Error::MalformedAudio("bad header".into()).is_stage_failure());
    }

    #[test]
    fn config_errors_are_fatal() {
        assert!(!Error::Config("missing key".into()).is_stage_failure());
        assert!(!Error::Audio("no device".into()).is_stage_failure());
    }

    #[test]
    fn messages_name_the_stage() {
        let err = Error::Completion("HTTP 500".into());
        assert_eq!(err.to_string(), "completion failed: HTTP 500");
    }
}
