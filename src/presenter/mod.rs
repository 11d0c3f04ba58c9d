//! Presentation surface consumed by the pipeline
//!
//! The core only needs a way to obtain a capture, a chance to hear it back,
//! an explicit trigger, playback of a raw buffer, and a handful of message
//! kinds.

mod terminal;

pub use terminal::{CaptureSource, TerminalPresenter};

use crate::Result;
use crate::audio::AudioCapture;

/// User-facing surface for one interactive session
pub trait Presenter {
    /// Record or load the next utterance; `None` ends the session
    ///
    /// # Errors
    ///
    /// Returns error if the capture device or file cannot be read
    fn capture(&mut self) -> Result<Option<AudioCapture>>;

    /// Play the capture back so the user can judge it before sending
    ///
    /// # Errors
    ///
    /// Returns error if the capture cannot be decoded or played
    fn review(&mut self, capture: &AudioCapture) -> Result<()>;

    /// Ask the user whether to process the capture
    fn confirm_processing(&mut self) -> bool;

    /// Play a synthesized audio buffer
    ///
    /// # Errors
    ///
    /// Returns error if the buffer cannot be decoded or played
    fn play(&mut self, audio: &[u8]) -> Result<()>;

    /// Progress note
    fn status(&mut self, message: &str);

    /// Neutral information
    fn info(&mut self, message: &str);

    /// Stage succeeded
    fn success(&mut self, message: &str);

    /// Non-fatal problem
    fn warning(&mut self, message: &str);

    /// Stage or run failure
    fn error(&mut self, message: &str);

    /// The model's answer
    fn reply(&mut self, text: &str) {
        self.info(&format!("LLM answer:\n{text}"));
    }
}
