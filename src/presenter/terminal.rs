//! Terminal presentation: microphone or WAV file in, speakers out

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};

use super::Presenter;
use crate::audio::AudioCapture;
use crate::voice::{AudioPlayback, Microphone, decode_wav};
use crate::{Error, Result};

/// Where utterances come from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Record from the default input device, Enter to start and stop
    Microphone,
    /// Serve a single WAV file, then end the session
    File(PathBuf),
}

/// Interactive terminal front end
pub struct TerminalPresenter {
    source: CaptureSource,
    file_served: bool,
    auto_confirm: bool,
    playback_enabled: bool,
    playback: Option<AudioPlayback>,
}

impl TerminalPresenter {
    /// Create a terminal presenter
    #[must_use]
    pub const fn new(source: CaptureSource) -> Self {
        Self {
            source,
            file_served: false,
            auto_confirm: false,
            playback_enabled: true,
            playback: None,
        }
    }

    /// Process every capture without asking
    #[must_use]
    pub const fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    /// Disable speaker output (reply audio size is reported instead)
    #[must_use]
    pub const fn with_playback(mut self, enabled: bool) -> Self {
        self.playback_enabled = enabled;
        self
    }

    fn record() -> Result<Option<AudioCapture>> {
        loop {
            let answer: String = Input::new()
                .with_prompt("Press Enter to speak (q to quit)")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;

            if answer.trim().eq_ignore_ascii_case("q") {
                return Ok(None);
            }

            let utterance = Microphone::new()?.record_utterance(|| {
                Input::<String>::new()
                    .with_prompt("Recording... press Enter to stop")
                    .allow_empty(true)
                    .interact_text()
                    .map(|_| ())
                    .map_err(|e| Error::Io(std::io::Error::other(e)))
            })?;

            match utterance {
                Some(capture) => return Ok(Some(capture)),
                None => println!("[warn] Nothing was recorded, try again."),
            }
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<Option<AudioCapture>> {
        if self.file_served {
            return Ok(None);
        }
        self.file_served = true;

        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded capture file");
        Ok(Some(AudioCapture::new(bytes)))
    }
}

impl Presenter for TerminalPresenter {
    fn capture(&mut self) -> Result<Option<AudioCapture>> {
        match self.source.clone() {
            CaptureSource::Microphone => Self::record(),
            CaptureSource::File(path) => self.load_file(&path),
        }
    }

    fn review(&mut self, capture: &AudioCapture) -> Result<()> {
        if !self.playback_enabled {
            println!("Recorded audio: {} bytes (playback disabled)", capture.len());
            return Ok(());
        }

        let (sample_rate, samples) = decode_wav(capture)?;
        println!("Playing back your recording...");
        AudioPlayback::with_sample_rate(sample_rate)?.play(samples)
    }

    fn confirm_processing(&mut self) -> bool {
        if self.auto_confirm {
            return true;
        }

        Confirm::new()
            .with_prompt("Send to LLM?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }

    fn play(&mut self, audio: &[u8]) -> Result<()> {
        if !self.playback_enabled {
            println!("Reply audio: {} bytes (playback disabled)", audio.len());
            return Ok(());
        }

        if self.playback.is_none() {
            self.playback = Some(AudioPlayback::new()?);
        }

        match self.playback.as_ref() {
            Some(playback) => playback.play_mp3(audio),
            None => Ok(()),
        }
    }

    fn status(&mut self, message: &str) {
        println!("... {message}");
    }

    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn success(&mut self, message: &str) {
        println!("[ok] {message}");
    }

    fn warning(&mut self, message: &str) {
        eprintln!("[warn] {message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("[error] {message}");
    }
}
