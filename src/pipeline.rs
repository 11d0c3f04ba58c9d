//! Single-turn pipeline: transcribe → complete → synthesize → present
//!
//! Each stage returns a tagged `Result`; the pipeline matches on it to pick
//! the next state. Nothing is retried and no error escapes `run`: every
//! failure is shown through the presenter and recorded in the `RunReport`.
//!
//! ```text
//! Idle ─▶ Transcribing ─▶ Completing ─▶ Synthesizing ─▶ Done
//!              │               │              │
//!              └───────────────┴──────────────┴──▶ Failed
//! ```
//!
//! Synthesis failure is the exception: the run still ends in `Done`, the
//! transcript and reply stay visible, and only audio output is lost.

use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

use crate::audio::{AudioCapture, PullAudioSource, WavPullSource};
use crate::llm::ChatCompletion;
use crate::presenter::Presenter;
use crate::voice::{SpeechToText, TextToSpeech};
use crate::{Config, Error, Result};

/// Converts a pulled audio stream into one recognized utterance
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Run exactly one recognition pass over the whole source
    async fn transcribe(&self, source: Box<dyn PullAudioSource>) -> Result<String>;
}

/// Produces a reply to a recognized utterance
#[async_trait]
pub trait Completer: Send + Sync {
    /// Issue one completion request and return the trimmed reply
    async fn complete(&self, text: &str) -> Result<String>;
}

/// Renders reply text as audio
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize the full reply into one audio buffer
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for a capture and an explicit processing request
    Idle,
    /// Speech recognition in progress
    Transcribing,
    /// Chat completion in progress
    Completing,
    /// Speech synthesis in progress
    Synthesizing,
    /// Run finished; reply surfaced
    Done,
    /// Run halted at the first hard failure
    Failed,
}

impl PipelineState {
    /// Whether `next` is a legal transition from this state
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Transcribing)
                | (Self::Transcribing, Self::Completing)
                | (Self::Completing, Self::Synthesizing)
                | (Self::Synthesizing, Self::Done)
                | (
                    Self::Transcribing | Self::Completing | Self::Synthesizing,
                    Self::Failed
                )
                | (Self::Done | Self::Failed, Self::Idle)
        )
    }

    /// Whether the run has ended
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Everything one run produced
#[derive(Debug)]
pub struct RunReport {
    /// Correlates log lines for this run
    pub run_id: Uuid,

    /// Final state (`Done` or `Failed`)
    pub state: PipelineState,

    /// Recognized utterance
    pub transcript: Option<String>,

    /// Model reply
    pub reply: Option<String>,

    /// Synthesized reply audio
    pub audio: Option<Vec<u8>>,

    /// Hard failure that moved the run to `Failed`
    pub failure: Option<Error>,

    /// Soft failure: synthesis did not complete, run still `Done`
    pub synthesis_failure: Option<Error>,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: PipelineState::Idle,
            transcript: None,
            reply: None,
            audio: None,
            failure: None,
            synthesis_failure: None,
        }
    }

    /// Whether the run reached `Done`
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }
}

/// Sequences the three stage clients for one utterance at a time
pub struct Pipeline {
    transcriber: Box<dyn Transcriber>,
    completer: Box<dyn Completer>,
    synthesizer: Box<dyn Synthesizer>,
    state: PipelineState,
}

impl Pipeline {
    /// Assemble a pipeline from stage implementations
    #[must_use]
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        completer: Box<dyn Completer>,
        synthesizer: Box<dyn Synthesizer>,
    ) -> Self {
        Self {
            transcriber,
            completer,
            synthesizer,
            state: PipelineState::Idle,
        }
    }

    /// Build the Azure + `OpenRouter` pipeline
    ///
    /// # Errors
    ///
    /// Returns error if a client cannot be constructed
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Box::new(SpeechToText::new(&config.speech)),
            Box::new(ChatCompletion::new(&config.completion)?),
            Box::new(TextToSpeech::new(&config.speech)),
        ))
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Process one capture end to end
    ///
    /// Callers invoke this only after the user explicitly asked for
    /// processing; a capture alone never starts a run.
    #[allow(clippy::future_not_send)]
    pub async fn run<P>(&mut self, capture: AudioCapture, presenter: &mut P) -> RunReport
    where
        P: Presenter + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", %run_id);
        self.execute(run_id, capture, presenter)
            .instrument(span)
            .await
    }

    #[allow(clippy::future_not_send)]
    async fn execute<P>(&mut self, run_id: Uuid, capture: AudioCapture, presenter: &mut P) -> RunReport
    where
        P: Presenter + ?Sized,
    {
        let mut report = RunReport::new(run_id);
        if self.state != PipelineState::Idle {
            self.advance(PipelineState::Idle);
        }

        tracing::info!(capture_bytes = capture.len(), "processing capture");
        presenter.status("Processing...");

        // Transcribing
        self.advance(PipelineState::Transcribing);
        let recognized = match WavPullSource::new(capture) {
            Ok(source) => self.transcriber.transcribe(Box::new(source)).await,
            Err(e) => Err(e),
        };
        let transcript = match recognized {
            Ok(text) => text,
            Err(e) => return self.fail(report, e, presenter),
        };
        presenter.success(&format!("Transcription: {transcript}"));
        report.transcript = Some(transcript.clone());

        // Completing
        self.advance(PipelineState::Completing);
        let completed = self.completer.complete(&transcript).await;
        let reply = match completed {
            Ok(reply) => reply,
            Err(e) => return self.fail(report, e, presenter),
        };
        presenter.reply(&reply);
        report.reply = Some(reply.clone());

        // Synthesizing
        self.advance(PipelineState::Synthesizing);
        let synthesized = self.synthesizer.synthesize(&reply).await;
        match synthesized {
            Ok(audio) => {
                if let Err(e) = presenter.play(&audio) {
                    tracing::warn!(error = %e, "playback failed");
                    presenter.error(&format!("Playback failed: {e}"));
                }
                report.audio = Some(audio);
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed; reply stays visible");
                presenter.error(&e.to_string());
                report.synthesis_failure = Some(e);
            }
        }

        self.advance(PipelineState::Done);
        report.state = self.state;
        report
    }

    fn fail<P>(&mut self, mut report: RunReport, error: Error, presenter: &mut P) -> RunReport
    where
        P: Presenter + ?Sized,
    {
        tracing::error!(stage = ?self.state, error = %error, "pipeline halted");
        presenter.error(&error.to_string());
        self.advance(PipelineState::Failed);
        report.state = self.state;
        report.failure = Some(error);
        report
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }
}
