//! Voice Loop - single-turn voice assistant
//!
//! Captures one spoken utterance, transcribes it with Azure Speech, answers it
//! through an `OpenRouter` chat completion, and speaks the reply back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Presenter (terminal)                 │
//! │   capture  │  "Send to LLM?"  │  messages  │  play   │
//! └────────────────────────┬─────────────────────────────┘
//!                          │ AudioCapture (WAV bytes)
//! ┌────────────────────────▼─────────────────────────────┐
//! │                      Pipeline                        │
//! │  WavPullSource ─▶ SpeechToText ─▶ ChatCompletion ─▶  │
//! │                                    TextToSpeech      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Runs are strictly sequential; each stage is awaited before the next
//! starts and nothing is kept between runs.

pub mod audio;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod presenter;
pub mod session;
pub mod setup;
pub mod voice;

pub use audio::{AudioCapture, AudioFormat, PullAudioSource, WavPullSource};
pub use config::Config;
pub use error::{Error, Result};
pub use llm::ChatCompletion;
pub use pipeline::{Completer, Pipeline, PipelineState, RunReport, Synthesizer, Transcriber};
pub use presenter::{CaptureSource, Presenter, TerminalPresenter};
pub use session::{Interaction, Session};
pub use voice::{SpeechToText, TextToSpeech};
