//! Shared test utilities
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use voice_loop::config::file::VoiceLoopConfigFile;
use voice_loop::{
    AudioCapture, Completer, Config, Error, Pipeline, Presenter, PullAudioSource, Result,
    Synthesizer, Transcriber,
};

pub const TEST_SAMPLE_RATE: u32 = 16_000;

/// Generate a quiet 16-bit tone
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn tone_samples(count: usize) -> Vec<i16> {
    (0..count)
        .map(|i| {
            let t = i as f32 / TEST_SAMPLE_RATE as f32;
            ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 8_000.0) as i16
        })
        .collect()
}

/// Encode mono 16-bit samples as a WAV file
pub fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for sample in samples {
            writer.write_sample(*sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Raw little-endian PCM for the same samples
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Half a second of tone wrapped as a capture
pub fn utterance() -> AudioCapture {
    AudioCapture::new(wav_bytes(TEST_SAMPLE_RATE, &tone_samples(8_000)))
}

/// Build configuration from literal env pairs, ignoring the process env
pub fn config_with(vars: &[(&str, &str)]) -> Result<Config> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Config::from_sources(|key| vars.get(key).cloned(), VoiceLoopConfigFile::default())
}

/// Credentials plus every endpoint pointed at one local server
pub fn local_config(base: &str) -> Config {
    let stt = format!("{base}/stt");
    let tts = format!("{base}/tts");
    config_with(&[
        ("OPENROUTER_API_KEY", "or-test-key"),
        ("AZURE_SPEECH_KEY", "speech-test-key"),
        ("AZURE_SPEECH_REGION", "testregion"),
        ("OPENROUTER_BASE_URL", base),
        ("AZURE_STT_ENDPOINT", &stt),
        ("AZURE_TTS_ENDPOINT", &tts),
    ])
    .expect("complete config")
}

/// Something the presenter was asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Captured(usize),
    Reviewed(usize),
    Triggered(bool),
    Status(String),
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    Played(usize),
}

/// Presenter that replays canned captures and records everything shown
pub struct RecordingPresenter {
    captures: VecDeque<AudioCapture>,
    confirm: bool,
    fail_playback: bool,
    fail_review: bool,
    log: Arc<Mutex<Vec<Shown>>>,
    capture_calls: Arc<AtomicUsize>,
}

impl RecordingPresenter {
    pub fn new(captures: Vec<AudioCapture>) -> Self {
        Self {
            captures: captures.into(),
            confirm: true,
            fail_playback: false,
            fail_review: false,
            log: Arc::default(),
            capture_calls: Arc::default(),
        }
    }

    pub fn declining(mut self) -> Self {
        self.confirm = false;
        self
    }

    pub fn with_broken_speaker(mut self) -> Self {
        self.fail_playback = true;
        self
    }

    pub fn with_unplayable_recordings(mut self) -> Self {
        self.fail_review = true;
        self
    }

    /// Shared handle to the message log
    pub fn log(&self) -> Arc<Mutex<Vec<Shown>>> {
        Arc::clone(&self.log)
    }

    /// Shared handle to the capture call counter
    pub fn capture_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.capture_calls)
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, shown: Shown) {
        self.log.lock().unwrap().push(shown);
    }
}

impl Presenter for RecordingPresenter {
    fn capture(&mut self) -> Result<Option<AudioCapture>> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        let capture = self.captures.pop_front();
        if let Some(capture) = &capture {
            self.push(Shown::Captured(capture.len()));
        }
        Ok(capture)
    }

    fn review(&mut self, capture: &AudioCapture) -> Result<()> {
        if self.fail_review {
            return Err(Error::Audio("no output device".to_string()));
        }
        self.push(Shown::Reviewed(capture.len()));
        Ok(())
    }

    fn confirm_processing(&mut self) -> bool {
        self.push(Shown::Triggered(self.confirm));
        self.confirm
    }

    fn play(&mut self, audio: &[u8]) -> Result<()> {
        if self.fail_playback {
            return Err(Error::Audio("no output device".to_string()));
        }
        self.push(Shown::Played(audio.len()));
        Ok(())
    }

    fn status(&mut self, message: &str) {
        self.push(Shown::Status(message.to_string()));
    }

    fn info(&mut self, message: &str) {
        self.push(Shown::Info(message.to_string()));
    }

    fn success(&mut self, message: &str) {
        self.push(Shown::Success(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.push(Shown::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.push(Shown::Error(message.to_string()));
    }
}

/// Transcriber that drains the source, then answers with a canned outcome
pub struct FakeTranscriber {
    outcome: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
    pulled: Arc<AtomicUsize>,
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, mut source: Box<dyn PullAudioSource>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        loop {
            let chunk = source.read(3200);
            if chunk.is_empty() {
                break;
            }
            self.pulled.fetch_add(chunk.len(), Ordering::SeqCst);
        }
        source.close();
        self.outcome.clone().map_err(Error::Transcription)
    }
}

pub struct FakeCompleter {
    outcome: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Completer for FakeCompleter {
    async fn complete(&self, text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(text.to_string());
        self.outcome.clone().map_err(Error::Completion)
    }
}

pub struct FakeSynthesizer {
    outcome: std::result::Result<Vec<u8>, String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(Error::Synthesis)
    }
}

/// Call counters for a pipeline assembled from fakes
#[derive(Clone, Default)]
pub struct Calls {
    pub transcribe: Arc<AtomicUsize>,
    pub pulled_bytes: Arc<AtomicUsize>,
    pub complete: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub synthesize: Arc<AtomicUsize>,
}

impl Calls {
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.transcribe.load(Ordering::SeqCst),
            self.complete.load(Ordering::SeqCst),
            self.synthesize.load(Ordering::SeqCst),
        )
    }
}

/// Canned outcome for each stage of a fake pipeline
pub struct Script {
    pub transcript: std::result::Result<&'static str, &'static str>,
    pub reply: std::result::Result<&'static str, &'static str>,
    pub audio: std::result::Result<&'static [u8], &'static str>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            transcript: Ok("what is the capital of France"),
            reply: Ok("Paris"),
            audio: Ok(&b"ID3-fake-mp3"[..]),
        }
    }
}

pub fn fake_pipeline(script: Script) -> (Pipeline, Calls) {
    let calls = Calls::default();

    let transcriber = FakeTranscriber {
        outcome: script.transcript.map(str::to_string).map_err(str::to_string),
        calls: Arc::clone(&calls.transcribe),
        pulled: Arc::clone(&calls.pulled_bytes),
    };
    let completer = FakeCompleter {
        outcome: script.reply.map(str::to_string).map_err(str::to_string),
        calls: Arc::clone(&calls.complete),
        prompts: Arc::clone(&calls.prompts),
    };
    let synthesizer = FakeSynthesizer {
        outcome: script.audio.map(<[u8]>::to_vec).map_err(str::to_string),
        calls: Arc::clone(&calls.synthesize),
    };

    let pipeline = Pipeline::new(
        Box::new(transcriber),
        Box::new(completer),
        Box::new(synthesizer),
    );
    (pipeline, calls)
}
