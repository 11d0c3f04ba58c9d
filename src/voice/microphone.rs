//! Utterance recording from the default input device
//!
//! A [`Recording`] owns the live input stream. Finishing it stops the
//! device and encodes what was heard as a 16 kHz mono WAV [`AudioCapture`],
//! the same container a `--input` file provides.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::audio::AudioCapture;
use crate::{Error, Result};

/// Recording sample rate; the recognizer takes 16 kHz mono 16-bit PCM
pub const SAMPLE_RATE: u32 = 16000;

/// Default input device opened at [`SAMPLE_RATE`] mono
pub struct Microphone {
    device: Device,
    config: StreamConfig,
}

impl Microphone {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if there is no input device or it cannot record 16 kHz mono
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;
        let config = mono_input_config(&device)?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "microphone opened"
        );

        Ok(Self { device, config })
    }

    /// Start a recording; it runs until [`Recording::finish`] or drop
    ///
    /// # Errors
    ///
    /// Returns error if the input stream cannot be built or started
    pub fn record(&self) -> Result<Recording> {
        let heard = Arc::new(Mutex::new(Heard::default()));
        let sink = Arc::clone(&heard);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut heard) = sink.lock() {
                        heard.push(data);
                    }
                },
                |err| tracing::error!(error = %err, "microphone stream error"),
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        tracing::debug!("recording started");

        Ok(Recording { stream, heard })
    }

    /// Record until `wait` returns, then encode the utterance
    ///
    /// Returns `None` when nothing was heard.
    ///
    /// # Errors
    ///
    /// Returns error if the device fails, `wait` fails, or encoding fails
    pub fn record_utterance<F>(&self, wait: F) -> Result<Option<AudioCapture>>
    where
        F: FnOnce() -> Result<()>,
    {
        let recording = self.record()?;
        wait()?;
        recording.finish()
    }
}

fn mono_input_config(device: &Device) -> Result<StreamConfig> {
    let rate = SampleRate(SAMPLE_RATE);
    device
        .supported_input_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| c.channels() == 1 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
        .map(|c| c.with_sample_rate(rate).config())
        .ok_or_else(|| Error::Audio("no 16kHz mono input config found".to_string()))
}

/// Samples heard so far, plus the window not yet reported by `level`
#[derive(Default)]
struct Heard {
    samples: Vec<f32>,
    unmetered: usize,
}

impl Heard {
    fn push(&mut self, data: &[f32]) {
        self.samples.extend_from_slice(data);
        self.unmetered += data.len();
    }

    fn meter(&mut self) -> Level {
        let window = &self.samples[self.samples.len() - self.unmetered..];
        self.unmetered = 0;
        Level::of(window)
    }
}

/// Signal level of a block of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    /// Root-mean-square amplitude
    pub rms: f32,
    /// Largest absolute amplitude
    pub peak: f32,
}

impl Level {
    /// Measure a block of samples
    #[must_use]
    pub fn of(samples: &[f32]) -> Self {
        Self {
            rms: rms(samples),
            peak: samples.iter().map(|s| s.abs()).fold(0.0, f32::max),
        }
    }
}

/// A live input stream and everything it has heard
pub struct Recording {
    stream: Stream,
    heard: Arc<Mutex<Heard>>,
}

impl Recording {
    /// Level of the audio heard since the previous call
    #[must_use]
    pub fn level(&self) -> Level {
        self.heard
            .lock()
            .map_or(Level { rms: 0.0, peak: 0.0 }, |mut heard| heard.meter())
    }

    /// Stop the device and encode the utterance as WAV
    ///
    /// Returns `None` when nothing was heard.
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn finish(self) -> Result<Option<AudioCapture>> {
        drop(self.stream);

        let samples = self
            .heard
            .lock()
            .map(|mut heard| std::mem::take(&mut heard.samples))
            .unwrap_or_default();

        #[allow(clippy::cast_precision_loss)]
        let secs = samples.len() as f32 / SAMPLE_RATE as f32;
        tracing::debug!(samples = samples.len(), secs, "recording stopped");

        if samples.is_empty() {
            return Ok(None);
        }
        encode_wav(&samples, SAMPLE_RATE).map(Some)
    }
}

/// Encode f32 samples as a 16-bit mono WAV capture
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<AudioCapture> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let pcm = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(pcm)
            .map_err(|e| Error::Audio(e.to_string()))?;
    }
    writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;

    Ok(AudioCapture::new(cursor.into_inner()))
}

/// Root-mean-square level of a sample block
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
