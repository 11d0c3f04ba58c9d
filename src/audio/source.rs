//! Pull-style PCM source over an in-memory WAV capture
//!
//! The recognizer drains the source with repeated `read` calls until it
//! returns an empty chunk. Chunks always hold whole frames so channel
//! interleaving stays aligned downstream.

use std::io::Cursor;

use super::{AudioCapture, AudioFormat};
use crate::{Error, Result};

/// Forward-only, single-pass byte source consumed by a speech engine
pub trait PullAudioSource: Send + Sync {
    /// PCM layout of the bytes returned by `read`
    fn format(&self) -> AudioFormat;

    /// Return the next chunk of at most `max_bytes`, trimmed to whole frames
    ///
    /// An empty chunk signals end of stream and repeats on every later call.
    fn read(&mut self, max_bytes: usize) -> Vec<u8>;

    /// Release the underlying buffer; safe to call more than once
    fn close(&mut self);
}

/// Serves the PCM frames of a WAV capture without touching disk
#[derive(Debug)]
pub struct WavPullSource {
    format: AudioFormat,
    data: Vec<u8>,
    position: usize,
    end: usize,
    closed: bool,
}

impl WavPullSource {
    /// Parse the container header once and position at the first frame
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedAudio` if the header cannot be parsed
    pub fn new(capture: AudioCapture) -> Result<Self> {
        let data = capture.into_bytes();

        let (spec, samples, data_start) = {
            let reader = hound::WavReader::new(Cursor::new(data.as_slice()))
                .map_err(|e| Error::MalformedAudio(e.to_string()))?;
            let spec = reader.spec();
            let samples = reader.len() as usize;
            let cursor = reader.into_inner();
            let data_start = usize::try_from(cursor.position())
                .map_err(|e| Error::MalformedAudio(e.to_string()))?;
            (spec, samples, data_start)
        };

        // Container width, not valid bits: extensible files may pad samples
        let sample_width = match data.get(..data_start).and_then(block_align) {
            Some(align) if spec.channels > 0 => align / spec.channels,
            _ => spec.bits_per_sample.div_ceil(8),
        };
        if spec.channels == 0 || sample_width == 0 {
            return Err(Error::MalformedAudio(format!(
                "unusable layout: {} channels, {} bits per sample",
                spec.channels, spec.bits_per_sample
            )));
        }

        let format = AudioFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            sample_width,
        };

        let declared = samples.saturating_mul(usize::from(sample_width));
        let end = data_start.saturating_add(declared).min(data.len());

        tracing::debug!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            sample_width = format.sample_width,
            pcm_bytes = end.saturating_sub(data_start),
            "parsed capture header"
        );

        Ok(Self {
            format,
            data,
            position: data_start,
            end,
            closed: false,
        })
    }

    /// Bytes not yet handed out (including any trailing partial frame)
    #[must_use]
    pub const fn remaining(&self) -> usize {
        if self.closed {
            0
        } else {
            self.end.saturating_sub(self.position)
        }
    }

    /// Whether `close` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

/// `nBlockAlign` from the `fmt ` chunk of a RIFF/WAVE header
fn block_align(header: &[u8]) -> Option<u16> {
    let mut pos = 12;
    while pos + 8 <= header.len() {
        let id = &header[pos..pos + 4];
        let size = u32::from_le_bytes(header[pos + 4..pos + 8].try_into().ok()?);
        let body = pos + 8;

        if id == b"fmt " {
            let field = header.get(body + 12..body + 14)?;
            return Some(u16::from_le_bytes([field[0], field[1]]));
        }

        // chunks are word aligned
        let size = usize::try_from(size).ok()?;
        pos = body.checked_add(size)?.checked_add(size & 1)?;
    }
    None
}

impl PullAudioSource for WavPullSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, max_bytes: usize) -> Vec<u8> {
        let frame = self.format.frame_size();
        let take = max_bytes.min(self.remaining()) / frame * frame;
        if take == 0 {
            return Vec::new();
        }

        let chunk = self.data[self.position..self.position + take].to_vec();
        self.position += take;
        chunk
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.data = Vec::new();
        tracing::trace!("audio source closed");
    }
}
