//! Captured utterances and the pull-style source fed to the recognizer

mod source;

pub use source::{PullAudioSource, WavPullSource};

/// One recorded utterance: an immutable WAV container buffer
///
/// Produced once per interaction by the presentation surface and consumed
/// by a single pipeline run. Never written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCapture {
    bytes: Vec<u8>,
}

impl AudioCapture {
    /// Wrap raw WAV bytes
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The container bytes, header included
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the container bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total buffer size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for AudioCapture {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// PCM layout parsed from a container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second per channel
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: u16,

    /// Bytes per sample
    pub sample_width: u16,
}

impl AudioFormat {
    /// Bytes per interleaved frame (one sample for every channel)
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        self.sample_width as usize * self.channels as usize
    }

    /// Content type announced to the recognizer for raw PCM of this format
    #[must_use]
    pub fn content_type(&self) -> String {
        format!(
            "audio/wav; codecs=audio/pcm; samplerate={}",
            self.sample_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_accounts_for_channels() {
        let stereo = AudioFormat {
            sample_rate: 48_000,
            channels: 2,
            sample_width: 2,
        };
        assert_eq!(stereo.frame_size(), 4);

        let mono24 = AudioFormat {
            sample_rate: 16_000,
            channels: 1,
            sample_width: 3,
        };
        assert_eq!(mono24.frame_size(), 3);
    }

    #[test]
    fn content_type_carries_rate() {
        let format = AudioFormat {
            sample_rate: 16_000,
            channels: 1,
            sample_width: 2,
        };
        assert_eq!(
            format.content_type(),
            "audio/wav; codecs=audio/pcm; samplerate=16000"
        );
    }
}
