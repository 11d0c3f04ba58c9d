//! Voice I/O
//!
//! Azure Speech recognition and synthesis clients, plus local microphone
//! recording and speaker playback for the terminal front end.

mod microphone;
mod playback;
mod stt;
mod tts;

pub use microphone::{Level, Microphone, Recording, SAMPLE_RATE, encode_wav, rms};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, decode_mp3, decode_wav};
pub use stt::{RecognitionStatus, STREAM_CHUNK_BYTES, SpeechToText};
pub use tts::{OUTPUT_FORMAT, TextToSpeech};
