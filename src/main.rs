use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_loop::voice::{AudioPlayback, Microphone, PLAYBACK_SAMPLE_RATE, SAMPLE_RATE};
use voice_loop::{
    AudioCapture, CaptureSource, Config, SpeechToText, TerminalPresenter, TextToSpeech,
    WavPullSource, session,
};

/// Voice Loop - speak a question, hear the answer
#[derive(Parser)]
#[command(name = "voice-loop", version, about)]
struct Cli {
    /// Read the utterance from a WAV file instead of the microphone
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Exit after the first processed utterance
    #[arg(long)]
    once: bool,

    /// Process captures without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Report audio sizes instead of playing recording and reply
    #[arg(long, env = "VOICE_LOOP_NO_PLAYBACK")]
    no_playback: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Synthesize and play a sentence
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Transcribe a WAV file and print the text
    Transcribe {
        /// Path to a PCM WAV file
        file: PathBuf,
    },
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,voice_loop=info",
        1 => "info,voice_loop=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&text).await,
            Command::Transcribe { file } => transcribe_file(&file).await,
            Command::Setup => voice_loop::setup::run_setup(),
        };
    }

    let source = cli
        .input
        .map_or(CaptureSource::Microphone, CaptureSource::File);
    let presenter = TerminalPresenter::new(source)
        .with_auto_confirm(cli.yes)
        .with_playback(!cli.no_playback);

    let mut session = session::open(Config::load(), presenter)?;

    println!("Voice -> LLM -> Voice Assistant\n");
    println!(
        "Record a question, it will be transcribed by Azure, answered by OpenRouter, and spoken back.\n"
    );

    let runs = session.run(cli.once).await?;
    tracing::debug!(runs, "session ended");

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mic = Microphone::new()?;
    let recording = mic.record()?;

    println!("Sample rate: {SAMPLE_RATE} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let level = recording.level();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (level.rms * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            level.rms,
            level.peak,
            meter
        );
    }

    if let Some(capture) = recording.finish()? {
        println!("\nRecorded {} bytes of WAV", capture.len());
    }

    println!("---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let sample_rate = PLAYBACK_SAMPLE_RATE as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_samples = (sample_rate * 2.0) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), PLAYBACK_SAMPLE_RATE);
    playback.play(samples)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Synthesize a sentence with the configured voice and play it
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let tts = TextToSpeech::new(&config.speech);

    println!("Synthesizing speech with {}...", tts.voice());
    let mp3_data = tts.speak(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    AudioPlayback::new()?.play_mp3(&mp3_data)?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}

/// Run only the recognizer over a WAV file
async fn transcribe_file(path: &Path) -> anyhow::Result<()> {
    let config = Config::load()?;
    let capture = AudioCapture::new(std::fs::read(path)?);
    let source = WavPullSource::new(capture)?;

    let stt = SpeechToText::new(&config.speech);
    let text = stt.recognize(Box::new(source)).await?;
    println!("{text}");

    Ok(())
}
