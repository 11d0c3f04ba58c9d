//! Interactive first-run setup wizard (`voice-loop setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Input, Password};

use crate::config::file::{
    ApiKeysFileConfig, LlmFileConfig, SpeechFileConfig, VoiceLoopConfigFile, config_file_path,
    load_config_file,
};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Voice Loop Setup\n");

    let existing = load_config_file();
    let config_path =
        config_file_path().unwrap_or_else(|| PathBuf::from("~/.config/voice-loop/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Credentials
    let openrouter = prompt_secret(
        "OpenRouter API key",
        "OPENROUTER_API_KEY",
        existing.api_keys.openrouter,
    )?;
    let azure_speech = prompt_secret(
        "Azure Speech key",
        "AZURE_SPEECH_KEY",
        existing.api_keys.azure_speech,
    )?;

    // 2. Region
    let mut region_input = Input::<String>::new().with_prompt("Azure Speech region");
    if let Some(region) = existing.speech.region.clone() {
        region_input = region_input.default(region);
    }
    let region: String = region_input.interact_text()?;

    // 3. Model and voice
    let model: String = Input::new()
        .with_prompt("LLM model")
        .default(
            existing
                .llm
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
        )
        .interact_text()?;

    let voice: String = Input::new()
        .with_prompt("Synthesis voice")
        .default(
            existing
                .speech
                .voice
                .clone()
                .unwrap_or_else(|| "en-US-AvaNeural".to_string()),
        )
        .interact_text()?;

    let config_file = VoiceLoopConfigFile {
        llm: LlmFileConfig {
            model: Some(model),
            ..existing.llm
        },
        speech: SpeechFileConfig {
            region: Some(region),
            voice: Some(voice),
            ..existing.speech
        },
        api_keys: ApiKeysFileConfig {
            openrouter,
            azure_speech,
        },
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `voice-loop` to start.");

    Ok(())
}

/// Ask for a key, keeping the existing one when left blank
fn prompt_secret(
    label: &str,
    env_hint: &str,
    existing: Option<String>,
) -> anyhow::Result<Option<String>> {
    let prompt = existing.as_deref().map_or_else(
        || format!("{label} ({env_hint})"),
        |k| format!("{label} (current: {}, leave blank to keep)", mask(k)),
    );

    let input = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;

    Ok(if input.is_empty() { existing } else { Some(input) })
}

/// Show only the ends of a key
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &VoiceLoopConfigFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}
