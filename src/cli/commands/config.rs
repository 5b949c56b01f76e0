//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply one `key = value` assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "generation.model" => settings.generation.model = value.to_string(),
        "generation.max_output_tokens" => {
            settings.generation.max_output_tokens = value.parse()?;
        }
        "chat.model" => settings.chat.model = value.to_string(),
        "chat.history_window" => settings.chat.history_window = value.parse()?,
        "document.max_chars" => settings.document.max_chars = value.parse()?,
        "transcript.languages" => {
            settings.transcript.languages =
                value.split(',').map(|s| s.trim().to_string()).collect();
        }
        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),
        _ => {
            anyhow::bail!(
                "Unknown config key '{}'. Settable keys: generation.model, generation.max_output_tokens, chat.model, chat.history_window, document.max_chars, transcript.languages, prompts.custom_dir",
                key
            );
        }
    }
    Ok(())
}
