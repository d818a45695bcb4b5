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
            apply_set(&mut settings, key, value)?;
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

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor).arg(&config_path).status();

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

/// Apply a dotted-key assignment to the settings tree.
fn apply_set(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "agent.model" => settings.agent.model = value.to_string(),
        "agent.system_prompt" => settings.agent.system_prompt = Some(value.to_string()),
        "agent.max_history_messages" => settings.agent.max_history_messages = value.parse()?,
        "backend.base_url" => settings.backend.base_url = value.to_string(),
        "backend.timeout_seconds" => settings.backend.timeout_seconds = value.parse()?,
        "server.host" => settings.server.host = value.to_string(),
        "server.port" => settings.server.port = value.parse()?,
        other => anyhow::bail!("Unknown configuration key: {}", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_set_known_keys() {
        let mut settings = Settings::default();
        apply_set(&mut settings, "agent.model", "gpt-4.1").unwrap();
        apply_set(&mut settings, "server.port", "9000").unwrap();
        assert_eq!(settings.agent.model, "gpt-4.1");
        assert_eq!(settings.server.port, 9000);
    }

    #[test]
    fn test_apply_set_rejects_unknown_key() {
        let mut settings = Settings::default();
        assert!(apply_set(&mut settings, "agent.mdoel", "x").is_err());
    }

    #[test]
    fn test_apply_set_rejects_bad_number() {
        let mut settings = Settings::default();
        assert!(apply_set(&mut settings, "server.port", "not-a-port").is_err());
    }
}
