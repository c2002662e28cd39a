//! Configuration view and validation commands: `mission-control config`.

use anyhow::Result;
use console::style;

use mission_control::config::{API_URL_ENV, CONFIG_PATH_ENV, MissionControlConfig, TOKEN_ENV};
use mission_control::ui::icons::{CHECK, WARN};

use super::super::ConfigCommands;

pub fn cmd_config(config: &MissionControlConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Mission Control Configuration");
            println!("=============================");
            println!();

            match &config.path {
                Some(path) => println!("Config file: {}", path.display()),
                None => match MissionControlConfig::default_path() {
                    Some(path) => println!("No config file at {}; using defaults", path.display()),
                    None => println!("No config directory found; using defaults"),
                },
            }
            println!(
                "Overrides: {}, {}, {} (file), --api-url, --token",
                API_URL_ENV, TOKEN_ENV, CONFIG_PATH_ENV
            );
            println!();
            println!("{}", config.redacted()?);
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("{}Configuration is valid", CHECK);
            } else {
                for warning in &warnings {
                    println!("{}{}", WARN, style(warning).yellow());
                }
            }
        }
    }
    Ok(())
}
