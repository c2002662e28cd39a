//! Client configuration.
//!
//! Settings are layered file → environment → CLI:
//!
//! ```toml
//! [api]
//! url = "http://localhost:8000"
//! token = "..."
//!
//! [stream]
//! reconnect_delay_ms = 3000
//! max_frame_bytes = 1048576
//!
//! [log]
//! format = "pretty"   # or "json"
//! ```
//!
//! The file is read from `$MISSION_CONTROL_CONFIG` when set, otherwise from
//! `<config dir>/mission-control/config.toml`. A missing default file is
//! not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::stream::frame::DEFAULT_MAX_FRAME_BYTES;
use crate::sync::StreamSettings;

pub const CONFIG_PATH_ENV: &str = "MISSION_CONTROL_CONFIG";
pub const API_URL_ENV: &str = "MISSION_CONTROL_API_URL";
pub const TOKEN_ENV: &str = "MISSION_CONTROL_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const REDACTED: &str = "********";

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSection {
    /// Backend base URL, without the `/api/v1` prefix
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Bearer token; without one the client is signed out
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSection {
    /// Fixed wait before reconnecting a dropped stream
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Cap on buffered, unterminated event data
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default)]
    pub format: LogFormat,
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub stream: StreamSection,
    #[serde(default)]
    pub log: LogSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values given on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Effective configuration after all layers are applied.
#[derive(Debug, Clone)]
pub struct MissionControlConfig {
    /// File the settings came from, if any was read
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl MissionControlConfig {
    /// `$MISSION_CONTROL_CONFIG`, else the per-user config directory.
    pub fn default_path() -> Option<PathBuf> {
        non_empty(std::env::var(CONFIG_PATH_ENV).ok())
            .map(PathBuf::from)
            .or_else(|| {
                dirs::config_dir().map(|dir| dir.join("mission-control").join("config.toml"))
            })
    }

    /// Load an explicitly requested file; it must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self {
            path: Some(path.to_path_buf()),
            file: ConfigFile::load(path)?,
        })
    }

    /// Load the default file if present, else built-in defaults.
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self {
                path: None,
                file: ConfigFile::default(),
            }),
        }
    }

    /// Full layering: file, process environment, then CLI.
    pub fn resolve(explicit_path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from(path)?,
            None => Self::discover()?,
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = non_empty(lookup(API_URL_ENV)) {
            self.file.api.url = url;
        }
        if let Some(token) = non_empty(lookup(TOKEN_ENV)) {
            self.file.api.token = Some(token);
        }
    }

    pub fn apply_cli(&mut self, cli: CliOverrides) {
        if let Some(url) = non_empty(cli.api_url) {
            self.file.api.url = url;
        }
        if let Some(token) = non_empty(cli.token) {
            self.file.api.token = Some(token);
        }
        if let Some(format) = cli.log_format {
            self.file.log.format = format;
        }
    }

    pub fn api_url(&self) -> &str {
        &self.file.api.url
    }

    pub fn log_format(&self) -> LogFormat {
        self.file.log.format
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            reconnect_delay: Duration::from_millis(self.file.stream.reconnect_delay_ms),
            max_frame_bytes: self.file.stream.max_frame_bytes,
        }
    }

    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.file.api.url, self.file.api.token.clone())
    }

    /// Warnings about settings that are accepted but probably wrong.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.file.api.token.is_none() {
            warnings.push(format!(
                "No API token configured; set {} or [api] token to sign in",
                TOKEN_ENV
            ));
        }
        if self.file.stream.reconnect_delay_ms == 0 {
            warnings.push(
                "stream.reconnect_delay_ms is 0; dropped streams will reconnect in a tight loop"
                    .to_string(),
            );
        }
        if self.file.stream.max_frame_bytes == 0 {
            warnings.push(
                "stream.max_frame_bytes is 0; every stream chunk will be discarded".to_string(),
            );
        }
        warnings
    }

    /// The effective settings as TOML, with the token masked.
    pub fn redacted(&self) -> Result<String> {
        let mut shown = self.file.clone();
        if shown.api.token.is_some() {
            shown.api.token = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn log_format_display_and_parse() {
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = ConfigFile::parse("").unwrap();
        assert_eq!(file.api.url, DEFAULT_API_URL);
        assert_eq!(file.api.token, None);
        assert_eq!(file.stream.reconnect_delay_ms, 3000);
        assert_eq!(file.stream.max_frame_bytes, 1024 * 1024);
        assert_eq!(file.log.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let file = ConfigFile::parse(
            r#"
            [api]
            token = "abc"

            [stream]
            reconnect_delay_ms = 500

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(file.api.url, DEFAULT_API_URL);
        assert_eq!(file.api.token.as_deref(), Some("abc"));
        assert_eq!(file.stream.reconnect_delay_ms, 500);
        assert_eq!(file.stream.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(file.log.format, LogFormat::Json);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(ConfigFile::parse("[api\nurl=").is_err());
        assert!(ConfigFile::parse("[log]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn layers_apply_file_then_env_then_cli() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nurl = \"http://file:1\"\ntoken = \"file-token\"\n").unwrap();

        let mut config = MissionControlConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url(), "http://file:1");

        config.apply_env_from(env(&[(API_URL_ENV, "http://env:2"), (TOKEN_ENV, "  ")]));
        assert_eq!(config.api_url(), "http://env:2");
        assert_eq!(config.file.api.token.as_deref(), Some("file-token"));

        config.apply_cli(CliOverrides {
            api_url: None,
            token: Some("cli-token".to_string()),
            log_format: Some(LogFormat::Json),
        });
        assert_eq!(config.api_url(), "http://env:2");
        assert_eq!(config.file.api.token.as_deref(), Some("cli-token"));
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(MissionControlConfig::load_from(&dir.path().join("nope.toml")).is_err());
        assert_eq!(
            ConfigFile::load_or_default(&dir.path().join("nope.toml")).unwrap(),
            ConfigFile::default()
        );
    }

    #[test]
    fn stream_settings_follow_file() {
        let config = MissionControlConfig {
            path: None,
            file: ConfigFile::parse("[stream]\nreconnect_delay_ms = 250\nmax_frame_bytes = 64")
                .unwrap(),
        };
        let settings = config.stream_settings();
        assert_eq!(settings.reconnect_delay, Duration::from_millis(250));
        assert_eq!(settings.max_frame_bytes, 64);
    }

    #[test]
    fn redacted_hides_token() {
        let mut config = MissionControlConfig {
            path: None,
            file: ConfigFile::default(),
        };
        config.file.api.token = Some("secret-value".to_string());
        let shown = config.redacted().unwrap();
        assert!(!shown.contains("secret-value"));
        assert!(shown.contains(REDACTED));
        assert!(shown.contains("reconnect_delay_ms = 3000"));
    }

    #[test]
    fn validate_flags_missing_token_and_zero_delay() {
        let mut config = MissionControlConfig {
            path: None,
            file: ConfigFile::default(),
        };
        config.file.stream.reconnect_delay_ms = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains(TOKEN_ENV));
    }
}
