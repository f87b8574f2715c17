use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::translate::{ControllerSettings, TargetLanguage};

/// Environment variable consulted when the config carries no API key
pub const API_KEY_ENV: &str = "RAPIDAPI_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub translator_config: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Usually `${RAPIDAPI_KEY}`; never commit a literal key.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub default_target: TargetLanguage,
    #[serde(default = "default_input")]
    pub default_input: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    12393
}

fn default_endpoint() -> String {
    "https://text-translator2.p.rapidapi.com/translate".to_string()
}

fn default_api_host() -> String {
    "text-translator2.p.rapidapi.com".to_string()
}

fn default_debounce_ms() -> u64 {
    700
}

fn default_input() -> String {
    "Hello, how are you?".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_host: default_api_host(),
            api_key: None,
            debounce_ms: default_debounce_ms(),
            default_target: TargetLanguage::default(),
            default_input: default_input(),
        }
    }
}

impl TranslatorConfig {
    /// The API key from config, or from `RAPIDAPI_KEY` when the config has
    /// none (or still holds an unresolved `${...}` placeholder).
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            initial_input: self.default_input.clone(),
            initial_target: self.default_target,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = read_text_file(path)?;
        let content = substitute_env_vars(&content);

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON config: {}", path))?
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML config: {}", path))?
        };
        Ok(config)
    }
}

/// Replace `${VAR_NAME}` with the value of the environment variable.
/// Unset variables are left as-is.
pub fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("valid env var pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read a text file, tolerating a UTF-8 BOM and invalid sequences.
fn read_text_file(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read configuration file: {}", path))?;
    // decode() strips the BOM and replaces malformed input
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        tracing::warn!("Configuration file {} contains invalid UTF-8, replaced", path);
    }
    Ok(text.into_owned())
}
