//! Application settings, read from a TOML file:
//!
//! ```toml
//! [api]
//! api_key = "sk-..."
//! model_name = "gpt-4o-mini"
//! api_base = "https://api.openai.com/v1"
//!
//! [style]
//! font_name = "微软雅黑"
//! font_size = 12
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_FONT_NAME: &str = "微软雅黑";
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub style: StyleConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model_name: String,

    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_name: default_model(),
            api_base: default_api_base(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}

/// `[style]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// Points.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_size: default_font_size(),
        }
    }
}

fn default_font_name() -> String {
    DEFAULT_FONT_NAME.into()
}
fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_style_section_uses_defaults() {
        let config = AppConfig::parse(
            r#"
            [api]
            api_key = "k"
            model_name = "m"
            api_base = "http://localhost:8080/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.model_name, "m");
        assert_eq!(config.style.font_name, DEFAULT_FONT_NAME);
        assert_eq!(config.style.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(AppConfig::parse("[api"), Err(Error::Config(_))));
    }
}
