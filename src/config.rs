use anyhow::{Result, anyhow};
use clap::Parser;

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Runtime settings. Every flag can also come from the environment (or `.env`).
#[derive(Parser, Debug, Clone)]
#[command(name = "navigator", version, about = "Screenshot + goal in, next UI action out")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "NAVIGATOR_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Gemini model used for navigation
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Falls back to GOOGLE_API_KEY when unset
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sampling temperature for the navigation model
    #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    /// Outbound model request timeout
    #[arg(long, env = "NAVIGATOR_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "NAVIGATOR_MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,

    /// Verbose logs
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::resolve_api_key`], reading fallbacks through `lookup`.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| non_empty(lookup("GOOGLE_API_KEY")))
            .ok_or_else(|| {
                anyhow!("GEMINI_API_KEY is not set. Configure it in .env or the environment.")
            })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::parse_from(["navigator", "--api-key", "test-key"])
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "navigator",
            "--bind",
            "127.0.0.1:9000",
            "--model",
            "gemini-2.5-flash",
            "--api-key",
            "  k  ",
            "--max-upload-mb",
            "5",
        ]);
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.resolve_api_key().unwrap(), "k");
        assert_eq!(config.max_upload_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn explicit_key_is_used() {
        let config = Config::for_tests();
        assert_eq!(config.resolve_api_key().unwrap(), "test-key");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn falls_back_to_google_api_key() {
        let config = Config::parse_from(["navigator", "--api-key", "  "]);
        let key = config
            .resolve_api_key_with(|k| (k == "GOOGLE_API_KEY").then(|| " g-key ".to_string()))
            .unwrap();
        assert_eq!(key, "g-key");
    }

    #[test]
    fn missing_key_is_an_error() {
        let config = Config::parse_from(["navigator", "--api-key", ""]);
        let err = config.resolve_api_key_with(|_| None).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY is not set"));

        let err = config
            .resolve_api_key_with(|_| Some("   ".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY is not set"));
    }
}
