//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `factify.toml` config file
//! 3. Defaults
//!
//! `${VAR_NAME}` references inside the config file are expanded from the
//! environment. Required keys are checked once at startup so a missing key
//! fails fast instead of surfacing as an upstream error on the first message.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default config file looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "factify.toml";

/// How the fact-check pipeline gathers evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Gemini searches Google itself via its built-in search tool
    #[default]
    Grounded,
    /// Serper is queried first and its results are injected into the prompt
    Search,
}

impl FromStr for CheckMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "grounded" => Ok(CheckMode::Grounded),
            "search" => Ok(CheckMode::Search),
            other => Err(Error::Config(format!(
                "Unknown FACTCHECK_MODE '{}': expected 'grounded' or 'search'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMode::Grounded => f.write_str("grounded"),
            CheckMode::Search => f.write_str("search"),
        }
    }
}

/// Gemini (generation service) configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// Base URL (optional, for custom endpoints and tests)
    pub base_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

/// Serper (search service) configuration
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// API key, only required in [`CheckMode::Search`]
    pub api_key: Option<String>,

    /// Base URL (optional, for custom endpoints and tests)
    pub base_url: Option<String>,
}

/// Twilio credentials
///
/// Loaded for completeness; replies go back synchronously as TwiML, so the
/// handler never calls the Twilio REST API with them.
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
}

impl TwilioConfig {
    /// Both credentials are present
    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some()
    }
}

/// Main configuration for factify
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub search: SearchConfig,
    pub twilio: TwilioConfig,
    pub mode: CheckMode,

    /// Port for the webhook server
    pub port: u16,

    /// Timeout applied to every upstream request
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            search: SearchConfig::default(),
            twilio: TwilioConfig::default(),
            mode: CheckMode::default(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default file if present, else from the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`Config::load`], looking for [`CONFIG_FILE`] in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Self::from_toml_file(path);
        }

        Self::from_env()
    }

    /// Load configuration from a TOML file
    ///
    /// Environment variables still take precedence over file values.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content, |key| std::env::var(key).ok())
    }

    /// Parse TOML content, expanding `${VAR}` references through `lookup`
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &lookup);

        let toml: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut config = Self::from_toml_config(toml)?;
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn from_toml_config(toml: TomlConfig) -> Result<Self> {
        let gemini = toml.gemini.unwrap_or_default();
        let search = toml.search.unwrap_or_default();
        let twilio = toml.twilio.unwrap_or_default();

        let mode = match toml.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => CheckMode::default(),
        };

        Ok(Config {
            gemini: GeminiConfig {
                api_key: gemini.api_key.unwrap_or_default(),
                model: gemini.model.filter(|m| !m.is_empty()).unwrap_or_else(default_model),
                base_url: gemini.base_url.filter(|u| !u.is_empty()),
            },
            search: SearchConfig {
                api_key: search.api_key.filter(|k| !k.is_empty()),
                base_url: search.base_url.filter(|u| !u.is_empty()),
            },
            twilio: TwilioConfig {
                account_sid: twilio.account_sid.filter(|s| !s.is_empty()),
                auth_token: twilio.auth_token.filter(|s| !s.is_empty()),
            },
            mode,
            port: toml.port.unwrap_or_else(default_port),
            request_timeout_secs: toml
                .request_timeout_secs
                .unwrap_or_else(default_request_timeout_secs),
        })
    }

    /// Override settings with any non-empty variables from `lookup`
    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(url) = var("GEMINI_BASE_URL") {
            self.gemini.base_url = Some(url);
        }

        if let Some(mode) = var("FACTCHECK_MODE") {
            self.mode = mode.parse()?;
        }

        if let Some(key) = var("SERPER_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Some(url) = var("SERPER_BASE_URL") {
            self.search.base_url = Some(url);
        }

        if let Some(sid) = var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = Some(sid);
        }
        if let Some(token) = var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = Some(token);
        }

        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", secs)))?;
        }

        Ok(())
    }

    /// Check required keys for the selected mode
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(Error::Config("GEMINI_API_KEY not set".to_string()));
        }

        if self.mode == CheckMode::Search && self.search.api_key.is_none() {
            return Err(Error::Config(
                "SERPER_API_KEY must be set when FACTCHECK_MODE=search".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Upstream request timeout
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Replace `${VAR_NAME}` with the value from `lookup`
///
/// Unknown variables expand to an empty string.
fn expand_env_vars<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }

            if let Some(env_value) = lookup(&var_name) {
                result.push_str(&env_value);
            }
        } else {
            result.push(c);
        }
    }

    result
}

// ============================================================================
// TOML file layout
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    mode: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
    gemini: Option<TomlGeminiConfig>,
    search: Option<TomlSearchConfig>,
    twilio: Option<TomlTwilioConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlGeminiConfig {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlSearchConfig {
    api_key: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlTwilioConfig {
    account_sid: Option<String>,
    auth_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g-key")])).unwrap();

        assert_eq!(config.gemini.api_key, "g-key");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert!(config.gemini.base_url.is_none());
        assert_eq!(config.mode, CheckMode::Grounded);
        assert_eq!(config.port, 5000);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.twilio.is_configured());
    }

    #[test]
    fn test_missing_gemini_key_fails() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_blank_gemini_key_fails() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_search_mode_requires_serper_key() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("FACTCHECK_MODE", "search"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));

        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("FACTCHECK_MODE", "search"),
            ("SERPER_API_KEY", "s-key"),
        ]))
        .unwrap();
        assert_eq!(config.mode, CheckMode::Search);
        assert_eq!(config.search.api_key.as_deref(), Some("s-key"));
    }

    #[test]
    fn test_unknown_mode_fails() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("FACTCHECK_MODE", "psychic"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("psychic"));
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_timeout_fails() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "45"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!(config.twilio.is_configured());
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout(), std::time::Duration::from_secs(45));
    }

    #[test]
    fn test_check_mode_parsing() {
        assert_eq!("grounded".parse::<CheckMode>().unwrap(), CheckMode::Grounded);
        assert_eq!(" SEARCH ".parse::<CheckMode>().unwrap(), CheckMode::Search);
        assert_eq!(CheckMode::Search.to_string(), "search");
    }

    #[test]
    fn test_check_mode_rejects_other_names() {
        for name in ["tool", "gemini", "serper", "rag", ""] {
            assert!(name.parse::<CheckMode>().is_err(), "accepted '{}'", name);
        }
    }

    #[test]
    fn test_expand_env_vars() {
        let vars = lookup(&[("FACTIFY_TEST_VAR", "test_value")]);

        let result = expand_env_vars("prefix_${FACTIFY_TEST_VAR}_suffix", &vars);
        assert_eq!(result, "prefix_test_value_suffix");

        let result = expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix", &vars);
        assert_eq!(result, "prefix__suffix");

        assert_eq!(expand_env_vars("no_vars_here", &vars), "no_vars_here");
        assert_eq!(expand_env_vars("${}_content", &vars), "_content");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
mode = "search"
port = 8080

[gemini]
api_key = "${GEMINI_KEY_FROM_ENV}"
model = "gemini-2.5-flash"

[search]
api_key = "serper_key"

[twilio]
account_sid = "AC123"
auth_token = "token"
"#;

        let config = Config::from_toml_str(
            toml_content,
            lookup(&[("GEMINI_KEY_FROM_ENV", "expanded_key")]),
        )
        .unwrap();

        assert_eq!(config.gemini.api_key, "expanded_key");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.mode, CheckMode::Search);
        assert_eq!(config.search.api_key.as_deref(), Some("serper_key"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.twilio.is_configured());
    }

    #[test]
    fn test_env_wins_over_toml() {
        let toml_content = r#"
port = 8080

[gemini]
api_key = "file_key"
"#;

        let config = Config::from_toml_str(
            toml_content,
            lookup(&[("GEMINI_API_KEY", "env_key"), ("PORT", "9090")]),
        )
        .unwrap();

        assert_eq!(config.gemini.api_key, "env_key");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_from_toml_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[gemini]\napi_key = \"disk_key\"\nmodel = \"gemini-from-file\"\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.gemini.model, "gemini-from-file");
        assert!(!config.gemini.api_key.is_empty());
    }

    #[test]
    fn test_load_from_prefers_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[gemini]\napi_key = \"disk_key\"\nmodel = \"gemini-from-file\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.gemini.model, "gemini-from-file");
    }

    #[test]
    fn test_load_from_falls_back_to_env_without_file() {
        let dir = tempfile::tempdir().unwrap();

        // Outcome depends on the process environment; the file must not be used
        match Config::load_from(dir.path()) {
            Ok(config) => assert_ne!(config.gemini.model, "gemini-from-file"),
            Err(err) => assert!(matches!(err, Error::Config(_))),
        }
    }

    #[test]
    fn test_missing_toml_file_is_config_error() {
        let err = Config::from_toml_file("/nonexistent/factify.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
