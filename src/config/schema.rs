use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

/// Top-level lingobridge configuration, loaded from `config.toml`.
///
/// Resolution order: `--config-dir` / `LINGOBRIDGE_CONFIG_DIR` → `~/.lingobridge/config.toml`.
/// The file is optional; every field has a default and the credentials are
/// normally supplied through environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// API key for the chat-completion provider.
    /// Overridden by `LINGOBRIDGE_API_KEY` or `OPENAI_API_KEY`.
    /// When absent the assistant path is disabled.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override for the provider API (e.g. a self-hosted OpenAI-compatible endpoint).
    #[serde(default)]
    pub api_url: Option<String>,
    /// Provider ID (`"openai"` or `"custom:<url>"`). Default: `"openai"`.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for both assistant answers and AI translation. Default: `"gpt-4o-mini"`.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Model temperature (0.0–2.0). Default: `0.7`.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    /// LINE Messaging API credentials and endpoint (`[line]`).
    #[serde(default)]
    pub line: LineConfig,

    /// Gateway server configuration: host, port, body limit (`[gateway]`).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Assistant trigger keywords (`[assistant]`).
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Translation backend settings (`[translation]`).
    #[serde(default)]
    pub translation: TranslationConfig,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

// ── LINE ─────────────────────────────────────────────────────────

/// LINE Messaging API configuration (`[line]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Channel access token. Overridden by `LINE_CHANNEL_ACCESS_TOKEN`.
    #[serde(default)]
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify `X-Line-Signature`. Overridden by `LINE_CHANNEL_SECRET`.
    #[serde(default)]
    pub channel_secret: Option<String>,
    /// API base URL (default: `https://api.line.me`)
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    /// Skip events sent by the bot itself (default: true)
    #[serde(default = "default_true")]
    pub skip_own_messages: bool,
}

fn default_line_api_base() -> String {
    "https://api.line.me".into()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
            skip_own_messages: true,
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────

/// Gateway server configuration (`[gateway]` section).
///
/// Controls the HTTP listener for the webhook and health endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 5000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 0.0.0.0)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Maximum accepted webhook body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_host() -> String {
    "0.0.0.0".into()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ── Assistant ────────────────────────────────────────────────────

/// Assistant configuration (`[assistant]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Message prefixes that switch routing to the AI assistant.
    /// Matched case-insensitively at the start of the message.
    #[serde(default = "default_triggers")]
    pub triggers: Vec<String>,
}

fn default_triggers() -> Vec<String> {
    vec!["看護助理".into(), "asisten perawat".into()]
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            triggers: default_triggers(),
        }
    }
}

// ── Translation ──────────────────────────────────────────────────

/// Translation configuration (`[translation]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Base URL of the Google translate endpoint.
    #[serde(default = "default_translation_api_base")]
    pub api_base: String,
    /// Try an AI translation first and fall back to the plain translator.
    /// Only effective when an API key is configured.
    #[serde(default = "default_true")]
    pub use_ai: bool,
}

fn default_translation_api_base() -> String {
    "https://translate.googleapis.com".into()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_base: default_translation_api_base(),
            use_ai: true,
        }
    }
}

// ── Config impl ──────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        let config_dir = default_config_dir().unwrap_or_else(|_| PathBuf::from(".lingobridge"));

        Self {
            config_path: config_dir.join("config.toml"),
            api_key: None,
            api_url: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            line: LineConfig::default(),
            gateway: GatewayConfig::default(),
            assistant: AssistantConfig::default(),
            translation: TranslationConfig::default(),
        }
    }
}

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".lingobridge"))
}

fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(custom_config_dir) = std::env::var("LINGOBRIDGE_CONFIG_DIR") {
        let trimmed = custom_config_dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    default_config_dir()
}

fn non_empty(value: Option<&str>) -> bool {
    value.map(str::trim).is_some_and(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from `config_dir` (or the resolved default) and apply env overrides.
    ///
    /// Does not validate: commands that need credentials call [`Config::validate`].
    pub async fn load(config_dir: Option<&Path>) -> Result<Self> {
        let config_dir = resolve_config_dir(config_dir)?;
        let mut config = Self::load_from_path(&config_dir.join("config.toml")).await?;
        config.apply_env_overrides();
        tracing::info!(
            path = %config.config_path.display(),
            ai_enabled = config.ai_enabled(),
            "Config loaded"
        );
        Ok(config)
    }

    /// Read `path` if it exists, otherwise start from defaults. No env overrides, no validation.
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Whether the assistant path (and AI translation) can run.
    pub fn ai_enabled(&self) -> bool {
        non_empty(self.api_key.as_deref())
    }

    /// AI translation requested in config and actually possible.
    pub fn ai_translation_enabled(&self) -> bool {
        self.translation.use_ai && self.ai_enabled()
    }

    /// Validate configuration values that would cause runtime failures.
    ///
    /// Missing LINE credentials are fatal: the gateway must not start serving
    /// traffic it cannot verify or answer.
    pub fn validate(&self) -> Result<()> {
        if !non_empty(self.line.channel_access_token.as_deref()) {
            anyhow::bail!("LINE channel access token is not set (LINE_CHANNEL_ACCESS_TOKEN)");
        }
        if !non_empty(self.line.channel_secret.as_deref()) {
            anyhow::bail!("LINE channel secret is not set (LINE_CHANNEL_SECRET)");
        }
        if self.gateway.host.trim().is_empty() {
            anyhow::bail!("gateway.host must not be empty");
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            anyhow::bail!(
                "default_temperature must be between 0.0 and 2.0 (got {})",
                self.default_temperature
            );
        }
        if self.default_model.trim().is_empty() {
            anyhow::bail!("default_model must not be empty");
        }
        if !self.assistant.triggers.iter().any(|t| !t.trim().is_empty()) {
            anyhow::bail!("assistant.triggers must contain at least one non-empty keyword");
        }
        Ok(())
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("LINE_CHANNEL_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.line.channel_access_token = Some(token.trim().to_string());
            }
        }

        if let Ok(secret) = std::env::var("LINE_CHANNEL_SECRET") {
            if !secret.trim().is_empty() {
                self.line.channel_secret = Some(secret.trim().to_string());
            }
        }

        // API Key: LINGOBRIDGE_API_KEY or OPENAI_API_KEY
        if let Ok(key) =
            std::env::var("LINGOBRIDGE_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
        {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(url) = std::env::var("LINGOBRIDGE_API_URL") {
            if !url.trim().is_empty() {
                self.api_url = Some(url.trim().to_string());
            }
        }

        if let Ok(provider) = std::env::var("LINGOBRIDGE_PROVIDER") {
            if !provider.trim().is_empty() {
                self.default_provider = provider.trim().to_string();
            }
        }

        // Model: LINGOBRIDGE_MODEL or MODEL
        if let Ok(model) = std::env::var("LINGOBRIDGE_MODEL").or_else(|_| std::env::var("MODEL")) {
            if !model.trim().is_empty() {
                self.default_model = model.trim().to_string();
            }
        }

        if let Ok(temp_str) = std::env::var("LINGOBRIDGE_TEMPERATURE") {
            if let Ok(temp) = temp_str.trim().parse::<f64>() {
                if (0.0..=2.0).contains(&temp) {
                    self.default_temperature = temp;
                }
            }
        }

        // Gateway port: LINGOBRIDGE_GATEWAY_PORT or PORT
        if let Ok(port_str) =
            std::env::var("LINGOBRIDGE_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
        {
            if let Ok(port) = port_str.trim().parse::<u16>() {
                self.gateway.port = port;
            }
        }

        // Gateway host: LINGOBRIDGE_GATEWAY_HOST or HOST
        if let Ok(host) =
            std::env::var("LINGOBRIDGE_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
        {
            if !host.trim().is_empty() {
                self.gateway.host = host.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var("LINGOBRIDGE_TRIGGERS") {
            let triggers: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if !triggers.is_empty() {
                self.assistant.triggers = triggers;
            }
        }

        if let Ok(flag) = std::env::var("LINGOBRIDGE_AI_TRANSLATION") {
            if let Some(enabled) = parse_flag(&flag) {
                self.translation.use_ai = enabled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Env vars are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    const ENV_KEYS: &[&str] = &[
        "LINE_CHANNEL_ACCESS_TOKEN",
        "LINE_CHANNEL_SECRET",
        "LINGOBRIDGE_API_KEY",
        "OPENAI_API_KEY",
        "LINGOBRIDGE_API_URL",
        "LINGOBRIDGE_PROVIDER",
        "LINGOBRIDGE_MODEL",
        "MODEL",
        "LINGOBRIDGE_TEMPERATURE",
        "LINGOBRIDGE_GATEWAY_PORT",
        "PORT",
        "LINGOBRIDGE_GATEWAY_HOST",
        "HOST",
        "LINGOBRIDGE_TRIGGERS",
        "LINGOBRIDGE_AI_TRANSLATION",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.line.channel_access_token = Some("line-token".into());
        config.line.channel_secret = Some("line-secret".into());
        config
    }

    #[test]
    fn defaults_are_sensible() {
        let c = Config::default();
        assert_eq!(c.default_provider, "openai");
        assert_eq!(c.gateway.port, 5000);
        assert_eq!(c.gateway.host, "0.0.0.0");
        assert_eq!(c.line.api_base, "https://api.line.me");
        assert!(c.line.skip_own_messages);
        assert!(c.translation.use_ai);
        assert!(c.assistant.triggers.contains(&"看護助理".to_string()));
        assert!(!c.ai_enabled());
    }

    #[test]
    fn validate_requires_line_credentials() {
        let mut c = valid_config();
        assert!(c.validate().is_ok());

        c.line.channel_access_token = None;
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("LINE_CHANNEL_ACCESS_TOKEN"));

        let mut c = valid_config();
        c.line.channel_secret = Some("   ".into());
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("LINE_CHANNEL_SECRET"));
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let mut c = valid_config();
        c.default_temperature = 2.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_triggers() {
        let mut c = valid_config();
        c.assistant.triggers = vec!["  ".into()];
        assert!(c.validate().is_err());
    }

    #[test]
    fn ai_enabled_follows_api_key() {
        let mut c = valid_config();
        assert!(!c.ai_enabled());
        assert!(!c.ai_translation_enabled());

        c.api_key = Some(String::new());
        assert!(!c.ai_enabled());

        c.api_key = Some("sk-test".into());
        assert!(c.ai_enabled());
        assert!(c.ai_translation_enabled());

        c.translation.use_ai = false;
        assert!(!c.ai_translation_enabled());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
default_model = "gpt-4o"

[gateway]
port = 8080

[assistant]
triggers = ["helper"]
"#,
        )
        .unwrap();
        assert_eq!(parsed.default_model, "gpt-4o");
        assert_eq!(parsed.default_provider, "openai");
        assert_eq!(parsed.gateway.port, 8080);
        assert_eq!(parsed.gateway.host, "0.0.0.0");
        assert_eq!(parsed.assistant.triggers, vec!["helper".to_string()]);
        assert!(parsed.translation.use_ai);
    }

    #[tokio::test]
    async fn load_from_path_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "[line]\nchannel_access_token = \"tok\"\nchannel_secret = \"sec\"\n",
        )
        .await
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.line.channel_access_token.as_deref(), Some("tok"));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn load_from_path_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert!(config.line.channel_secret.is_none());
    }

    #[tokio::test]
    async fn load_from_path_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "gateway = [not valid").await.unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_apply() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("LINE_CHANNEL_ACCESS_TOKEN", " env-token ");
        std::env::set_var("LINE_CHANNEL_SECRET", "env-secret");
        std::env::set_var("OPENAI_API_KEY", "sk-env");
        std::env::set_var("PORT", "9090");
        std::env::set_var("LINGOBRIDGE_MODEL", "gpt-4.1-mini");
        std::env::set_var("LINGOBRIDGE_TRIGGERS", "助理, bantu ,");
        std::env::set_var("LINGOBRIDGE_AI_TRANSLATION", "off");

        let mut c = Config::default();
        c.apply_env_overrides();
        clear_env();

        assert_eq!(c.line.channel_access_token.as_deref(), Some("env-token"));
        assert_eq!(c.line.channel_secret.as_deref(), Some("env-secret"));
        assert_eq!(c.api_key.as_deref(), Some("sk-env"));
        assert_eq!(c.gateway.port, 9090);
        assert_eq!(c.default_model, "gpt-4.1-mini");
        assert_eq!(c.assistant.triggers, vec!["助理".to_string(), "bantu".to_string()]);
        assert!(!c.translation.use_ai);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn prefixed_env_wins_over_generic() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("LINGOBRIDGE_API_KEY", "sk-prefixed");
        std::env::set_var("OPENAI_API_KEY", "sk-generic");
        std::env::set_var("LINGOBRIDGE_GATEWAY_PORT", "7000");
        std::env::set_var("PORT", "7001");

        let mut c = Config::default();
        c.apply_env_overrides();
        clear_env();

        assert_eq!(c.api_key.as_deref(), Some("sk-prefixed"));
        assert_eq!(c.gateway.port, 7000);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("LINGOBRIDGE_TEMPERATURE", "9.5");
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("LINGOBRIDGE_AI_TRANSLATION", "maybe");

        let mut c = Config::default();
        c.apply_env_overrides();
        clear_env();

        assert!((c.default_temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(c.gateway.port, 5000);
        assert!(c.translation.use_ai);
    }

    #[tokio::test]
    async fn load_reads_explicit_dir_then_env() {
        let _guard = env_lock();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("config.toml"),
            "default_model = \"from-file\"\n[line]\nchannel_secret = \"file-secret\"\n",
        )
        .await
        .unwrap();
        std::env::set_var("LINE_CHANNEL_SECRET", "env-secret");

        let config = Config::load(Some(dir.path())).await.unwrap();
        clear_env();

        assert_eq!(config.config_path, dir.path().join("config.toml"));
        assert_eq!(config.default_model, "from-file");
        assert_eq!(config.line.channel_secret.as_deref(), Some("env-secret"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("sometimes"), None);
    }
}
