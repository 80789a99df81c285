use crate::error::{CompanionError, Result};
use crate::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "companion.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Usually supplied through the environment rather than the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn has_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        model: "claude-sonnet-4-20250514".to_string(),
        base_url: "https://api.anthropic.com".to_string(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_openai() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        model: "gpt-4o".to_string(),
        base_url: "https://api.openai.com".to_string(),
        timeout_secs: default_timeout_secs(),
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_anthropic")]
    pub anthropic: ProviderConfig,
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Anthropic
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            anthropic: default_anthropic(),
            openai: default_openai(),
        }
    }
}

impl LlmConfig {
    pub fn provider(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::OpenAi => &self.openai,
        }
    }

    pub fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        match kind {
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::OpenAi => &mut self.openai,
        }
    }

    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::all()
            .iter()
            .copied()
            .filter(|k| self.provider(*k).has_key())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ServerConfig / DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Unset means artifacts are kept in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `companion.yaml` in the
    /// working directory if present, then apply environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(CompanionError::ConfigNotFound(p.display().to_string()));
                }
                Self::from_file(p)?
            }
            None => {
                let p = Path::new(DEFAULT_CONFIG_FILE);
                if p.exists() {
                    Self::from_file(p)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Overlay values from the environment. `lookup` is injected so tests
    /// can drive it without touching process state.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(port) = get("COMPANION_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid COMPANION_PORT"),
            }
        }
        if let Some(provider) = get("COMPANION_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.llm.default_provider = p,
                Err(e) => tracing::warn!("ignoring COMPANION_PROVIDER: {e}"),
            }
        }

        for (kind, prefix) in [
            (ProviderKind::Anthropic, "ANTHROPIC"),
            (ProviderKind::OpenAi, "OPENAI"),
        ] {
            let provider = self.llm.provider_mut(kind);
            if let Some(key) = get(&format!("{prefix}_API_KEY")) {
                provider.api_key = Some(key);
            }
            if let Some(model) = get(&format!("{prefix}_MODEL")) {
                provider.model = model;
            }
            if let Some(url) = get(&format!("{prefix}_BASE_URL")) {
                provider.base_url = url.trim_end_matches('/').to_string();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let configured = self.llm.configured();
        if configured.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "no LLM provider has an API key (set ANTHROPIC_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            });
        } else if !configured.contains(&self.llm.default_provider) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default provider '{}' has no API key; requests will fall back to '{}'",
                    self.llm.default_provider, configured[0]
                ),
            });
        } else if configured.len() == 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "only '{}' is configured; provider fallback is disabled",
                    configured[0]
                ),
            });
        }

        if self.llm.max_tokens == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "llm.max_tokens must be greater than zero".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "llm.temperature={} is outside the usual 0.0..=2.0 range",
                    self.llm.temperature
                ),
            });
        }

        for kind in ProviderKind::all() {
            let p = self.llm.provider(*kind);
            if !p.base_url.starts_with("http://") && !p.base_url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("llm.{}.base_url '{}' is not an http(s) URL", kind, p.base_url),
                });
            }
            if p.timeout_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("llm.{kind}.timeout_secs=0 disables the request timeout"),
                });
            }
        }

        if self.database.url.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "database.url is unset; generated artifacts are kept in memory only"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
