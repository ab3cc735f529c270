//! Configuration loading and backend factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgate_core::admin::DEFAULT_ROOT_ADMIN;
use quizgate_core::traits::InsightGenerator;

use crate::anthropic::AnthropicGenerator;
use crate::gemini::{GeminiGenerator, DEFAULT_GEMINI_MODEL};
use crate::mock::MockGenerator;

/// Configuration for a single insight backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock {
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { response } => {
                f.debug_struct("Mock").field("response", response).finish()
            }
        }
    }
}

/// Top-level quizgate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgateConfig {
    /// Insight backends keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Backend used when none is named.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used when none is named.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Directory holding the JSON stores.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Admin that can never be removed from the whitelist.
    #[serde(default = "default_root_admin")]
    pub root_admin: String,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./quizgate-data")
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f64 {
    0.4
}
fn default_root_admin() -> String {
    DEFAULT_ROOT_ADMIN.to_string()
}

impl Default for QuizgateConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            data_dir: default_data_dir(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            root_admin: default_root_admin(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgate.toml` in the current directory
/// 2. `~/.config/quizgate/config.toml`
///
/// Environment variable overrides: `QUIZGATE_ANTHROPIC_KEY`, `QUIZGATE_GEMINI_KEY`.
pub fn load_config() -> Result<QuizgateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgateConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizgate.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgateConfig::default(),
    };

    apply_env_overrides(&mut config);

    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

/// Parse a TOML string into a config without touching the environment.
pub fn parse_config_str(content: &str) -> Result<QuizgateConfig> {
    Ok(toml::from_str::<QuizgateConfig>(content)?)
}

fn apply_env_overrides(config: &mut QuizgateConfig) {
    if let Ok(key) = std::env::var("QUIZGATE_ANTHROPIC_KEY") {
        let entry = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("QUIZGATE_GEMINI_KEY") {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgate"))
}

/// Create a backend instance from its configuration.
pub fn create_generator(config: &ProviderConfig) -> Result<Box<dyn InsightGenerator>> {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            Ok(Box::new(AnthropicGenerator::new(api_key, base_url.clone())?))
        }
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiGenerator::new(api_key, base_url.clone())?))
        }
        ProviderConfig::Mock { response } => Ok(Box::new(match response {
            Some(text) => MockGenerator::with_fixed_response(text),
            None => MockGenerator::default(),
        })),
    }
}

impl QuizgateConfig {
    /// Look up a named backend, falling back to `default_provider`.
    pub fn generator(&self, name: Option<&str>) -> Result<Box<dyn InsightGenerator>> {
        let name = name.unwrap_or(&self.default_provider);
        let provider = self.providers.get(name).with_context(|| {
            format!("provider '{name}' is not configured (add it to quizgate.toml)")
        })?;
        create_generator(provider)
    }
}

/// Starter config written by `quizgate init`.
pub const STARTER_CONFIG: &str = r#"# quizgate configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
data_dir = "./quizgate-data"
max_tokens = 1024
temperature = 0.4
root_admin = "tobita@kiryo.ac.jp"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.mock]
type = "mock"
"#;
