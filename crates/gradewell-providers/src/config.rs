//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gradewell_core::grading::{Grader, GraderConfig};
use gradewell_core::prompt::PromptOptions;
use gradewell_core::traits::LlmProvider;

use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single remote grading provider.
///
/// Debug is implemented by hand so API keys never reach the logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl ProviderConfig {
    /// Whether this provider has what it needs to make a call.
    pub fn has_credentials(&self) -> bool {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::OpenAI { api_key, .. } => {
                !api_key.trim().is_empty()
            }
            ProviderConfig::Ollama { .. } => true,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level gradewell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradewellConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for grading.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature (0.0 keeps grading repeatable).
    #[serde(default)]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_school_name")]
    pub school_name: String,
    #[serde(default = "default_feedback_language")]
    pub feedback_language: String,
    /// Where the portal keeps its slots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    GraderConfig::default().model
}
fn default_max_tokens() -> u32 {
    GraderConfig::default().max_tokens
}
fn default_timeout() -> u64 {
    60
}
fn default_school_name() -> String {
    PromptOptions::default().school_name
}
fn default_feedback_language() -> String {
    PromptOptions::default().feedback_language
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./gradewell-data")
}

impl Default for GradewellConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            school_name: default_school_name(),
            feedback_language: default_feedback_language(),
            data_dir: default_data_dir(),
        }
    }
}

impl GradewellConfig {
    /// Grader settings derived from this configuration.
    pub fn grader_config(&self) -> GraderConfig {
        GraderConfig {
            model: self.default_model.clone(),
            temperature: self.default_temperature,
            max_tokens: self.max_tokens,
            prompt: PromptOptions {
                school_name: self.school_name.clone(),
                feedback_language: self.feedback_language.clone(),
            },
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradewell.toml` in the current directory
/// 2. `~/.config/gradewell/config.toml`
///
/// Environment variable overrides: `GRADEWELL_GEMINI_KEY`, `GRADEWELL_OPENAI_KEY`.
pub fn load_config() -> Result<GradewellConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradewellConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("gradewell.toml");
            if local.exists() {
                Some(local)
            } else {
                config_home()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradewellConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradewellConfig::default(),
    };

    if let Ok(key) = std::env::var("GRADEWELL_GEMINI_KEY") {
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

    if let Ok(key) = std::env::var("GRADEWELL_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradewell"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig, timeout_secs: u64) -> Result<Box<dyn LlmProvider>> {
    Ok(match config {
        ProviderConfig::Gemini { api_key, base_url } => Box::new(
            GeminiProvider::new(api_key, base_url.clone())?.with_timeout(timeout_secs)?,
        ),
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(
            OpenAiProvider::new(api_key, base_url.clone(), org_id.clone())?
                .with_timeout(timeout_secs)?,
        ),
        ProviderConfig::Ollama { base_url } => {
            Box::new(OllamaProvider::new(base_url)?.with_timeout(timeout_secs)?)
        }
    })
}

/// Build the grader the application should use.
///
/// Without a usable provider (none configured, or its key is empty) the
/// grader runs offline and every submission is graded locally.
pub fn build_grader(config: &GradewellConfig, offline: bool) -> Result<Grader> {
    let grader_config = config.grader_config();
    if offline {
        return Ok(Grader::offline(grader_config));
    }

    let name = &config.default_provider;
    match config.providers.get(name) {
        Some(provider) if provider.has_credentials() => {
            let provider: Arc<dyn LlmProvider> =
                Arc::from(create_provider(provider, config.timeout_secs)?);
            debug!(provider = name.as_str(), model = %grader_config.model, "remote grading enabled");
            Ok(Grader::new(provider, grader_config))
        }
        Some(_) => {
            warn!(provider = name.as_str(), "provider has no API key, grading offline");
            Ok(Grader::offline(grader_config))
        }
        None => {
            warn!(provider = name.as_str(), "provider is not configured, grading offline");
            Ok(Grader::offline(grader_config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GRADEWELL_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GRADEWELL_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GRADEWELL_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_GRADEWELL_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_GRADEWELL_SELF_REF", "${_GRADEWELL_SELF_REF}");
        std::env::set_var("_GRADEWELL_OTHER", "x");
        assert_eq!(
            resolve_env_vars("${_GRADEWELL_SELF_REF}"),
            "${_GRADEWELL_SELF_REF}"
        );
        assert_eq!(
            resolve_env_vars("a${_GRADEWELL_SELF_REF}b${_GRADEWELL_OTHER}c"),
            "a${_GRADEWELL_SELF_REF}bxc"
        );
        assert_eq!(resolve_env_vars("${_GRADEWELL_OTHER}${"), "x${");
        std::env::remove_var("_GRADEWELL_SELF_REF");
        std::env::remove_var("_GRADEWELL_OTHER");
    }

    #[test]
    fn default_config() {
        let config = GradewellConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-3-flash-preview");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.school_name, "English With Gab");
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "openai"
default_model = "gpt-4.1-mini"
school_name = "Test School"

[providers.gemini]
type = "gemini"
api_key = "g-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.ollama]
type = "ollama"
"#;
        let config: GradewellConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(
            config.providers.get("gemini"),
            Some(ProviderConfig::Gemini { .. })
        ));
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));

        let grader = config.grader_config();
        assert_eq!(grader.model, "gpt-4.1-mini");
        assert_eq!(grader.prompt.school_name, "Test School");
        assert_eq!(grader.prompt.feedback_language, "Portuguese");
    }

    #[test]
    fn debug_masks_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradewell.toml");
        std::fs::write(&path, "data_dir = \"/tmp/portal\"\ntimeout_secs = 5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/portal"));
        assert_eq!(config.timeout_secs, 5);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn grader_goes_offline_without_credentials() {
        let mut config = GradewellConfig::default();
        assert!(build_grader(&config, false).unwrap().is_offline());

        config.providers.insert(
            "gemini".into(),
            ProviderConfig::Gemini {
                api_key: "  ".into(),
                base_url: None,
            },
        );
        assert!(build_grader(&config, false).unwrap().is_offline());

        config.providers.insert(
            "gemini".into(),
            ProviderConfig::Gemini {
                api_key: "key".into(),
                base_url: None,
            },
        );
        assert!(!build_grader(&config, false).unwrap().is_offline());
        assert!(build_grader(&config, true).unwrap().is_offline());
    }
}
