//! Loader for Verity configuration with YAML, `.env` and environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML files (in the order
//! they were added), `VERITY__<SECTION>__<KEY>` environment variables. String
//! values may reference other variables as `${VAR}`; they are expanded after
//! merging. Every section has defaults, so an empty configuration is valid.
//!
//! ```yaml
//! search:
//!   provider: duckduckgo   # or brave
//!   max_results: 3
//! llm:
//!   provider: groq         # groq | openai | ollama
//!   model: llama3-70b-8192
//!   api_key: "${GROQ_API_KEY}"
//! analysis:
//!   timeout_secs: 120
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use verity_common::observability::LogFormat;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "VERITY";
const CONFIG_FILE_NAME: &str = "verity.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VeritySettings {
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[default]
    DuckDuckGo,
    Brave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub provider: SearchProviderKind,
    /// Upper bound on the hits that reach the prompt.
    pub max_results: usize,
    /// Brave subscription token; falls back to `BRAVE_API_KEY`.
    pub api_key: Option<String>,
    /// Override the provider base URL (self-hosted mirrors, tests).
    pub endpoint: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: SearchProviderKind::DuckDuckGo,
            max_results: 3,
            api_key: None,
            endpoint: None,
        }
    }
}

impl SearchSettings {
    pub fn resolved_api_key(&self) -> Option<String> {
        usable(self.api_key.as_deref()).or_else(|| env_key("BRAVE_API_KEY"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    Groq,
    OpenAi,
    Ollama,
}

impl LlmProviderKind {
    /// Environment variable holding the credential for this provider.
    pub fn key_env(self) -> Option<&'static str> {
        match self {
            LlmProviderKind::Groq => Some("GROQ_API_KEY"),
            LlmProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            LlmProviderKind::Ollama => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    /// Model identifier; each provider has its own default.
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmSettings {
    /// Configured key, else the provider's environment variable.
    ///
    /// Absence is not an error here: a missing credential surfaces as an
    /// authentication failure from the provider.
    pub fn resolved_api_key(&self) -> Option<String> {
        usable(self.api_key.as_deref()).or_else(|| self.provider.key_env().and_then(env_key))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Upper bound for one search + completion round trip.
    pub timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Retries for 429/5xx and transport errors. Zero keeps calls fail-fast.
    pub retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            filter: "info".to_string(),
        }
    }
}

impl VeritySettings {
    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::Message(
                "search.max_results must be at least 1".into(),
            ));
        }
        if self.analysis.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "analysis.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// JSON view with every credential replaced by a marker.
    pub fn redacted(&self) -> Value {
        let mut v = serde_json::to_value(self).unwrap_or(Value::Null);
        for section in ["search", "llm"] {
            if let Some(key) = v.get_mut(section).and_then(|s| s.get_mut("api_key")) {
                if !key.is_null() {
                    *key = Value::String("<redacted>".into());
                }
            }
        }
        v
    }
}

fn usable(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty() && !s.contains("${"))
        .map(str::to_string)
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Load a `.env` file into the process environment.
///
/// Variables already set in the environment win. With no explicit path the
/// nearest `.env` (current directory and parents) is used if there is one.
pub fn load_dotenv(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) => dotenvy::from_path(path)
            .map(|_| Some(path.to_path_buf()))
            .map_err(|e| ConfigError::Message(format!("{}: {e}", path.display()))),
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(ConfigError::Message(format!(".env: {e}"))),
        },
    }
}

/// Pick the configuration file to read, if any.
///
/// An explicit path is returned as-is (and must exist when loaded). Otherwise
/// `./verity.yaml` is preferred over `<config_dir>/verity/verity.yaml`.
pub fn discover_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|d| d.join(verity_common::APP_NAME).join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct VerityConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    with_env: bool,
}

impl Default for VerityConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VerityConfigLoader {
    /// Start from defaults with `VERITY__` environment overrides enabled.
    ///
    /// ```
    /// use verity_config::VerityConfigLoader;
    ///
    /// let settings = VerityConfigLoader::new()
    ///     .with_yaml_str("search:\n  max_results: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(settings.search.max_results, 5);
    /// assert_eq!(settings.analysis.timeout_secs, 120);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            with_env: true,
        }
    }

    /// Skip the environment overlay (tests, `--no-env` style tooling).
    pub fn without_env(mut self) -> Self {
        self.with_env = false;
        self
    }

    /// Attach a required YAML/TOML/JSON file; the format follows the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    ///
    /// ```
    /// use verity_config::{LlmProviderKind, VerityConfigLoader};
    ///
    /// let settings = VerityConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: ollama
    ///   model: "llama3.2:3b"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(settings.llm.provider, LlmProviderKind::Ollama);
    /// assert_eq!(settings.llm.model.as_deref(), Some("llama3.2:3b"));
    /// ```
    pub fn load(self) -> Result<VeritySettings, ConfigError> {
        let mut builder = self.builder;
        if self.with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: VeritySettings =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        tracing::debug!(
            search = ?typed.search.provider,
            llm = ?typed.llm.provider,
            "config.loaded"
        );
        Ok(typed)
    }
}
