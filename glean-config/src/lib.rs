//! Loader for Glean configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. an optional or required YAML file (`glean.yaml` by default);
//! 2. inline YAML snippets added by tests or the CLI;
//! 3. `GLEAN_`-prefixed environment variables, `__` separating nested keys
//!    (`GLEAN_MODEL`, `GLEAN_LOG__FILTER`).
//!
//! String values may reference other environment variables as `${VAR}`;
//! expansion is recursive up to a fixed depth and leaves unknown variables as
//! written.
use config::{Config, ConfigError, Environment, File};
use glean_common::observability::{default_data_dir, expand_home, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct GleanConfig {
    /// Completion model identifier; the client default applies when unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Full chat-completions URL; the public endpoint applies when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// `HTTP-Referer` header value.
    #[serde(default)]
    pub referer: Option<String>,
    /// `X-Title` header value.
    #[serde(default)]
    pub app_title: Option<String>,
    /// Credential used when no saved key is selected.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: default_log_filter(),
            stderr: false,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
fn default_log_filter() -> String {
    "info".into()
}

impl GleanConfig {
    /// Configured storage file, else `<data dir>/glean/storage.json`.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(p) = &self.storage_path {
            return expand_home(p);
        }
        default_data_dir("glean").join("storage.json")
    }

    /// Configured export directory, else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Resolve `$VAR` / `${VAR}` references, following chains for a bounded
/// number of passes. Unknown variables stay as written.
fn expand_vars(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let next = match shellexpand::env(&current) {
            Ok(expanded) => expanded.into_owned(),
            Err(_) => break,
        };
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => *s = expand_vars(s),
        Value::Array(items) => items.iter_mut().for_each(expand_env_in_value),
        Value::Object(map) => map.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Layers YAML sources and `GLEAN_` environment overrides.
pub struct GleanConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GleanConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GleanConfigLoader {
    /// Start with no file sources. Sources apply in the order they are added;
    /// `GLEAN_` env overrides are always applied last.
    ///
    /// ```
    /// use glean_config::GleanConfigLoader;
    ///
    /// let config = GleanConfigLoader::new()
    ///     .with_yaml_str("model: 'meta-llama/llama-3-8b-instruct'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.model.as_deref(), Some("meta-llama/llama-3-8b-instruct"));
    /// assert_eq!(config.fetch_timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML document, as if it were another file.
    ///
    /// ```
    /// use glean_config::GleanConfigLoader;
    /// use glean_common::observability::LogFormat;
    ///
    /// let cfg = GleanConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// export_dir: "/tmp/glean-out"
    /// log:
    ///   format: json
    ///   stderr: true
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.log.format, LogFormat::Json);
    /// assert!(cfg.log.stderr);
    /// assert_eq!(cfg.log.filter, "info");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge everything, expand `${VAR}` references, and decode a [`GleanConfig`].
    ///
    /// ```
    /// use glean_config::GleanConfigLoader;
    ///
    /// unsafe { std::env::set_var("GLEAN_DOC_KEY", "sk-from-env"); }
    ///
    /// let config = GleanConfigLoader::new()
    ///     .with_yaml_str("api_key: \"${GLEAN_DOC_KEY}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.api_key.as_deref(), Some("sk-from-env"));
    ///
    /// unsafe { std::env::remove_var("GLEAN_DOC_KEY"); }
    /// ```
    pub fn load(self) -> Result<GleanConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GLEAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
