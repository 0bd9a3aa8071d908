//! `jmodel.toml` loading, discovery and tracing setup.
//!
//! ```toml
//! builtin_jdk = true
//!
//! [[classpath]]
//! path = "src/main/java"
//! mode = "source"
//! encoding = "UTF-8"
//!
//! [[classpath]]
//! path = "lib/dep.jar"
//! mode = "binary"
//!
//! [logging]
//! level = "debug"
//! json = false
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use jmodel_classpath::ClasspathEntry;
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Classpath entries in lookup order; earlier entries shadow later ones.
    #[serde(default)]
    pub classpath: Vec<ClasspathEntry>,

    /// Append the built-in minimal JDK as the lowest-priority binary root.
    #[serde(default = "ModelConfig::default_builtin_jdk")]
    pub builtin_jdk: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ModelConfig {
    fn default_builtin_jdk() -> bool {
        true
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            builtin_jdk: Self::default_builtin_jdk(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    /// Lowercases bare level names and accepts `warning`; anything else is kept as a directive
    /// string. Blank means the default level.
    pub(crate) fn normalize_level_directives(input: &str) -> String {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if trimmed.is_empty() {
            Self::default_level()
        } else if lower == "warning" {
            "warn".to_owned()
        } else if LEVELS.contains(&lower.as_str()) {
            lower
        } else {
            trimmed.to_owned()
        }
    }

    /// The effective filter: the configured level with `RUST_LOG` merged on top.
    ///
    /// Candidates are tried most specific first; an unparsable `RUST_LOG` falls back to the
    /// configured level, an unparsable level to `warn`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = Self::normalize_level_directives(&self.level);
        let from_env = std::env::var("RUST_LOG")
            .map(|value| value.trim().to_owned())
            .unwrap_or_default();

        let mut candidates = Vec::with_capacity(3);
        if !from_env.is_empty() {
            candidates.push(format!("{configured},{from_env}"));
            candidates.push(from_env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::WARN.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep the message and offset only.
        let message = err.message().trim_end().to_string();
        match err.span() {
            Some(span) => ConfigError::Toml(format!("{message} (at byte {})", span.start)),
            None => ConfigError::Toml(message),
        }
    }
}

impl ModelConfig {
    /// Loads a config file. Relative classpath paths resolve against the file's directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let (config, _unknown) = Self::load_from_path_with_warnings(path)?;
        Ok(config)
    }

    /// Like [`ModelConfig::load_from_path`], also returning the dotted paths of unknown keys.
    pub fn load_from_path_with_warnings(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Vec<String>), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let (mut config, unknown) = Self::load_from_str_with_warnings(&text)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_paths(dir);
        }
        for key in &unknown {
            tracing::warn!(target: "jmodel.config", path = %path.display(), key = %key, "unknown config key");
        }
        Ok((config, unknown))
    }

    pub fn load_from_str_with_warnings(text: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut unknown = Vec::new();
        let deserializer = toml::Deserializer::new(text);
        let config: ModelConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.push(path.to_string().trim_start_matches('.').to_string());
        })?;
        Ok((config, unknown))
    }

    pub fn resolve_relative_paths(&mut self, base: &Path) {
        for entry in &mut self.classpath {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
    }
}

pub const JMODEL_CONFIG_ENV_VAR: &str = "JMODEL_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Runs `f` while holding the lock that config discovery takes around reading
/// [`JMODEL_CONFIG_ENV_VAR`].
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discovers the config file for `root`.
///
/// Search order:
/// 1) `JMODEL_CONFIG_PATH` (absolute or relative to `root`)
/// 2) `jmodel.toml` in `root`
/// 3) `.jmodel.toml` in `root`
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(JMODEL_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["jmodel.toml", ".jmodel.toml"]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Loads the config for `root`; [`ModelConfig::default`] and `None` when there is none.
pub fn load_for_root(root: &Path) -> Result<(ModelConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(root) else {
        return Ok((ModelConfig::default(), None));
    };
    let config = ModelConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Installs the global stderr subscriber. Later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let fmt = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false);
        let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            fmt.json().boxed()
        } else {
            fmt.boxed()
        };
        let installed = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer)
            .try_init();
        if installed.is_err() {
            tracing::debug!(target: "jmodel.config", "global tracing subscriber already installed");
        }
    });
}
