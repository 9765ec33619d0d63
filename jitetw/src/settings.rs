use anyhow::Result;
use jitetw_provider::{NoopSink, TraceSink};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Log level enumeration for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Name as written in the settings file
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Convert to tracing level filter
    pub fn to_tracing_level_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

/// Sink backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ETW on Windows, no-op elsewhere
    #[default]
    Auto,
    Etw,
    Noop,
}

impl Backend {
    pub fn is_available(self) -> bool {
        match self {
            Backend::Etw => cfg!(windows),
            Backend::Auto | Backend::Noop => true,
        }
    }

    pub fn create_sink(self) -> Result<Arc<dyn TraceSink>> {
        match self {
            Backend::Auto => Ok(jitetw_provider::default_sink()),
            Backend::Noop => Ok(Arc::new(NoopSink)),
            #[cfg(windows)]
            Backend::Etw => Ok(Arc::new(jitetw_provider::EtwSink::new())),
            #[cfg(not(windows))]
            Backend::Etw => Err(anyhow::anyhow!(
                "The etw backend is only available on Windows"
            )),
        }
    }
}

/// Bridge settings, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Install a subscriber of our own; hosts with their own subscriber
    /// leave this off
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub level: LogLevel,
    /// Log file, stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub backend: Backend,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Invalid jitetw settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read settings file '{}': {}", path.display(), e)
        })?;
        info!("Loading settings from: {}", path.display());
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("{} (in '{}')", e, path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.provider.backend.is_available() {
            return Err(anyhow::anyhow!(
                "Backend {:?} is not available on this platform",
                self.provider.backend
            ));
        }
        Ok(())
    }
}
