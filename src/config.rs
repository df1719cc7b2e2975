//! Agent configuration: cache identity, precache list, notification and
//! network settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Cache version baked in at build time.
///
/// Set `FITPOWER_CACHE_VERSION` when building a deploy to bump the bucket
/// name; a config file can still override it at runtime.
pub const DEFAULT_CACHE_VERSION: &str = match option_env!("FITPOWER_CACHE_VERSION") {
    Some(version) => version,
    None => "v4",
};

/// Prefix shared by every bucket this application owns.
pub const DEFAULT_CACHE_PREFIX: &str = "fitness-app";

/// Icon used for both the notification icon and badge.
pub const DEFAULT_ICON: &str = "/icons/icon-192x192.png";

/// Complete agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Bucket name prefix.
    pub cache_prefix: String,
    /// Version tag appended to the prefix; bumping it invalidates every
    /// previously cached entry on the next activation.
    pub cache_version: String,
    /// Paths stored in the bucket at install time.
    pub precache: Vec<String>,
    /// Notification defaults.
    pub notification: NotificationDefaults,
    /// Network settings.
    pub network: NetworkConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            // Only the manifest: HTML is per-session and must never be precached.
            precache: vec!["/manifest.json".to_string()],
            notification: NotificationDefaults::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache version tag.
    #[must_use]
    pub fn with_cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }

    /// Sets the cache prefix.
    #[must_use]
    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Replaces the precache list.
    #[must_use]
    pub fn with_precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the origin that relative paths resolve against.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.network.origin = origin.into();
        self
    }

    /// Name of the bucket owned by this version, e.g. `fitness-app-v4`.
    #[must_use]
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    /// Parses the configured origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin is not an absolute URL.
    pub fn origin(&self) -> Result<Url> {
        Ok(Url::parse(&self.network.origin)?)
    }

    /// Resolves a path (or absolute URL) against the configured origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin or the joined URL is invalid.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.origin()?.join(path)?)
    }

    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Loads `agent.toml` from the user config directory if it exists,
    /// otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns `<config_dir>/fitpower-agent/agent.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitpower-agent")
            .join("agent.toml")
    }
}

/// Literal defaults used when building notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    /// Title used when the payload has none, and for the fallback.
    pub title: String,
    /// Body of the fallback notification.
    pub fallback_body: String,
    /// Target URL when the payload or notification carries none.
    pub default_url: String,
    /// Notification icon path.
    pub icon: String,
    /// Notification badge path.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "FitPower".to_string(),
            fallback_body: "New notification".to_string(),
            default_url: "/".to_string(),
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_ICON.to_string(),
            vibrate: vec![100, 50, 100],
        }
    }
}

/// Network settings for the default HTTP implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Application origin, e.g. `http://localhost:8080`.
    pub origin: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}
