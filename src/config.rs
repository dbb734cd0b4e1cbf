use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::notify::{DEFAULT_API_BASE, DEFAULT_DIGEST_LIMIT};
use crate::scheduler::DailyTrigger;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Bangkok;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

/// Times of day for the two daily jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub reset: DailyTrigger,
    pub summary: DailyTrigger,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reset: DailyTrigger::NOON,
            summary: DailyTrigger::MIDNIGHT,
        }
    }
}

/// LINE Messaging API credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    #[serde(skip_serializing)]
    pub channel_access_token: Option<String>,
    pub group_id: Option<String>,
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            group_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl LineConfig {
    /// Returns true if both the token and the target group are set
    pub fn is_configured(&self) -> bool {
        self.channel_access_token.is_some() && self.group_id.is_some()
    }
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field(
                "channel_access_token",
                &self.channel_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("group_id", &self.group_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub port: ConfigValue<u16>,
    /// Inventory document
    pub data_path: ConfigValue<PathBuf>,
    /// Daily summary history
    pub summary_path: ConfigValue<PathBuf>,
    /// Dashboard files served at `/`
    pub static_dir: ConfigValue<PathBuf>,
    /// Timezone the daily jobs run in
    pub timezone: ConfigValue<Tz>,
    pub schedule: ScheduleConfig,
    /// Items listed in the summary card before "and N more"
    pub digest_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    pub line: LineConfig,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    port: Option<u16>,
    data_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    timezone: Option<String>,
    schedule: Option<ScheduleConfig>,
    digest_limit: Option<usize>,
    dashboard_url: Option<String>,
    line: Option<LineConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with environment lookups going through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = Self::default_data_dir();

        // Start with defaults
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut data_path = ConfigValue::new(data_dir.join("data.json"), ConfigSource::Default);
        let mut summary_path =
            ConfigValue::new(data_dir.join("summary-log.json"), ConfigSource::Default);
        let mut static_dir = ConfigValue::new(PathBuf::from("public"), ConfigSource::Default);
        let mut timezone = ConfigValue::new(DEFAULT_TIMEZONE, ConfigSource::Default);
        let mut schedule = ScheduleConfig::default();
        let mut digest_limit = DEFAULT_DIGEST_LIMIT;
        let mut dashboard_url = None;
        let mut line = LineConfig::default();
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(value) = file_config.port {
                port.set(value, ConfigSource::File);
            }
            if let Some(value) = file_config.data_path {
                data_path.set(resolve_relative(&path, value), ConfigSource::File);
            }
            if let Some(value) = file_config.summary_path {
                summary_path.set(resolve_relative(&path, value), ConfigSource::File);
            }
            if let Some(value) = file_config.static_dir {
                static_dir.set(resolve_relative(&path, value), ConfigSource::File);
            }
            if let Some(value) = file_config.timezone {
                timezone.set(parse_timezone("timezone", &value)?, ConfigSource::File);
            }
            if let Some(value) = file_config.schedule {
                schedule = value;
            }
            if let Some(value) = file_config.digest_limit {
                digest_limit = value;
            }
            if file_config.dashboard_url.is_some() {
                dashboard_url = file_config.dashboard_url;
            }
            if let Some(value) = file_config.line {
                line = value;
            }
        }

        // Apply environment variable overrides
        if let Some(value) = env("STOCKROOM_PORT").or_else(|| env("PORT")) {
            let parsed = value.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("port".to_string(), format!("'{}' is not a port", value))
            })?;
            port.set(parsed, ConfigSource::Environment);
        }
        if let Some(value) = env("STOCKROOM_DATA_PATH") {
            data_path.set(PathBuf::from(value), ConfigSource::Environment);
        }
        if let Some(value) = env("STOCKROOM_SUMMARY_PATH") {
            summary_path.set(PathBuf::from(value), ConfigSource::Environment);
        }
        if let Some(value) = env("STOCKROOM_STATIC_DIR") {
            static_dir.set(PathBuf::from(value), ConfigSource::Environment);
        }
        if let Some(value) = env("STOCKROOM_TIMEZONE") {
            timezone.set(parse_timezone("STOCKROOM_TIMEZONE", &value)?, ConfigSource::Environment);
        }
        // LINE credentials
        if let Some(value) = env("LINE_CHANNEL_ACCESS_TOKEN") {
            line.channel_access_token = Some(value);
        }
        if let Some(value) = env("LINE_GROUP_ID") {
            line.group_id = Some(value);
        }

        Ok(Self {
            port,
            data_path,
            summary_path,
            static_dir,
            timezone,
            schedule,
            digest_limit,
            dashboard_url,
            line,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/stockroom/
    /// - macOS: ~/Library/Application Support/stockroom/
    /// - Windows: %APPDATA%/stockroom/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stockroom")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/stockroom/
    /// - macOS: ~/Library/Application Support/stockroom/
    /// - Windows: %APPDATA%/stockroom/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stockroom")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

// Relative paths in the config file are relative to the file itself.
fn resolve_relative(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

fn parse_timezone(key: &str, value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| {
        ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not an IANA timezone name", value),
        )
    })
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, msg) => {
                write!(f, "Invalid value for '{}': {}", key, msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
