use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Sqlite,
    Postgresql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseType,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    #[serde(default)]
    pub postgresql_url: Option<String>,

    #[serde(default)]
    pub pool_size: Option<u32>,
}

fn default_sqlite_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("renova")
        .join("renova.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseType::default(),
            sqlite_path: default_sqlite_path(),
            postgresql_url: None,
            pool_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the media store.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Base under which stored objects are publicly served. Object URLs
    /// are `{public_base_url}/{storage_path}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_media_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("renova")
        .join("media")
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080/media".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Cap on before/after pairs per project.
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,

    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

fn default_max_pairs() -> usize {
    crate::media::DEFAULT_MAX_PAIRS
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "webp".to_string(),
        "avif".to_string(),
    ]
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_pairs: default_max_pairs(),
            image_extensions: default_image_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    #[serde(default = "default_instagram_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,

    /// How long a cached feed stays fresh before readers consider it
    /// stale.
    #[serde(default = "default_cache_max_age_minutes")]
    pub cache_max_age_minutes: i64,
}

fn default_instagram_api_base() -> String {
    "https://graph.instagram.com".to_string()
}

fn default_feed_limit() -> usize {
    12
}

fn default_cache_max_age_minutes() -> i64 {
    60
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            api_base: default_instagram_api_base(),
            access_token: None,
            feed_limit: default_feed_limit(),
            cache_max_age_minutes: default_cache_max_age_minutes(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    #[default]
    LmStudio,
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderType,

    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Extra studio-voice instructions prepended to the drafting prompt.
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

fn default_llm_endpoint() -> String {
    "http://127.0.0.1:1234/v1".to_string()
}

fn default_llm_model() -> String {
    "gemma-3-4b".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Whether to report overdue schedules on startup.
    #[serde(default = "default_check_overdue_on_startup")]
    pub check_overdue_on_startup: bool,

    /// Default start hour for hours of operation (0-23).
    #[serde(default)]
    pub default_hours_start: Option<u8>,

    /// Default end hour for hours of operation (0-23).
    #[serde(default)]
    pub default_hours_end: Option<u8>,
}

fn default_check_overdue_on_startup() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_overdue_on_startup: default_check_overdue_on_startup(),
            default_hours_start: None,
            default_hours_end: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Environment variable overrides the default location
        if let Ok(path) = std::env::var("RENOVA_CONFIG") {
            return Self::load_from(Path::new(&path));
        }
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.database.sqlite_path
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("renova")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
