use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub collection: CollectionSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which backend serves documents, identities and photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Appwrite,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_bucket")]
    pub bucket_id: String,
}

fn default_bucket() -> String { "profile_photos".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_users")]
    pub users: String,
    #[serde(default = "default_swipes")]
    pub swipes: String,
    #[serde(default = "default_matches")]
    pub matches: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            users: default_users(),
            swipes: default_swipes(),
            matches: default_matches(),
        }
    }
}

fn default_users() -> String { "users".to_string() }
fn default_swipes() -> String { "swipes".to_string() }
fn default_matches() -> String { "matches".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

fn default_session_ttl() -> u64 { 7 * 24 * 3600 }
fn default_max_sessions() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MatchingSettings {
    /// Derive match ids from the user pair so the store rejects a second
    /// match for the same two profiles
    #[serde(default)]
    pub unique_pair_ids: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SPAR__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SPAR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SPAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_deployment_env(settings)?;

        settings.try_deserialize()
    }
}

/// Honour the conventional unprefixed variables deployments already set
/// for Appwrite and the token secret
fn apply_deployment_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("APPWRITE_ENDPOINT", "appwrite.endpoint"),
        ("APPWRITE_API_KEY", "appwrite.api_key"),
        ("APPWRITE_PROJECT_ID", "appwrite.project_id"),
        ("APPWRITE_DATABASE_ID", "appwrite.database_id"),
        ("JWT_SECRET", "session.jwt_secret"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
