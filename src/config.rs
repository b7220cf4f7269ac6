use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub tables: TableSettings,
    pub mail: MailSettings,
    pub sweep: SweepSettings,
    pub admin: AdminSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    pub alerts: String,
    pub favorites: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from_address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_concurrency: default_max_concurrency(),
            op_timeout_secs: default_op_timeout_secs(),
        }
    }
}

fn default_cooldown_secs() -> u64 {
    0
}
fn default_max_concurrency() -> usize {
    4
}
fn default_op_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with NAJEM_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with NAJEM_)
            // e.g., NAJEM_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NAJEM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Apply the bare env names the deployment already uses
        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NAJEM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Fold the deployment's flat env names (SUPABASE_URL, SUPABASE_KEY,
/// MAIL_USER, MAIL_PASS, ADMIN_EMAIL) into the structured settings.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_KEY") {
        builder = builder.set_override("supabase.api_key", key)?;
    }
    if let Ok(user) = env::var("MAIL_USER") {
        builder = builder.set_override("mail.username", user)?;
    }
    if let Ok(pass) = env::var("MAIL_PASS") {
        builder = builder.set_override("mail.password", pass)?;
    }
    if let Ok(email) = env::var("ADMIN_EMAIL") {
        builder = builder.set_override("admin.email", email)?;
    }

    builder.build()
}
