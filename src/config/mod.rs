//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Chat completion provider settings
//! - Admin host routing and media storage locations

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Staff account created on startup when the username is not taken yet
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// TLS/HTTPS configuration (if not set, server runs HTTP)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to TLS certificate file (PEM format)
    pub cert_file: PathBuf,
    /// Path to TLS private key file (PEM format)
    pub key_file: PathBuf,
    /// Minimum TLS version (1.2 or 1.3)
    #[serde(default = "default_min_tls_version")]
    pub min_version: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_min_tls_version() -> String {
    "1.3".to_string()
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_token_expiry() -> u64 {
    12
}

fn default_password_min_length() -> usize {
    8
}

/// Initial staff account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file" or "both")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr) - default for development
    #[default]
    Console,
    /// Log to file with optional rotation - recommended for production
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/suitehub")
}

fn default_log_prefix() -> String {
    "suitehub".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

/// Chat completion provider configuration
///
/// Any OpenAI-compatible `/chat/completions` endpoint works. Without an API key
/// the chat endpoint still records messages and answers with a canned reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,
    /// Number of most recent messages forwarded as context
    #[serde(default = "default_chat_history_window")]
    pub history_window: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_chat_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_chat_timeout() -> u64 {
    30
}

fn default_chat_max_tokens() -> u32 {
    500
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_chat_history_window() -> usize {
    10
}

fn default_system_prompt() -> String {
    "You are a helpful assistant for an innovation and economic development center. \
     You can help with questions about events, venue bookings, office suites, and general inquiries."
        .to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_chat_api_url(),
            model: default_chat_model(),
            timeout_secs: default_chat_timeout(),
            max_tokens: default_chat_max_tokens(),
            temperature: default_chat_temperature(),
            history_window: default_chat_history_window(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Host based routing for the staff dashboard
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Requests whose Host begins with this label (at any depth) belong to the dashboard
    #[serde(default = "default_admin_host_prefix")]
    pub admin_host_prefix: String,
    /// Path prefix of the dashboard; other paths on the admin host are redirected here
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

fn default_admin_host_prefix() -> String {
    "admin.".to_string()
}

fn default_dashboard_path() -> String {
    "/admin/".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            admin_host_prefix: default_admin_host_prefix(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

/// Uploaded file storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Dashboard listing sizes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_recent_reservations")]
    pub recent_reservations: i64,
    #[serde(default = "default_recent_entities")]
    pub recent_entities: i64,
    /// Window used for the "recent" reservation counter
    #[serde(default = "default_recent_days")]
    pub recent_days: i64,
}

fn default_recent_reservations() -> i64 {
    20
}

fn default_recent_entities() -> i64 {
    10
}

fn default_recent_days() -> i64 {
    7
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_reservations: default_recent_reservations(),
            recent_entities: default_recent_entities(),
            recent_days: default_recent_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                workers: default_workers(),
                request_timeout_secs: None,
                tls: None,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-minimum-32-characters-long".to_string(),
                token_expiry_hours: default_token_expiry(),
                password_min_length: default_password_min_length(),
            },
            database: DatabaseConfig {
                url: "sqlite://./data/suitehub.db".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            logging: LoggingConfig::default(),
            chat: ChatConfig::default(),
            routing: RoutingConfig::default(),
            media: MediaConfig::default(),
            dashboard: DashboardConfig::default(),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("SUITEHUB_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_norway::from_str::<AppConfig>(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/suitehub/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("suitehub/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SUITEHUB_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SUITEHUB_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SUITEHUB_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("SUITEHUB_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("SUITEHUB_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }

        if let Ok(root) = std::env::var("SUITEHUB_MEDIA_ROOT") {
            self.media.root = PathBuf::from(root);
        }
        if let Ok(prefix) = std::env::var("SUITEHUB_ADMIN_HOST_PREFIX") {
            self.routing.admin_host_prefix = prefix;
        }

        if let Ok(key) = std::env::var("CHAT_API_KEY") {
            if !key.is_empty() {
                self.chat.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("CHAT_API_URL") {
            self.chat.api_url = url;
        }
        if let Ok(model) = std::env::var("CHAT_MODEL") {
            self.chat.model = model;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 characters long");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.chat.history_window == 0 {
            anyhow::bail!("Chat history window must be at least 1");
        }

        if !self.routing.dashboard_path.starts_with('/') {
            anyhow::bail!(
                "Dashboard path must start with '/': {}",
                self.routing.dashboard_path
            );
        }

        if let Some(ref tls) = self.server.tls {
            if !tls.cert_file.exists() {
                anyhow::bail!("TLS certificate file not found: {:?}", tls.cert_file);
            }
            if !tls.key_file.exists() {
                anyhow::bail!("TLS key file not found: {:?}", tls.key_file);
            }
            if tls.min_version != "1.2" && tls.min_version != "1.3" {
                anyhow::bail!(
                    "Invalid TLS minimum version: {}. Must be '1.2' or '1.3'",
                    tls.min_version
                );
            }
        }

        if let Some(ref admin) = self.bootstrap_admin {
            if admin.password.len() < self.auth.password_min_length {
                anyhow::bail!(
                    "Bootstrap admin password must be at least {} characters long",
                    self.auth.password_min_length
                );
            }
        }

        Ok(())
    }
}
