use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Email delivery of notifications
    #[serde(default)]
    pub email: EmailConfig,
    /// Webhook delivery of notifications
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Sweep and recheck scheduling
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
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

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Master switch. When false nothing is sent regardless of the stored
    /// notification settings.
    #[serde(default = "default_email_enabled")]
    pub enabled: bool,

    /// Email provider: console or smtp
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// Use STARTTLS
    #[serde(default = "default_smtp_tls")]
    pub smtp_use_tls: bool,

    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Prefix for action links in emails
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: default_email_enabled(),
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_use_tls: default_smtp_tls(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,

    /// Total attempts per delivery
    #[serde(default = "default_webhook_retries")]
    pub retries: u32,

    /// Base backoff; attempt `n` waits `n * backoff_ms` before the next try
    #[serde(default = "default_webhook_backoff_ms")]
    pub backoff_ms: u64,

    /// Reported as `metadata.environment` in payloads
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_webhook_timeout(),
            retries: default_webhook_retries(),
            backoff_ms: default_webhook_backoff_ms(),
            environment: default_environment(),
        }
    }
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Periodic full sweep interval
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,

    /// Delay before the first sweep after startup
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,

    /// Pending rechecks beyond this are dropped
    #[serde(default = "default_recheck_capacity")]
    pub recheck_queue_capacity: usize,

    /// UTC hour of the daily summary email
    #[serde(default = "default_summary_hour")]
    pub daily_summary_hour: u32,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: default_sweep_interval(),
            initial_delay_secs: default_initial_delay(),
            recheck_queue_capacity: default_recheck_capacity(),
            daily_summary_hour: default_summary_hour(),
        }
    }
}

// Default value functions

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

fn default_email_enabled() -> bool {
    true
}

fn default_email_provider() -> String {
    "console".to_string() // Log instead of sending during development
}

fn default_smtp_port() -> u16 {
    587 // STARTTLS submission port
}

fn default_smtp_tls() -> bool {
    true
}

fn default_sender_email() -> String {
    "noreply@hedgehog-rescue.org".to_string()
}

fn default_sender_name() -> String {
    "Hedgehog Rescue".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_webhook_timeout() -> u64 {
    10
}

fn default_webhook_retries() -> u32 {
    3
}

fn default_webhook_backoff_ms() -> u64 {
    1000
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_initial_delay() -> u64 {
    10
}

fn default_recheck_capacity() -> usize {
    64
}

fn default_summary_hour() -> u32 {
    8
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RESCUE__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RESCUE").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a configuration from embedded defaults plus overrides, without
    /// touching the file system.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [email]
            enabled = true
            provider = "console"
            sender_email = "test@example.com"
            sender_name = "Test"
            base_url = "http://localhost:8080"

            [webhook]
            timeout_secs = 10
            retries = 3
            backoff_ms = 1000
            environment = "test"

            [notifications]
            sweep_interval_minutes = 30
            initial_delay_secs = 10
            recheck_queue_capacity = 64
            daily_summary_hour = 8
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so tests can inspect partial configs
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RESCUE__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        match self.email.provider.as_str() {
            "console" => {}
            "smtp" => {
                if self.email.enabled && self.email.smtp_host.is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "email.smtp_host is required for the smtp provider".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown email provider '{}'",
                    other
                )));
            }
        }

        if self.webhook.retries == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "webhook.retries must be at least 1".to_string(),
            ));
        }

        if self.notifications.sweep_interval_minutes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "notifications.sweep_interval_minutes must be at least 1".to_string(),
            ));
        }

        if self.notifications.recheck_queue_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "notifications.recheck_queue_capacity must be at least 1".to_string(),
            ));
        }

        if self.notifications.daily_summary_hour > 23 {
            return Err(ConfigValidationError::InvalidValue(
                "notifications.daily_summary_hour must be between 0 and 23".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
