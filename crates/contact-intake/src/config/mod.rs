use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_ALLOWED_ORIGIN: &str = "https://thunk-it.com";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub notifications: NotificationConfig,
    pub store: StoreConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match non_empty_var("APP_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::Compact,
        };

        let notifications = NotificationConfig::load(environment)?;

        let store = StoreConfig {
            path: non_empty_var("APP_STORE_PATH").map(PathBuf::from),
        };

        let cors = CorsConfig {
            allowed_origin: non_empty_var("APP_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
            admin_list_origin: non_empty_var("APP_ADMIN_LIST_ORIGIN")
                .unwrap_or_else(|| "*".to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            notifications,
            store,
            cors,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(raw.to_string())),
        }
    }
}

/// How submission notifications leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMode {
    /// Write notification content to the log sink only.
    Log,
    /// Hand notifications to the HTTP mail relay.
    Deliver,
}

impl NotificationMode {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "log" | "local" => Ok(Self::Log),
            "deliver" | "email" => Ok(Self::Deliver),
            _ => Err(ConfigError::InvalidNotificationMode(raw.to_string())),
        }
    }
}

/// Notification recipients and relay settings.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub mode: NotificationMode,
    pub admin_email: Option<String>,
    pub sender: String,
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<String>,
}

impl NotificationConfig {
    fn load(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let mode = match non_empty_var("APP_NOTIFICATION_MODE") {
            Some(raw) => NotificationMode::parse(&raw)?,
            None if environment == AppEnvironment::Production => NotificationMode::Deliver,
            None => NotificationMode::Log,
        };

        let domain = non_empty_var("DOMAIN_NAME").unwrap_or_else(|| "localhost".to_string());
        let config = Self {
            mode,
            admin_email: non_empty_var("ADMIN_EMAIL"),
            sender: format!("no-reply@{domain}"),
            mail_api_url: non_empty_var("APP_MAIL_API_URL"),
            mail_api_token: non_empty_var("APP_MAIL_API_TOKEN"),
        };

        if config.mode == NotificationMode::Deliver {
            if config.admin_email.is_none() {
                return Err(ConfigError::MissingVar("ADMIN_EMAIL"));
            }
            if config.mail_api_url.is_none() {
                return Err(ConfigError::MissingVar("APP_MAIL_API_URL"));
            }
        }

        Ok(config)
    }
}

/// Location of the submission table.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// JSON file backing the table; `None` keeps submissions in memory only.
    pub path: Option<PathBuf>,
}

/// Cross-origin policy for the HTTP surface.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Origin allowed on the public submit and status update endpoints.
    pub allowed_origin: String,
    /// Origin allowed on the admin listing endpoint.
    pub admin_list_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            admin_list_origin: "*".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidNotificationMode(String),
    MissingVar(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', found '{value}'")
            }
            ConfigError::InvalidNotificationMode(value) => {
                write!(
                    f,
                    "APP_NOTIFICATION_MODE must be 'log' or 'deliver', found '{value}'"
                )
            }
            ConfigError::MissingVar(name) => write!(f, "{name} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
