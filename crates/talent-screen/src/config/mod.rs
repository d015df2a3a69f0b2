use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::postings::Currency;

const DEFAULT_MAX_CV_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;

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
    pub screening: ScreeningConfig,
    pub collaborators: CollaboratorConfig,
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

        let default_currency = match env::var("APP_DEFAULT_CURRENCY") {
            Ok(raw) => Currency::parse(&raw).ok_or(ConfigError::InvalidCurrency(raw))?,
            Err(_) => Currency::Php,
        };

        let max_cv_bytes = match env::var("APP_MAX_CV_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidCvLimit)?,
            Err(_) => DEFAULT_MAX_CV_BYTES,
        };

        let timeout_secs = match env::var("APP_COLLABORATOR_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_COLLABORATOR_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening: ScreeningConfig {
                default_currency,
                max_cv_bytes,
            },
            collaborators: CollaboratorConfig {
                digitizer_url: non_empty_var("APP_DIGITIZER_URL"),
                scoring_url: non_empty_var("APP_SCORING_URL"),
                timeout: Duration::from_secs(timeout_secs),
            },
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
}

/// Knobs for question authoring and CV intake.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    /// Currency applied to new currency ranges and catalog salary questions.
    pub default_currency: Currency,
    pub max_cv_bytes: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::Php,
            max_cv_bytes: DEFAULT_MAX_CV_BYTES,
        }
    }
}

/// Endpoints of the out-of-process digitization and scoring services.
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub digitizer_url: Option<String>,
    pub scoring_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCurrency(String),
    InvalidCvLimit,
    InvalidTimeout,
    InvalidCollaborator(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCurrency(value) => {
                write!(f, "APP_DEFAULT_CURRENCY '{value}' is not a supported currency")
            }
            ConfigError::InvalidCvLimit => {
                write!(f, "APP_MAX_CV_BYTES must be a positive integer")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_COLLABORATOR_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidCollaborator(reason) => {
                write!(f, "collaborator client could not be built: {reason}")
            }
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
