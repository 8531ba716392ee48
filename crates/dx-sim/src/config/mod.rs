use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::simulation::roi::{DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS};

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

/// Top-level configuration for the simulator.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
    pub simulation: SimulationConfig,
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

        let data = DataConfig {
            dataset_path: path_var("DXSIM_DATASET_PATH", "assets/data/domains.json"),
            flows_path: path_var("DXSIM_FLOWS_PATH", "assets/data/flows.json"),
            characters_path: path_var("DXSIM_CHARACTERS_PATH", "assets/data/characters.json"),
            state_dir: path_var("DXSIM_STATE_DIR", ".dx-sim/state"),
        };

        let roi_horizon_years = match env::var("DXSIM_ROI_HORIZON") {
            Ok(raw) => parse_horizon(&raw)?,
            Err(_) => DEFAULT_HORIZON_YEARS,
        };

        let cost_per_hour = match env::var("DXSIM_COST_PER_HOUR") {
            Ok(raw) => Some(parse_cost_per_hour(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data,
            simulation: SimulationConfig {
                roi_horizon_years,
                cost_per_hour,
            },
        })
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_horizon(raw: &str) -> Result<u32, ConfigError> {
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidHorizon(raw.to_string()))?;
    if value == 0 || value > MAX_HORIZON_YEARS {
        return Err(ConfigError::InvalidHorizon(raw.to_string()));
    }
    Ok(value)
}

fn parse_cost_per_hour(raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidCostPerHour(raw.to_string())),
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the datasets and saved snapshots live.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dataset_path: PathBuf,
    pub flows_path: PathBuf,
    pub characters_path: PathBuf,
    pub state_dir: PathBuf,
}

/// Knobs for the demo analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub roi_horizon_years: u32,
    /// Overrides the dataset's hourly labor cost when set.
    pub cost_per_hour: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            roi_horizon_years: DEFAULT_HORIZON_YEARS,
            cost_per_hour: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidHorizon(String),
    InvalidCostPerHour(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHorizon(raw) => write!(
                f,
                "DXSIM_ROI_HORIZON must be between 1 and {MAX_HORIZON_YEARS} years (got '{raw}')"
            ),
            ConfigError::InvalidCostPerHour(raw) => write!(
                f,
                "DXSIM_COST_PER_HOUR must be a non-negative number (got '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidHorizon(_)
            | ConfigError::InvalidCostPerHour(_) => None,
        }
    }
}
