use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the Application lives and who we talk to it as.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the Application, without a trailing slash.
    pub base_url: String,
    /// The user whose dataset settings the scenarios modify.
    pub user: String,
    /// Bearer token. Usually supplied through `GRIDCHECK__SERVICE__TOKEN`.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Tolerances and paging parameters used by the verifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Observations are compared after rounding to this many decimal places.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Size of the reference page the paging check slices.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_page_sizes")]
    pub page_sizes: Vec<u32>,
    /// Observation cap sent with grouped queries.
    #[serde(default = "default_observations_limit")]
    pub observations_limit: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            max_page_size: default_max_page_size(),
            page_sizes: default_page_sizes(),
            observations_limit: default_observations_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_decimal_places() -> u32 {
    9
}

fn default_max_page_size() -> u32 {
    100
}

fn default_page_sizes() -> Vec<u32> {
    vec![5, 10, 20, 25, 50, 75]
}

fn default_observations_limit() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}
