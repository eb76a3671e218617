//! Shared configuration for the ContinuityCRM client crates.

mod client_config;
mod config;

pub use client_config::{ClientConfig, DEFAULT_BASE_URL};
pub use config::{load_client_config, load_client_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
