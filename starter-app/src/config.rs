//! Configuration loading from environment.

use std::env;

use anyhow::anyhow;

/// Log output format for the `fmt` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_webhook_secret: String,
    pub razorpay_api_url: Option<String>,
    pub clerk_secret_key: String,
    /// PEM-encoded RS256 public key for session tokens
    pub clerk_jwt_key: String,
    pub clerk_webhook_secret: Option<String>,
    pub clerk_api_url: Option<String>,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| anyhow!("{} environment variable is required", key))
        };

        let port = match optional("PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| anyhow!("PORT must be a valid port number: {}", e))?,
            None => 3000,
        };

        let log_format = match optional("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            port,
            database_url: required("DATABASE_URL")?,
            razorpay_key_id: required("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: required("RAZORPAY_KEY_SECRET")?,
            razorpay_webhook_secret: required("RAZORPAY_WEBHOOK_SECRET")?,
            razorpay_api_url: optional("RAZORPAY_API_URL"),
            clerk_secret_key: required("CLERK_SECRET_KEY")?,
            // Single-line env files carry the PEM with escaped newlines.
            clerk_jwt_key: required("CLERK_JWT_KEY")?.replace("\\n", "\n"),
            clerk_webhook_secret: optional("CLERK_WEBHOOK_SECRET"),
            clerk_api_url: optional("CLERK_API_URL"),
            log_format,
            otlp_endpoint: optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
