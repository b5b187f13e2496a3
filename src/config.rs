// ABOUTME: Environment-driven configuration for upstream services and the stream relay
// ABOUTME: Parsed once at startup; missing or malformed variables fail fast with their name

use std::env;
use thiserror::Error;

use crate::relay::RelayConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub supabase: SupabaseConfig,
    pub wasabi: WasabiConfig,
    pub relay: RelayConfig,
    /// Expiry for signed upload URLs, in seconds. Download URLs are fixed at one hour.
    pub upload_url_expiry_secs: u64,
}

/// Identity provider + metadata store endpoint (one Supabase project serves both).
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

/// S3-compatible object store holding recording bodies and thumbnails.
#[derive(Debug, Clone)]
pub struct WasabiConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase = SupabaseConfig {
            url: require("SUPABASE_URL")?,
            service_role_key: require("SUPABASE_SERVICE_ROLE_KEY")?,
        };

        let wasabi = WasabiConfig {
            endpoint: require("WASABI_ENDPOINT")?,
            region: optional("WASABI_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key: require("WASABI_ACCESS_KEY")?,
            secret_key: require("WASABI_SECRET_KEY")?,
            bucket: require("WASABI_BUCKET")?,
        };

        let relay = RelayConfig {
            host: require("RELAY_HOST")?,
            username: optional("RELAY_USERNAME").unwrap_or_else(|| "camera".to_string()),
            password: require("RELAY_PASSWORD")?,
            rtsp_port: parse_port("RELAY_RTSP_PORT", 8554)?,
            webrtc_port: parse_port("RELAY_WEBRTC_PORT", 8889)?,
            hls_port: parse_port("RELAY_HLS_PORT", 8888)?,
        };

        let upload_url_expiry_secs = match optional("UPLOAD_URL_EXPIRY_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "UPLOAD_URL_EXPIRY_SECS",
                message: format!("expected seconds, got {value:?}"),
            })?,
            None => 3600,
        };

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            supabase,
            wasabi,
            relay,
            upload_url_expiry_secs,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_port(name: &'static str, default: u16) -> Result<u16, ConfigError> {
    match optional(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            var: name,
            message: format!("expected a port number, got {value:?}"),
        }),
        None => Ok(default),
    }
}
