use anyhow::{Context, Result};
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 4000;

// Inbound requests get a deadline so upstream calls can cascade off the
// remaining budget.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Per-call timeout applied to every upstream gRPC call.
const DEFAULT_GRPC_TIMEOUT_SECS: u64 = 5;

const DEFAULT_AUTHENTICATION_URL: &str = "http://localhost:5001";
const DEFAULT_UPLOAD_URL: &str = "http://localhost:5002";
const DEFAULT_VIDEO_CATALOG_URL: &str = "http://localhost:5003";

// ============================================================================
// Configuration Structures
// ============================================================================

#[derive(Clone, Debug)]
pub struct Config {
    pub http: HttpConfig,
    pub authentication: UpstreamConfig,
    pub upload: UpstreamConfig,
    pub video_catalog: UpstreamConfig,
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Budget granted to each inbound request.
    pub request_timeout: Duration,
}

/// Descriptor for one upstream backend. Immutable after startup.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Backend name, used in logs and error context.
    pub name: &'static str,
    /// gRPC endpoint, e.g. "http://localhost:5001".
    pub url: String,
    /// Per-call timeout for every operation on this backend.
    pub timeout: Duration,
}

impl Config {
    /// Loads configuration from the environment, falling back to documented
    /// defaults. Malformed numeric values are a startup failure.
    pub fn from_env() -> Result<Self> {
        let grpc_timeout = env_duration_secs("GRPC_CLIENT_TIMEOUT_SECONDS", DEFAULT_GRPC_TIMEOUT_SECS)?;

        Ok(Self {
            http: HttpConfig {
                host: env_string("HTTP_HOST", DEFAULT_HTTP_HOST),
                port: env_u16("HTTP_PORT", DEFAULT_HTTP_PORT)?,
                request_timeout: env_duration_secs(
                    "HTTP_REQUEST_TIMEOUT_SECONDS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
            },
            authentication: UpstreamConfig {
                name: "authentication",
                url: env_string("GRPC_AUTHENTICATION_SERVICE_URL", DEFAULT_AUTHENTICATION_URL),
                timeout: env_duration_override("GRPC_AUTHENTICATION_TIMEOUT_SECONDS", grpc_timeout)?,
            },
            upload: UpstreamConfig {
                name: "upload",
                url: env_string("GRPC_UPLOAD_SERVICE_URL", DEFAULT_UPLOAD_URL),
                timeout: env_duration_override("GRPC_UPLOAD_TIMEOUT_SECONDS", grpc_timeout)?,
            },
            video_catalog: UpstreamConfig {
                name: "video-catalog",
                url: env_string("GRPC_VIDEO_CATALOG_SERVICE_URL", DEFAULT_VIDEO_CATALOG_URL),
                timeout: env_duration_override("GRPC_VIDEO_CATALOG_TIMEOUT_SECONDS", grpc_timeout)?,
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

// ============================================================================
// Environment helpers
// ============================================================================

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u16(key: &str, default: u16) -> Result<u16> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid {key} value {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn env_duration_secs(key: &str, default_secs: u64) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("invalid {key} value {raw:?}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

fn env_duration_override(key: &str, default: Duration) -> Result<Duration> {
    env_duration_secs(key, default.as_secs())
}
