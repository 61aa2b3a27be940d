// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, default values and the [`Settings`] loaded
//! from them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `REDIS_URL` | Redis URL for the nonce cache | unset (in-process cache) |
//! | `NONCE_CACHE_CAPACITY` | Max outstanding nonces (in-process cache only) | `10000` |
//! | `NONCE_TTL_SECONDS` | Nonce / challenge lifetime | `600` |
//! | `DEFAULT_SIWE_MESSAGE_STATEMENT` | Statement used when the client sends none | Safe terms statement |
//! | `JWT_ISSUER` | `iss` claim of issued tokens | `siwe-auth-server` |
//! | `JWT_AUDIENCE` | Comma-separated `aud` claim | `safe-auth` |
//! | `JWT_ALGORITHM` | Signing algorithm | `RS256` |
//! | `JWT_PRIVATE_KEY` | PEM signing key | Required |
//! | `JWT_PUBLIC_KEY` | PEM verification key (enables `/auth/me`) | Optional |
//! | `JWT_EXPIRATION_SECONDS` | Token lifetime | `86400` |
//! | `TLS_CERT_PATH` | PEM certificate chain | unset (plain HTTP) |
//! | `TLS_KEY_PATH` | PEM private key for TLS | unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const NONCE_CACHE_CAPACITY_ENV: &str = "NONCE_CACHE_CAPACITY";
pub const NONCE_TTL_SECONDS_ENV: &str = "NONCE_TTL_SECONDS";
pub const DEFAULT_STATEMENT_ENV: &str = "DEFAULT_SIWE_MESSAGE_STATEMENT";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const JWT_ALGORITHM_ENV: &str = "JWT_ALGORITHM";
pub const JWT_PRIVATE_KEY_ENV: &str = "JWT_PRIVATE_KEY";
pub const JWT_PUBLIC_KEY_ENV: &str = "JWT_PUBLIC_KEY";
pub const JWT_EXPIRATION_SECONDS_ENV: &str = "JWT_EXPIRATION_SECONDS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Selects the tracing formatter (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_NONCE_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_NONCE_TTL_SECONDS: u64 = 600;
pub const DEFAULT_SIWE_MESSAGE_STATEMENT: &str =
    "Welcome to Safe! I accept the Terms of Use: https://safe.global/terms.";
pub const DEFAULT_JWT_ISSUER: &str = "siwe-auth-server";
pub const DEFAULT_JWT_AUDIENCE: &str = "safe-auth";
pub const DEFAULT_JWT_ALGORITHM: &str = "RS256";
pub const DEFAULT_JWT_EXPIRATION_SECONDS: u64 = 86_400;

/// Upper bound for `NONCE_TTL_SECONDS` (one day).
pub const MAX_NONCE_TTL_SECONDS: u64 = 86_400;
/// Upper bound for `JWT_EXPIRATION_SECONDS` (one year).
pub const MAX_JWT_EXPIRATION_SECONDS: u64 = 31_536_000;

/// Configuration errors, reported once at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Token signing configuration.
#[derive(Clone)]
pub struct JwtSettings {
    pub issuer: String,
    pub audience: Vec<String>,
    pub algorithm: Algorithm,
    pub private_key_pem: String,
    pub public_key_pem: Option<String>,
    pub expiration: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithm", &self.algorithm)
            .field("public_key", &self.public_key_pem.is_some())
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// TLS certificate and key paths.
#[derive(Debug, Clone)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Everything the server needs, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub nonce_cache_capacity: usize,
    pub nonce_ttl: Duration,
    pub default_statement: String,
    pub jwt: JwtSettings,
    pub tls: Option<TlsSettings>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let redis_url = get(REDIS_URL_ENV);
        let nonce_cache_capacity =
            parse_or(&get, NONCE_CACHE_CAPACITY_ENV, DEFAULT_NONCE_CACHE_CAPACITY)?;

        let nonce_ttl_secs = parse_seconds(
            &get,
            NONCE_TTL_SECONDS_ENV,
            DEFAULT_NONCE_TTL_SECONDS,
            MAX_NONCE_TTL_SECONDS,
        )?;

        let default_statement = get(DEFAULT_STATEMENT_ENV)
            .unwrap_or_else(|| DEFAULT_SIWE_MESSAGE_STATEMENT.to_string());
        if default_statement.chars().any(char::is_control) {
            return Err(ConfigError::Invalid {
                name: DEFAULT_STATEMENT_ENV,
                value: default_statement,
                reason: "must be a single line without control characters".to_string(),
            });
        }

        let audience: Vec<String> = get(JWT_AUDIENCE_ENV)
            .unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string())
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        if audience.is_empty() {
            return Err(ConfigError::Invalid {
                name: JWT_AUDIENCE_ENV,
                value: String::new(),
                reason: "at least one audience is required".to_string(),
            });
        }

        let algorithm_raw =
            get(JWT_ALGORITHM_ENV).unwrap_or_else(|| DEFAULT_JWT_ALGORITHM.to_string());
        let algorithm = Algorithm::from_str(algorithm_raw.trim()).map_err(|e| {
            ConfigError::Invalid {
                name: JWT_ALGORITHM_ENV,
                value: algorithm_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let private_key_pem = get(JWT_PRIVATE_KEY_ENV)
            .map(|pem| unescape_pem(&pem))
            .ok_or(ConfigError::Missing(JWT_PRIVATE_KEY_ENV))?;
        let public_key_pem = get(JWT_PUBLIC_KEY_ENV).map(|pem| unescape_pem(&pem));

        let expiration_secs = parse_seconds(
            &get,
            JWT_EXPIRATION_SECONDS_ENV,
            DEFAULT_JWT_EXPIRATION_SECONDS,
            MAX_JWT_EXPIRATION_SECONDS,
        )?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsSettings {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        Ok(Self {
            host,
            port,
            redis_url,
            nonce_cache_capacity,
            nonce_ttl: Duration::from_secs(nonce_ttl_secs),
            default_statement,
            jwt: JwtSettings {
                issuer: get(JWT_ISSUER_ENV).unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
                audience,
                algorithm,
                private_key_pem,
                public_key_pem,
                expiration: Duration::from_secs(expiration_secs),
            },
            tls,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: HOST_ENV,
            value: raw.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// A lifetime in seconds within `1..=max`.
fn parse_seconds<G>(
    get: &G,
    name: &'static str,
    default: u64,
    max: u64,
) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let secs = parse_or(get, name, default)?;
    if secs == 0 || secs > max {
        return Err(ConfigError::Invalid {
            name,
            value: secs.to_string(),
            reason: format!("must be between 1 and {max}"),
        });
    }
    Ok(secs)
}

/// Keys passed through env files often carry literal `\n` sequences.
fn unescape_pem(pem: &str) -> String {
    pem.replace("\\n", "\n")
}
