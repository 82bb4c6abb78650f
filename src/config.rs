// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] struct loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the preference database | `./data` |
//! | `SESSION_TTL_SECS` | Idle lifetime of a server-side session | `86400` |
//! | `SESSION_CAPACITY` | Maximum number of live sessions | `100000` |
//! | `SESSION_SWEEP_INTERVAL_SECS` | Period of the expired-session sweep | `300` |
//! | `COOKIE_SECURE` | Mark the session cookie `Secure` | `false` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files for HTTPS | unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable name for the bind host.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The preference database (`preferences.redb`) is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const SESSION_CAPACITY_ENV: &str = "SESSION_CAPACITY";
pub const SESSION_SWEEP_INTERVAL_ENV: &str = "SESSION_SWEEP_INTERVAL_SECS";
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Environment variable selecting the log formatter (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the preference database inside `DATA_DIR`.
pub const PREFERENCES_DB_FILE: &str = "preferences.redb";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_CAPACITY: usize = 100_000;
const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 300;

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{set} is set but {missing} is not")]
    IncompleteTls {
        set: &'static str,
        missing: &'static str,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// PEM certificate and key paths for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_capacity: usize,
    pub session_sweep_interval: Duration,
    pub cookie_secure: bool,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            cookie_secure: false,
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup(HOST_ENV).unwrap_or(defaults.host);
        let port = parse_or(&lookup, PORT_ENV, defaults.port)?;
        let data_dir = lookup(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let session_ttl_secs = parse_or(&lookup, SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::Zero(SESSION_TTL_ENV));
        }
        let session_capacity = parse_or(&lookup, SESSION_CAPACITY_ENV, DEFAULT_SESSION_CAPACITY)?;
        if session_capacity == 0 {
            return Err(ConfigError::Zero(SESSION_CAPACITY_ENV));
        }
        let sweep_secs = parse_or(
            &lookup,
            SESSION_SWEEP_INTERVAL_ENV,
            DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_secs == 0 {
            return Err(ConfigError::Zero(SESSION_SWEEP_INTERVAL_ENV));
        }

        let cookie_secure = match lookup(COOKIE_SECURE_ENV) {
            None => false,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                name: COOKIE_SECURE_ENV,
                value,
            })?,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (Some(_), None) => {
                return Err(ConfigError::IncompleteTls {
                    set: TLS_CERT_PATH_ENV,
                    missing: TLS_KEY_PATH_ENV,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteTls {
                    set: TLS_KEY_PATH_ENV,
                    missing: TLS_CERT_PATH_ENV,
                })
            }
            (None, None) => None,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            data_dir,
            session_ttl: Duration::from_secs(session_ttl_secs),
            session_capacity,
            session_sweep_interval: Duration::from_secs(sweep_secs),
            cookie_secure,
            tls,
            log_format,
        })
    }

    /// Full path of the preference database file.
    pub fn preferences_db_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_DB_FILE)
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert_eq!(config.session_capacity, 100_000);
        assert!(!config.cookie_secure);
        assert!(config.tls.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(
            config.preferences_db_path(),
            PathBuf::from("./data").join("preferences.redb")
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATA_DIR", "/var/lib/rwa-hub"),
            ("SESSION_TTL_SECS", "60"),
            ("COOKIE_SECURE", "true"),
            ("LOG_FORMAT", "json"),
            ("TLS_CERT_PATH", "/etc/tls/cert.pem"),
            ("TLS_KEY_PATH", "/etc/tls/key.pem"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert!(config.cookie_secure);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: PathBuf::from("/etc/tls/cert.pem"),
                key: PathBuf::from("/etc/tls/key.pem"),
            })
        );
    }

    #[test]
    fn bad_port_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SESSION_TTL_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero(SESSION_TTL_ENV)));
    }

    #[test]
    fn half_configured_tls_is_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[("TLS_CERT_PATH", "/cert.pem")])).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteTls { .. }));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
