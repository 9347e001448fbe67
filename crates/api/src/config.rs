use std::net::SocketAddr;

use thiserror::Error;

use shopdesk_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_COOKIE: &str = "shopdesk_session";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES is enabled")]
    Missing(&'static str),
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Set when `JWT_SECRET` was absent and the dev default is in use.
    pub jwt_secret_defaulted: bool,
    pub session_cookie: String,
    pub log_format: LogFormat,
    /// Postgres connection string; `None` selects the in-memory stores.
    pub database_url: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("SHOPDESK_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "SHOPDESK_BIND_ADDR",
                message: e.to_string(),
            })?;

        let (jwt_secret, jwt_secret_defaulted) = match lookup("JWT_SECRET") {
            Some(s) if !s.is_empty() => (s, false),
            _ => (DEV_JWT_SECRET.to_string(), true),
        };

        let session_cookie = match lookup("SHOPDESK_SESSION_COOKIE") {
            None => DEFAULT_SESSION_COOKIE.to_string(),
            Some(name) if valid_cookie_name(&name) => name,
            Some(name) => {
                return Err(ConfigError::Invalid {
                    var: "SHOPDESK_SESSION_COOKIE",
                    message: format!("'{name}' is not a valid cookie name"),
                });
            }
        };

        let log_format = match lookup("SHOPDESK_LOG_FORMAT") {
            None => LogFormat::default(),
            Some(s) => s.parse().map_err(|e: shopdesk_observability::UnknownLogFormat| ConfigError::Invalid {
                var: "SHOPDESK_LOG_FORMAT",
                message: e.to_string(),
            })?,
        };

        let persistent = match lookup("USE_PERSISTENT_STORES").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "USE_PERSISTENT_STORES",
                    message: format!("expected true/false, got '{other}'"),
                });
            }
        };

        let database_url = if persistent {
            Some(lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_defaulted,
            session_cookie,
            log_format,
            database_url,
        })
    }

    /// In-memory configuration with the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            jwt_secret_defaulted: false,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            log_format: LogFormat::default(),
            database_url: None,
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("session_cookie", &self.session_cookie)
            .field("log_format", &self.log_format)
            .field("persistent_stores", &self.database_url.is_some())
            .finish()
    }
}

fn valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}
