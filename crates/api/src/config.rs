//! Deployment configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use meshguard_audit::AUDIT_TOPIC;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings for the authentication gate and the services it fronts.
#[derive(Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Shared HS256 verification secret.
    pub jwt_secret: String,
    /// Paths served without authentication, matched exactly.
    pub public_routes: Vec<String>,
    pub audit_enabled: bool,
    pub audit_topic: String,
    pub bind_addr: SocketAddr,
}

impl GateConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            public_routes: Vec::new(),
            audit_enabled: true,
            audit_topic: AUDIT_TOPIC.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }

    pub fn with_public_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    /// Read `JWT_SECRET`, `PUBLIC_ROUTES`, `AUDIT_ENABLED`, `AUDIT_TOPIC` and
    /// `BIND_ADDR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let public_routes = lookup("PUBLIC_ROUTES")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let audit_enabled = match lookup("AUDIT_ENABLED") {
            None => true,
            Some(v) => v.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "AUDIT_ENABLED",
                reason: e.to_string(),
            })?,
        };

        let audit_topic = lookup("AUDIT_TOPIC")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| AUDIT_TOPIC.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        Ok(Self {
            jwt_secret,
            public_routes,
            audit_enabled,
            audit_topic,
            bind_addr,
        })
    }
}

// Keep the secret out of logs.
impl core::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GateConfig")
            .field("jwt_secret", &"<redacted>")
            .field("public_routes", &self.public_routes)
            .field("audit_enabled", &self.audit_enabled)
            .field("audit_topic", &self.audit_topic)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
