//! Gateway configuration
//!
//! Layered: built-in defaults, then an optional JSON file, then environment
//! variables.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use storycrafter_agent::GenerationSettings;

use crate::{GatewayError, Result, DEFAULT_HOST, DEFAULT_PORT};

/// Secret used when none is configured. Tokens signed with it are forgeable.
pub const INSECURE_DEFAULT_SECRET: &str = "storycrafter-insecure-development-secret";

pub const DEFAULT_DATABASE_PATH: &str = "storycrafter.db";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    pub auth: AuthSettings,

    pub cors: CorsSettings,

    /// Provider/model per artifact kind
    pub generation: GenerationSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            auth: AuthSettings::default(),
            cors: CorsSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.auth.secret_key = secret.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GatewayError::InvalidConfig(format!("bad listen address: {}", e)))
    }

    /// Defaults, then the JSON file at `path` if given, then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `STORYCRAFTER_HOST`, `STORYCRAFTER_PORT`, `STORYCRAFTER_DB`
    /// and `SECRET_KEY` from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = lookup("STORYCRAFTER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("STORYCRAFTER_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                GatewayError::InvalidConfig(format!("STORYCRAFTER_PORT is not a port: {}", port))
            })?;
        }
        if let Some(db) = lookup("STORYCRAFTER_DB") {
            self.database_path = db;
        }
        if let Some(secret) = lookup("SECRET_KEY").filter(|s| !s.is_empty()) {
            self.auth.secret_key = secret;
        }
        Ok(self)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Token signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing key
    pub secret_key: String,

    /// Access token lifetime
    pub token_ttl_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: INSECURE_DEFAULT_SECRET.to_string(),
            token_ttl_minutes: 30,
        }
    }
}

impl AuthSettings {
    pub fn is_insecure(&self) -> bool {
        self.secret_key == INSECURE_DEFAULT_SECRET
    }
}

/// Browser cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        let allowed_origins = ["localhost", "127.0.0.1"]
            .iter()
            .flat_map(|host| (5173..=5175).map(move |port| format!("http://{}:{}", host, port)))
            .collect();

        Self {
            allowed_origins,
            allow_credentials: true,
            max_age_secs: 3600,
        }
    }
}
