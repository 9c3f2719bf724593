use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Where contacts are stored, parsed from the backend connection string.
///
/// Format: `memory://` or `file://<path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendUrl {
    Memory,
    File(PathBuf),
}

impl FromStr for BackendUrl {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("memory://") {
            if !rest.is_empty() {
                return Err("memory:// connection strings take no path".to_string());
            }
            return Ok(Self::Memory);
        }

        if let Some(path) = raw.strip_prefix("file://") {
            if path.is_empty() {
                return Err("file:// connection string needs a path".to_string());
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        Err(format!(
            "unsupported connection string '{raw}': expected memory:// or file://<path>"
        ))
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory://"),
            Self::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// Whether mutating requests run their connect/mutate/resync/disconnect
/// cycle one at a time or interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPolicy {
    #[default]
    Serialized,
    Unserialized,
}

impl FromStr for MutationPolicy {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "serialized" | "serial" => Ok(Self::Serialized),
            "unserialized" | "interleaved" => Ok(Self::Unserialized),
            _ => Err("mutation policy must be one of: serialized, unserialized".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend_url: BackendUrl,
    pub mutation_policy: MutationPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            backend_url: BackendUrl::Memory,
            mutation_policy: MutationPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("APP_HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT").or_else(|| lookup("APP_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid u16")?,
            None => defaults.port,
        };

        let backend_url = match lookup("MONGO_STRING").or_else(|| lookup("DATABASE_URL")) {
            Some(raw) => raw
                .parse::<BackendUrl>()
                .map_err(anyhow::Error::msg)
                .context("invalid contact store connection string")?,
            None => defaults.backend_url,
        };

        let mutation_policy = match lookup("CONTACTS_MUTATION_POLICY") {
            Some(raw) => raw
                .parse::<MutationPolicy>()
                .map_err(anyhow::Error::msg)
                .context("invalid CONTACTS_MUTATION_POLICY")?,
            None => defaults.mutation_policy,
        };

        Ok(Self {
            host,
            port,
            backend_url,
            mutation_policy,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
