//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::{AuthProvider, NoAuthProvider, StaticToken, StaticTokenProvider};

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// A bearer token registered in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Tenant subdomains allowed to resolve. Empty accepts any valid
    /// subdomain, which is the development default.
    #[serde(default)]
    pub tenants: Vec<String>,

    /// Static bearer tokens. Empty disables authentication.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the auth provider the configuration describes.
    pub fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        if self.tokens.is_empty() {
            Arc::new(NoAuthProvider)
        } else {
            Arc::new(StaticTokenProvider::new(
                self.tokens
                    .iter()
                    .map(|t| StaticToken {
                        token: t.token.clone(),
                        user_id: t.user_id,
                        name: t.name.clone(),
                        roles: t.roles.clone(),
                    })
                    .collect(),
            ))
        }
    }

    /// Allowed tenant set, `None` when any subdomain is accepted.
    pub fn allowed_tenants(&self) -> Option<std::collections::HashSet<String>> {
        if self.tenants.is_empty() {
            None
        } else {
            Some(self.tenants.iter().cloned().collect())
        }
    }
}
