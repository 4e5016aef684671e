//! Authentication configuration
//!
//! Configuration is an explicit value built once at startup and handed to
//! [`AuthBindings`](crate::AuthBindings) and group stores. It can be loaded
//! from environment variables or deserialized from any serde format.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::master::MasterIdentity;

/// Environment variable holding the master identity's id.
pub const ENV_MASTER_ID: &str = "GATEHOUSE_MASTER_ID";

/// Environment variable holding the master identity's secret.
pub const ENV_MASTER_SECRET: &str = "GATEHOUSE_MASTER_SECRET";

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    /// Superuser that bypasses group lookups, if any.
    #[serde(default)]
    pub master: Option<MasterIdentity>,
}

impl AuthConfig {
    /// Create an empty configuration with no master identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the master identity.
    pub fn with_master(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.master = Some(MasterIdentity::new(id, secret));
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GATEHOUSE_MASTER_ID`: master identity id
    /// - `GATEHOUSE_MASTER_SECRET`: master identity secret
    ///
    /// Both unset means no master identity. Setting only one, or setting
    /// either to an empty value, is a configuration error.
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let master = match (lookup(ENV_MASTER_ID), lookup(ENV_MASTER_SECRET)) {
            (None, None) => None,
            (Some(id), Some(secret)) => Some(MasterIdentity::new(id, secret)),
            (None, Some(_)) => {
                return Err(AuthError::ConfigError(format!("{} is not set", ENV_MASTER_ID)))
            }
            (Some(_), None) => {
                return Err(AuthError::ConfigError(format!("{} is not set", ENV_MASTER_SECRET)))
            }
        };

        let config = Self { master };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> AuthResult<()> {
        if let Some(master) = &self.master {
            if master.id.is_empty() {
                return Err(AuthError::ConfigError("master id must not be empty".to_string()));
            }
            if master.secret.is_empty() {
                return Err(AuthError::ConfigError(
                    "master secret must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
