//! Connection settings for the remote research data warehouse.
//!
//! Credentials are read once into an explicit [`WarehouseConfig`] and handed
//! to [`WarehouseConfig::connection_url`]; nothing is cached in globals.

use crate::{Result, SignalError};
use std::fmt;
use std::path::Path;
use url::Url;

/// Default warehouse host.
pub const DEFAULT_HOST: &str = "wrds-pgdata.wharton.upenn.edu";
/// Default warehouse port.
pub const DEFAULT_PORT: u16 = 9737;
/// Default database name.
pub const DEFAULT_DATABASE: &str = "wrds";

const USERNAME_VAR: &str = "WRDS_USERNAME";
const PASSWORD_VAR: &str = "WRDS_PASSWORD";
const HOST_VAR: &str = "WRDS_HOST";
const PORT_VAR: &str = "WRDS_PORT";
const DATABASE_VAR: &str = "WRDS_DB";

/// Credentials and address of the warehouse.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database name
    pub database: String,
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("username", &self.username)
            .field("password", &"****")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl WarehouseConfig {
    /// Load from the process environment, reading a `.env` file in the
    /// working directory first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `path` into the environment, overriding existing values, then
    /// read the configuration from it.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenvy::from_path_override(path).map_err(|e| SignalError::InvalidConfig {
            key: "env file",
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let username = get(USERNAME_VAR).ok_or(SignalError::MissingCredential(USERNAME_VAR))?;
        let password = get(PASSWORD_VAR).ok_or(SignalError::MissingCredential(PASSWORD_VAR))?;
        let port = match get(PORT_VAR) {
            Some(port) => port.parse().map_err(|e| SignalError::InvalidConfig {
                key: PORT_VAR,
                reason: format!("{port:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            username,
            password,
            host: get(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database: get(DATABASE_VAR).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        })
    }

    /// PostgreSQL URL with percent-encoded credentials and TLS required.
    pub fn connection_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "postgresql://{}:{}/{}",
            self.host, self.port, self.database
        ))?;
        url.set_username(&self.username)
            .map_err(|()| SignalError::InvalidConfig {
                key: USERNAME_VAR,
                reason: "not usable in a connection URL".to_string(),
            })?;
        url.set_password(Some(&self.password))
            .map_err(|()| SignalError::InvalidConfig {
                key: PASSWORD_VAR,
                reason: "not usable in a connection URL".to_string(),
            })?;
        url.query_pairs_mut().append_pair("sslmode", "require");
        Ok(url)
    }

    /// The connection URL with the password masked, for display.
    pub fn redacted_url(&self) -> Result<String> {
        let mut url = self.connection_url()?;
        // Cannot fail: the URL already carries credentials.
        let _ = url.set_password(Some("****"));
        Ok(url.to_string())
    }
}
